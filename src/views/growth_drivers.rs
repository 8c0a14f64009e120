//! Natural change vs net migration bubble chart.

use super::scale::{extent, sqrt_radius};
use super::{emphasize, ready, Animated, Data, Highlightable, ViewController, YearDriven, DATA_LAYER};
use crate::config::DashboardConfig;
use crate::core::{Mark, Playback, SharedState, Shape, Step, Style, Surface, ViewError, ViewId, Year};

const MAX_RADIUS: f64 = 30.0;
/// Quadrant guides through the origin.
const GUIDE_LAYER: &str = "guides";

pub struct GrowthDriversView {
    data: Data,
    surface: Option<Surface>,
    year: Year,
    playback: Playback,
    max_population: f64,
    highlighted: Option<String>,
}

impl GrowthDriversView {
    pub fn new(data: Data, config: &DashboardConfig) -> Self {
        Self {
            data,
            surface: None,
            year: Year::LAST,
            playback: Playback::new(config.growth_interval_ms, Year::LAST),
            max_population: 0.0,
            highlighted: None,
        }
    }

    pub fn drag_year(&mut self, year: Year) -> Result<(), ViewError> {
        if self.playback.is_playing() {
            self.playback.pause();
        }
        self.update_year(year)
    }

    fn draw(&mut self) -> Result<(), ViewError> {
        let year = self.year.get() as i64;
        let rows: Vec<_> = self.data.growth_drivers().iter().filter(|r| r.year == year).collect();
        let marks: Vec<Mark> = rows
            .iter()
            .map(|r| {
                let shape = Shape::Circle {
                    x: r.natural_change,
                    y: r.migration_rate,
                    r: sqrt_radius(r.population, self.max_population, MAX_RADIUS),
                };
                Mark::new(r.country.clone(), shape, Style::filled(self.data.region_color(&r.region)))
                    .for_entity(r.country.clone())
            })
            .collect();

        let x = extent(rows.iter().map(|r| r.natural_change)).unwrap_or((-1.0, 1.0));
        let y = extent(rows.iter().map(|r| r.migration_rate)).unwrap_or((-1.0, 1.0));
        let guides = vec![
            Mark::new("x0", Shape::Polyline(vec![[0.0, y.0.min(0.0)], [0.0, y.1.max(0.0)]]), Style::line("#999", 1.0)),
            Mark::new("y0", Shape::Polyline(vec![[x.0.min(0.0), 0.0], [x.1.max(0.0), 0.0]]), Style::line("#999", 1.0)),
        ];

        let empty = marks.is_empty();
        let label = self.year.to_string();
        let highlighted = self.highlighted.clone();
        let surface = ready(&mut self.surface, ViewId::GrowthDrivers)?;
        surface.scene.join(GUIDE_LAYER, guides);
        surface.scene.join(DATA_LAYER, marks);
        surface.scene.subtitle = label;
        surface
            .scene
            .set_notice(empty.then(|| "No data available for this year".to_string()));
        if let Some(name) = highlighted {
            if !emphasize(surface, Some(&name)) && !empty {
                surface.scene.set_notice(Some(format!("No data available for {name}")));
            }
        }
        Ok(())
    }
}

impl ViewController for GrowthDriversView {
    fn id(&self) -> ViewId {
        ViewId::GrowthDrivers
    }

    fn init(&mut self, surface: Surface, _state: &SharedState) -> Result<(), ViewError> {
        self.surface = Some(surface);
        self.max_population = extent(self.data.growth_drivers().iter().map(|r| r.population))
            .map(|(_, hi)| hi)
            .unwrap_or(0.0);
        if let Some(s) = self.surface.as_mut() {
            s.scene.title = "Drivers of Population Growth".to_string();
            s.scene.x_label = "Natural Change (per 1,000)".to_string();
            s.scene.y_label = "Net Migration Rate (per 1,000)".to_string();
        }
        self.year = Year::LAST;
        self.draw()?;
        self.playback.ready();
        Ok(())
    }

    fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }

    fn as_highlightable(&mut self) -> Option<&mut dyn Highlightable> {
        Some(self)
    }

    fn as_year_driven(&mut self) -> Option<&mut dyn YearDriven> {
        Some(self)
    }

    fn as_animated(&mut self) -> Option<&mut dyn Animated> {
        Some(self)
    }
}

impl YearDriven for GrowthDriversView {
    fn update_year(&mut self, year: Year) -> Result<(), ViewError> {
        self.year = year;
        self.draw()
    }

    fn year(&self) -> Year {
        self.year
    }
}

impl Highlightable for GrowthDriversView {
    fn highlight_country(&mut self, name: &str) -> Result<(), ViewError> {
        self.highlighted = Some(name.to_string());
        self.draw()
    }

    fn unhighlight(&mut self) -> Result<(), ViewError> {
        self.highlighted = None;
        self.draw()
    }

    fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }
}

impl Animated for GrowthDriversView {
    fn playback(&self) -> &Playback {
        &self.playback
    }

    fn play(&mut self, now: f64) -> bool {
        self.playback.play(now)
    }

    fn pause(&mut self) {
        self.playback.pause();
    }

    fn reset(&mut self) -> Result<Year, ViewError> {
        let home = self.playback.reset();
        self.update_year(home)?;
        Ok(home)
    }

    fn tick(&mut self, now: f64) -> Result<Option<Year>, ViewError> {
        match self.playback.poll(now, self.year) {
            Some(Step::Advanced(year)) => {
                self.update_year(year)?;
                Ok(Some(year))
            }
            Some(Step::Finished) | None => Ok(None),
        }
    }
}
