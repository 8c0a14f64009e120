//! Fertility vs life-expectancy bubble chart animated over the years.

use tracing::debug;

use super::scale::{extent, sqrt_radius};
use super::{emphasize, ready, Animated, Data, Highlightable, ViewController, YearDriven, DATA_LAYER};
use crate::config::DashboardConfig;
use crate::core::{Mark, Playback, SharedState, Shape, Step, Style, Surface, ViewError, ViewId, Year};

const MAX_RADIUS: f64 = 40.0;

pub struct AnimationView {
    data: Data,
    surface: Option<Surface>,
    year: Year,
    playback: Playback,
    max_population: f64,
    highlighted: Option<String>,
}

impl AnimationView {
    pub fn new(data: Data, config: &DashboardConfig) -> Self {
        Self {
            data,
            surface: None,
            year: Year::FIRST,
            playback: Playback::new(config.animation_interval_ms, Year::FIRST),
            max_population: 0.0,
            highlighted: None,
        }
    }

    /// Speed buttons. A running animation continues at the new pace.
    pub fn set_speed(&mut self, interval_ms: u64, now: f64) {
        debug!(interval_ms, "Animation speed changed");
        self.playback.set_interval_ms(interval_ms, now);
    }

    /// Year slider: pauses a running animation first.
    pub fn drag_year(&mut self, year: Year) -> Result<(), ViewError> {
        if self.playback.is_playing() {
            self.playback.pause();
        }
        self.update_year(year)
    }

    fn draw(&mut self) -> Result<(), ViewError> {
        let year = self.year.get() as i64;
        let marks: Vec<Mark> = self
            .data
            .animation()
            .iter()
            .filter(|r| r.year == year && r.region != "Unknown")
            .map(|r| {
                let shape = Shape::Circle {
                    x: r.fertility,
                    y: r.life_expectancy,
                    r: sqrt_radius(r.population, self.max_population, MAX_RADIUS),
                };
                Mark::new(r.country.clone(), shape, Style::filled(self.data.region_color(&r.region)))
                    .for_entity(r.country.clone())
            })
            .collect();
        let empty = marks.is_empty();

        let label = self.year.to_string();
        let highlighted = self.highlighted.clone();
        let surface = ready(&mut self.surface, ViewId::Animation)?;
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

impl ViewController for AnimationView {
    fn id(&self) -> ViewId {
        ViewId::Animation
    }

    fn init(&mut self, surface: Surface, _state: &SharedState) -> Result<(), ViewError> {
        self.surface = Some(surface);
        self.max_population = extent(self.data.animation().iter().map(|r| r.population))
            .map(|(_, hi)| hi)
            .unwrap_or(0.0);
        if let Some(s) = self.surface.as_mut() {
            s.scene.title = "Demographic Transition Animation".to_string();
            s.scene.x_label = "Fertility Rate (births per woman)".to_string();
            s.scene.y_label = "Life Expectancy (years)".to_string();
            s.scene.legend = self
                .data
                .region_metadata()
                .iter()
                .map(|m| (m.name.clone(), m.color.clone()))
                .collect();
        }
        self.year = Year::FIRST;
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

impl YearDriven for AnimationView {
    fn update_year(&mut self, year: Year) -> Result<(), ViewError> {
        self.year = year;
        self.draw()
    }

    fn year(&self) -> Year {
        self.year
    }
}

impl Highlightable for AnimationView {
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

impl Animated for AnimationView {
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
