//! Country "DNA" radar: normalized indicators against the regional average.

use std::f64::consts::TAU;
use tracing::{debug, warn};

use super::{ready, Data, Highlightable, ViewController, DATA_LAYER};
use crate::core::{normalize_country, Mark, SharedState, Shape, Style, Surface, ViewError, ViewId};

pub const INSTRUCTIONS: &str = "Select a country to see its demographic DNA profile";
const AXIS_LAYER: &str = "axes";
const COUNTRY_FILL: &str = "#377eb8";
const REGION_STROKE: &str = "#ff7f00";

pub struct RadarView {
    data: Data,
    surface: Option<Surface>,
    /// Profile on screen.
    country: Option<String>,
    /// Profile chosen by selection; hovering only borrows the chart.
    selected: Option<String>,
    highlighted: Option<String>,
}

impl RadarView {
    pub fn new(data: Data) -> Self {
        Self {
            data,
            surface: None,
            country: None,
            selected: None,
            highlighted: None,
        }
    }

    /// Country currently profiled.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn has_country(&self, name: &str) -> bool {
        self.lookup_key(name).is_some()
    }

    fn lookup_key(&self, name: &str) -> Option<String> {
        let countries = &self.data.radar().countries;
        [normalize_country(name), name.trim()]
            .into_iter()
            .find(|k| countries.contains_key(*k))
            .map(str::to_string)
    }

    /// Point on the spoke for indicator `i` of `n` at radius `r`.
    fn spoke(i: usize, n: usize, r: f64) -> [f64; 2] {
        let angle = TAU * i as f64 / n.max(1) as f64;
        [r * angle.sin(), r * angle.cos()]
    }

    fn draw_axes(&mut self) -> Result<(), ViewError> {
        let indicators = &self.data.radar().indicators;
        let n = indicators.len();
        let mut marks = Vec::with_capacity(n * 2);
        for (i, (key, label)) in indicators.iter().enumerate() {
            marks.push(Mark::new(
                format!("spoke:{key}"),
                Shape::Polyline(vec![[0.0, 0.0], Self::spoke(i, n, 1.0)]),
                Style::line("#cccccc", 1.0),
            ));
            let [x, y] = Self::spoke(i, n, 1.15);
            marks.push(Mark::new(
                format!("label:{key}"),
                Shape::Label { x, y, text: label.clone() },
                Style::line("#666666", 1.0),
            ));
        }
        ready(&mut self.surface, ViewId::Radar)?.scene.join(AXIS_LAYER, marks);
        Ok(())
    }

    /// Empty chart with the instructions, as drawn at init.
    fn draw_instructions(&mut self) -> Result<(), ViewError> {
        let surface = ready(&mut self.surface, ViewId::Radar)?;
        surface.scene.join(DATA_LAYER, Vec::new());
        surface.scene.subtitle.clear();
        surface.scene.set_notice(Some(INSTRUCTIONS.to_string()));
        self.country = None;
        Ok(())
    }

    /// `countrySelected.radar` and the view's own country selector.
    pub fn select_country(&mut self, name: &str) -> Result<(), ViewError> {
        self.selected = Some(name.to_string());
        self.show_profile(name)
    }

    /// Profile `name`; a country without radar data gets a notice instead.
    fn show_profile(&mut self, name: &str) -> Result<(), ViewError> {
        let Some(key) = self.lookup_key(name) else {
            warn!(country = name, "No radar profile");
            let surface = ready(&mut self.surface, ViewId::Radar)?;
            surface.scene.join(DATA_LAYER, Vec::new());
            surface.scene.subtitle.clear();
            surface.scene.set_notice(Some(format!("No data available for {name}")));
            self.country = None;
            return Ok(());
        };

        let radar = self.data.radar();
        let indicators: Vec<&String> = radar.indicators.keys().collect();
        let n = indicators.len();
        let mut marks = Vec::new();
        let mut subtitle = key.clone();

        if let Some(profile) = radar.countries.get(&key) {
            let ring: Vec<[f64; 2]> = indicators
                .iter()
                .enumerate()
                .map(|(i, k)| Self::spoke(i, n, profile.values.get(*k).map(|v| v.normalized).unwrap_or(0.0)))
                .collect();
            let mut style = Style::filled(COUNTRY_FILL);
            style.stroke = COUNTRY_FILL.to_string();
            style.stroke_width = 2.0;
            style.opacity = 0.5;
            marks.push(Mark::new(format!("country:{key}"), Shape::Polygon(ring), style).for_entity(key.clone()));

            if let Some(avg) = radar.regional_averages.get(&profile.region) {
                let ring: Vec<[f64; 2]> = indicators
                    .iter()
                    .enumerate()
                    .map(|(i, k)| Self::spoke(i, n, avg.get(*k).map(|v| v.normalized).unwrap_or(0.0)))
                    .collect();
                marks.push(
                    Mark::new(format!("region:{}", profile.region), Shape::Polygon(ring), Style::line(REGION_STROKE, 2.0))
                        .for_entity(profile.region.clone()),
                );
                subtitle = format!("{key} vs {} average", profile.region);
            }
        }

        let surface = ready(&mut self.surface, ViewId::Radar)?;
        surface.scene.join(DATA_LAYER, marks);
        surface.scene.subtitle = subtitle;
        surface.scene.set_notice(None);
        debug!(country = %key, "Radar profile drawn");
        self.country = Some(key);
        Ok(())
    }
}

impl ViewController for RadarView {
    fn id(&self) -> ViewId {
        ViewId::Radar
    }

    fn init(&mut self, surface: Surface, state: &SharedState) -> Result<(), ViewError> {
        let mut surface = surface;
        surface.scene.title = "Country DNA Profile".to_string();
        surface.scene.legend = vec![
            ("Country".to_string(), COUNTRY_FILL.to_string()),
            ("Regional average".to_string(), REGION_STROKE.to_string()),
        ];
        self.surface = Some(surface);
        self.draw_axes()?;
        self.draw_instructions()?;
        if let Some(name) = state.selected_country() {
            if self.has_country(name) {
                self.select_country(name)?;
            }
        }
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), ViewError> {
        self.selected = None;
        match self.highlighted.clone() {
            Some(name) => self.show_profile(&name),
            None => self.draw_instructions(),
        }
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
}

impl Highlightable for RadarView {
    fn highlight_country(&mut self, name: &str) -> Result<(), ViewError> {
        self.highlighted = Some(name.to_string());
        self.show_profile(name)
    }

    /// Back to the selected profile, or to the instructions.
    fn unhighlight(&mut self) -> Result<(), ViewError> {
        self.highlighted = None;
        match self.selected.clone() {
            Some(name) => self.show_profile(&name),
            None => self.draw_instructions(),
        }
    }

    fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DatasetFile, Datasets};
    use std::rc::Rc;

    fn view() -> RadarView {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::Radar,
            r#"{
                "indicators": {"fertility": "Fertility", "lifeExpectancy": "Life expectancy", "medianAge": "Median age"},
                "countries": {
                    "United States of America": {"country": "United States of America", "region": "Northern America",
                        "values": {"fertility": {"raw": 1.6, "normalized": 0.2}, "lifeExpectancy": {"raw": 79.0, "normalized": 0.8}, "medianAge": {"raw": 38.0, "normalized": 0.7}}}
                },
                "regionalAverages": {"Northern America": {"fertility": {"raw": 1.6, "normalized": 0.25}}}
            }"#,
        )
        .unwrap();
        let mut view = RadarView::new(Rc::new(data));
        view.init(Surface::new(ViewId::Radar), &SharedState::new()).unwrap();
        view
    }

    #[test]
    fn test_instructions_until_first_selection() {
        let mut view = view();
        assert_eq!(view.surface().unwrap().scene.notice(), Some(INSTRUCTIONS));
        assert_eq!(view.surface().unwrap().scene.marks(AXIS_LAYER).len(), 6);
        view.select_country("United States").unwrap();
        let scene = &view.surface().unwrap().scene;
        assert_eq!(scene.notice(), None);
        assert_eq!(scene.marks(DATA_LAYER).len(), 2);
        assert_eq!(view.country(), Some("United States of America"));
    }

    #[test]
    fn test_absent_country_renders_notice() {
        let mut view = view();
        view.highlight_country("United States of America").unwrap();
        view.highlight_country("Tuvalu").unwrap();
        let scene = &view.surface().unwrap().scene;
        assert_eq!(scene.notice(), Some("No data available for Tuvalu"));
        assert!(scene.marks(DATA_LAYER).is_empty());
        assert_eq!(view.country(), None);
        assert_eq!(view.highlighted(), Some("Tuvalu"));
        view.unhighlight().unwrap();
        assert_eq!(view.highlighted(), None);
    }

    #[test]
    fn test_unhighlight_restores_initial_scene() {
        let mut view = view();
        let initial = view.surface().unwrap().scene.clone();
        view.highlight_country("United States of America").unwrap();
        view.highlight_country("Tuvalu").unwrap();
        view.unhighlight().unwrap();
        assert_eq!(view.surface().unwrap().scene, initial);
        assert_eq!(view.country(), None);
    }

    #[test]
    fn test_hover_out_returns_to_selected_profile() {
        let mut view = view();
        view.select_country("United States of America").unwrap();
        let selected = view.surface().unwrap().scene.clone();
        view.highlight_country("Tuvalu").unwrap();
        view.unhighlight().unwrap();
        assert_eq!(view.surface().unwrap().scene, selected);

        view.deselect().unwrap();
        assert_eq!(view.selected(), None);
        assert_eq!(view.surface().unwrap().scene.notice(), Some(INSTRUCTIONS));
        assert!(view.surface().unwrap().scene.marks(DATA_LAYER).is_empty());
    }

    #[test]
    fn test_missing_indicator_collapses_to_center() {
        let mut view = view();
        view.select_country("United States of America").unwrap();
        let region = view.surface().unwrap().scene.mark(DATA_LAYER, "region:Northern America").unwrap();
        let Shape::Polygon(ring) = &region.shape else { panic!("expected polygon") };
        assert_eq!(ring.len(), 3);
        assert_eq!(ring[1], [0.0, 0.0]);
    }
}
