//! Population comparison: all regions, or up to N chosen countries.

use tracing::debug;

use super::scale::CATEGORY10;
use super::{ready, Data, ViewController, DATA_LAYER};
use crate::config::DashboardConfig;
use crate::core::{normalize_country, Mark, SeriesKey, SharedState, Shape, Style, Surface, ViewError, ViewId};

pub const EMPTY_PROMPT: &str = "Select countries from the dropdown above to compare";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonMode {
    #[default]
    Regions,
    Countries,
}

pub struct ComparisonView {
    data: Data,
    surface: Option<Surface>,
    mode: ComparisonMode,
    countries: Vec<String>,
    limit: usize,
}

impl ComparisonView {
    pub fn new(data: Data, config: &DashboardConfig) -> Self {
        Self {
            data,
            surface: None,
            mode: ComparisonMode::default(),
            countries: Vec::new(),
            limit: config.comparison_limit,
        }
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    pub fn selected_countries(&self) -> &[String] {
        &self.countries
    }

    pub fn set_mode(&mut self, mode: ComparisonMode) -> Result<(), ViewError> {
        self.mode = mode;
        self.draw()
    }

    /// Country dropdown. Returns `false` for duplicates or when the list is full.
    pub fn add_country(&mut self, name: &str) -> Result<bool, ViewError> {
        let name = normalize_country(name);
        if name.is_empty() || self.countries.iter().any(|c| c == name) {
            return Ok(false);
        }
        if self.countries.len() >= self.limit {
            debug!(limit = self.limit, country = name, "Comparison list full");
            return Ok(false);
        }
        self.countries.push(name.to_string());
        self.draw()?;
        Ok(true)
    }

    pub fn remove_country(&mut self, name: &str) -> Result<(), ViewError> {
        let name = normalize_country(name);
        self.countries.retain(|c| c != name);
        self.draw()
    }

    fn draw(&mut self) -> Result<(), ViewError> {
        let population = |rows: &[crate::core::data::SeriesRecord]| -> Vec<[f64; 2]> {
            rows.iter()
                .filter_map(|r| r.value(SeriesKey::Population).map(|v| [r.year as f64, v]))
                .collect()
        };

        let (marks, notice) = match self.mode {
            ComparisonMode::Regions => {
                let marks = self
                    .data
                    .regional_time_series()
                    .iter()
                    .map(|s| {
                        Mark::new(
                            s.region.clone(),
                            Shape::Polyline(population(&s.values)),
                            Style::line(self.data.region_color(&s.region), 2.0),
                        )
                        .for_entity(s.region.clone())
                    })
                    .collect();
                (marks, None)
            }
            ComparisonMode::Countries if self.countries.is_empty() => (Vec::new(), Some(EMPTY_PROMPT.to_string())),
            ComparisonMode::Countries => {
                let mut missing = Vec::new();
                let mut marks = Vec::new();
                for (i, country) in self.countries.iter().enumerate() {
                    let rows = self.data.country_series(country);
                    if rows.is_empty() {
                        missing.push(country.as_str());
                        continue;
                    }
                    marks.push(
                        Mark::new(
                            country.clone(),
                            Shape::Polyline(population(rows)),
                            Style::line(CATEGORY10[i % CATEGORY10.len()], 2.0),
                        )
                        .for_entity(country.clone()),
                    );
                }
                let notice = (!missing.is_empty()).then(|| format!("No data available for {}", missing.join(", ")));
                (marks, notice)
            }
        };

        let surface = ready(&mut self.surface, ViewId::Comparison)?;
        surface.scene.join(DATA_LAYER, marks);
        surface.scene.set_notice(notice);
        Ok(())
    }
}

impl ViewController for ComparisonView {
    fn id(&self) -> ViewId {
        ViewId::Comparison
    }

    fn init(&mut self, surface: Surface, _state: &SharedState) -> Result<(), ViewError> {
        let mut surface = surface;
        surface.scene.title = "Population Comparison".to_string();
        surface.scene.x_label = "Year".to_string();
        surface.scene.y_label = "Population (thousands)".to_string();
        self.surface = Some(surface);
        self.draw()
    }

    fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DatasetFile, Datasets};
    use std::rc::Rc;

    fn view(limit: usize) -> ComparisonView {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::RegionalTimeSeries,
            r#"[{"region": "Asia", "values": [{"year": 1950, "population": 1380000}]}]"#,
        )
        .unwrap();
        data.insert(
            DatasetFile::CountryTimeSeries,
            r#"{"India": [{"year": 1950, "population": 357000}], "China": [{"year": 1950, "population": 543000}]}"#,
        )
        .unwrap();
        let config = DashboardConfig {
            comparison_limit: limit,
            ..DashboardConfig::default()
        };
        let mut view = ComparisonView::new(Rc::new(data), &config);
        view.init(Surface::new(ViewId::Comparison), &SharedState::new()).unwrap();
        view
    }

    #[test]
    fn test_regions_mode_by_default() {
        let view = view(10);
        assert_eq!(view.mode(), ComparisonMode::Regions);
        assert_eq!(view.surface().unwrap().scene.marks(DATA_LAYER).len(), 1);
    }

    #[test]
    fn test_countries_mode_prompts_when_empty() {
        let mut view = view(10);
        view.set_mode(ComparisonMode::Countries).unwrap();
        assert_eq!(view.surface().unwrap().scene.notice(), Some(EMPTY_PROMPT));
        assert!(view.add_country("India").unwrap());
        assert_eq!(view.surface().unwrap().scene.notice(), None);
    }

    #[test]
    fn test_country_list_is_capped_and_deduplicated() {
        let mut view = view(2);
        assert!(view.add_country("India").unwrap());
        assert!(!view.add_country("India").unwrap());
        assert!(view.add_country("Tuvalu").unwrap());
        assert!(!view.add_country("China").unwrap());
        assert_eq!(view.selected_countries().len(), 2);

        view.set_mode(ComparisonMode::Countries).unwrap();
        assert_eq!(view.surface().unwrap().scene.notice(), Some("No data available for Tuvalu"));

        view.remove_country("Tuvalu").unwrap();
        assert!(view.add_country("China").unwrap());
    }
}
