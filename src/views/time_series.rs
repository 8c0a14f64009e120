//! Regional and per-country trend lines for the current metric mode.

use std::collections::BTreeSet;
use tracing::{debug, warn};

use super::scale::COUNTRY_COLORS;
use super::{ready, Data, ViewController, DATA_LAYER};
use crate::core::{
    normalize_country, Mark, Metric, SeriesKey, SharedState, Shape, Style, Surface, ViewError, ViewId,
};

/// Series plotted for a metric mode. Gender gap has no time-series mode.
pub fn mode_series(metric: Metric) -> Option<&'static [SeriesKey]> {
    use SeriesKey::*;
    Some(match metric {
        Metric::Population => &[Population],
        Metric::Density => &[Density],
        Metric::SexRatio => &[SexRatio],
        Metric::MedianAge => &[MedianAge],
        Metric::DemographicTransition => &[BirthRate, DeathRate],
        Metric::GrowthDrivers => &[NaturalChange, MigrationRate],
        Metric::LongevityGap => &[LifeExpectancyMale, LifeExpectancyFemale],
        Metric::FertilityHealth => &[FertilityRate, MeanAgeChildbearing],
        Metric::HealthcareQuality => &[InfantMortality, UnderFiveMortality],
        Metric::GenderGap => return None,
    })
}

pub fn mode_title(metric: Metric) -> &'static str {
    match metric {
        Metric::Population => "Population Trends (1950-2023)",
        Metric::Density => "Population Density Trends (1950-2023)",
        Metric::SexRatio => "Sex Ratio Trends (1950-2023)",
        Metric::MedianAge => "Median Age Trends (1950-2023)",
        Metric::DemographicTransition => "Demographic Transition (1950-2023)",
        Metric::GrowthDrivers => "Population Growth Drivers (1950-2023)",
        Metric::LongevityGap => "Life Expectancy & Gender Gap (1950-2023)",
        Metric::FertilityHealth => "Fertility & Reproductive Health (1950-2023)",
        Metric::HealthcareQuality => "Healthcare Quality Indicators (1950-2023)",
        Metric::GenderGap => "",
    }
}

pub struct TimeSeriesView {
    data: Data,
    surface: Option<Surface>,
    mode: Metric,
    log_scale: bool,
    regions: BTreeSet<String>,
    /// Insertion order fixes each country's line color.
    countries: Vec<String>,
}

impl TimeSeriesView {
    pub fn new(data: Data) -> Self {
        Self {
            data,
            surface: None,
            mode: Metric::Population,
            log_scale: false,
            regions: BTreeSet::new(),
            countries: Vec::new(),
        }
    }

    pub fn mode(&self) -> Metric {
        self.mode
    }

    pub fn log_scale(&self) -> bool {
        self.log_scale
    }

    pub fn selected_regions(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(String::as_str)
    }

    pub fn selected_countries(&self) -> &[String] {
        &self.countries
    }

    /// `modeChanged.timeseries`. Metrics without a mode are ignored.
    pub fn change_mode(&mut self, metric: Metric) -> Result<(), ViewError> {
        if mode_series(metric).is_none() {
            debug!(%metric, "No time-series mode for metric");
            return Ok(());
        }
        self.mode = metric;
        self.log_scale = false;
        self.draw()
    }

    /// Log axis is only available for modes spanning orders of magnitude.
    pub fn set_log_scale(&mut self, on: bool) -> Result<(), ViewError> {
        let supported = self.mode == Metric::HealthcareQuality;
        self.log_scale = on && supported;
        self.draw()
    }

    pub fn toggle_region(&mut self, region: &str) -> Result<(), ViewError> {
        if !self.regions.remove(region) {
            self.regions.insert(region.to_string());
        }
        self.draw()
    }

    /// `countrySelected.timeseries`. The first country hides the regions.
    pub fn toggle_country(&mut self, name: &str) -> Result<(), ViewError> {
        let name = normalize_country(name);
        if let Some(pos) = self.countries.iter().position(|c| c == name) {
            self.countries.remove(pos);
        } else {
            if self.countries.is_empty() {
                self.regions.clear();
            }
            self.countries.push(name.to_string());
        }
        self.draw()
    }

    fn draw(&mut self) -> Result<(), ViewError> {
        let Some(keys) = mode_series(self.mode) else {
            return Ok(());
        };
        let log = self.log_scale;
        let keep = |v: f64| v.is_finite() && (!log || v > 0.0);

        let mut marks = Vec::new();
        for series in self.data.regional_time_series() {
            if !self.regions.contains(&series.region) {
                continue;
            }
            let color = self.data.region_color(&series.region);
            for &key in keys {
                let points: Vec<[f64; 2]> = series
                    .values
                    .iter()
                    .filter_map(|r| r.value(key).filter(|v| keep(*v)).map(|v| [r.year as f64, v]))
                    .collect();
                marks.push(
                    Mark::new(
                        format!("region:{}:{}", series.region, key.field()),
                        Shape::Polyline(points),
                        Style::line(color, 2.0),
                    )
                    .for_entity(series.region.clone()),
                );
            }
        }

        let mut missing = Vec::new();
        for (i, country) in self.countries.iter().enumerate() {
            let rows = self.data.country_series(country);
            if rows.is_empty() {
                warn!(%country, "No time series for country");
                missing.push(country.as_str());
                continue;
            }
            let color = COUNTRY_COLORS[i % COUNTRY_COLORS.len()];
            for &key in keys {
                let points: Vec<[f64; 2]> = rows
                    .iter()
                    .filter_map(|r| r.value(key).filter(|v| keep(*v)).map(|v| [r.year as f64, v]))
                    .collect();
                marks.push(
                    Mark::new(
                        format!("country:{country}:{}", key.field()),
                        Shape::Polyline(points),
                        Style::line(color, 2.5),
                    )
                    .for_entity(country.clone()),
                );
            }
        }
        let notice = (!missing.is_empty()).then(|| format!("No data available for {}", missing.join(", ")));
        let legend: Vec<(String, String)> = keys.iter().map(|k| (k.label().to_string(), String::new())).collect();

        let mode = self.mode;
        let surface = ready(&mut self.surface, ViewId::TimeSeries)?;
        surface.scene.join(DATA_LAYER, marks);
        surface.scene.title = mode_title(mode).to_string();
        surface.scene.x_label = "Year".to_string();
        surface.scene.y_label = keys.iter().map(|k| k.label()).collect::<Vec<_>>().join(" / ");
        surface.scene.log_y = log;
        surface.scene.legend = legend;
        surface.scene.set_notice(notice);
        Ok(())
    }
}

impl ViewController for TimeSeriesView {
    fn id(&self) -> ViewId {
        ViewId::TimeSeries
    }

    fn init(&mut self, surface: Surface, state: &SharedState) -> Result<(), ViewError> {
        self.surface = Some(surface);
        self.regions = self
            .data
            .regional_time_series()
            .iter()
            .map(|s| s.region.clone())
            .collect();
        if mode_series(state.current_visualization).is_some() {
            self.mode = state.current_visualization;
        }
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

    fn view() -> TimeSeriesView {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::RegionalTimeSeries,
            r#"[
                {"region": "Africa", "values": [{"year": 1950, "population": 227000, "infantMortality": 180}]},
                {"region": "Europe", "values": [{"year": 1950, "population": 549000, "infantMortality": 0}]}
            ]"#,
        )
        .unwrap();
        data.insert(
            DatasetFile::CountryTimeSeries,
            r#"{"Viet Nam": [{"year": 1950, "population": 24800}]}"#,
        )
        .unwrap();
        let mut view = TimeSeriesView::new(Rc::new(data));
        view.init(Surface::new(ViewId::TimeSeries), &SharedState::new()).unwrap();
        view
    }

    fn keys(view: &TimeSeriesView) -> Vec<String> {
        view.surface().unwrap().scene.marks(DATA_LAYER).iter().map(|m| m.key.clone()).collect()
    }

    #[test]
    fn test_all_regions_shown_initially() {
        let view = view();
        assert_eq!(keys(&view), vec!["region:Africa:population", "region:Europe:population"]);
    }

    #[test]
    fn test_first_country_hides_regions() {
        let mut view = view();
        view.toggle_country("Vietnam").unwrap();
        assert_eq!(view.selected_countries(), ["Viet Nam".to_string()]);
        assert_eq!(keys(&view), vec!["country:Viet Nam:population"]);

        view.toggle_country("Viet Nam").unwrap();
        assert!(view.selected_countries().is_empty());
        assert!(keys(&view).is_empty());
    }

    #[test]
    fn test_missing_country_shows_notice() {
        let mut view = view();
        view.toggle_country("Tuvalu").unwrap();
        let scene = &view.surface().unwrap().scene;
        assert_eq!(scene.notice(), Some("No data available for Tuvalu"));
    }

    #[test]
    fn test_gender_gap_mode_is_ignored() {
        let mut view = view();
        view.change_mode(Metric::Density).unwrap();
        view.change_mode(Metric::GenderGap).unwrap();
        assert_eq!(view.mode(), Metric::Density);
    }

    #[test]
    fn test_log_scale_only_for_healthcare_and_reset_on_mode_change() {
        let mut view = view();
        view.set_log_scale(true).unwrap();
        assert!(!view.log_scale());

        view.change_mode(Metric::HealthcareQuality).unwrap();
        view.set_log_scale(true).unwrap();
        assert!(view.log_scale());
        let europe = view.surface().unwrap().scene.mark(DATA_LAYER, "region:Europe:infantMortality").cloned();
        assert_eq!(europe.map(|m| m.shape), Some(Shape::Polyline(vec![])));

        view.change_mode(Metric::Population).unwrap();
        assert!(!view.log_scale());
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let mut view = view();
        let before = view.surface().unwrap().scene.clone();
        view.change_mode(Metric::Population).unwrap();
        assert_eq!(view.surface().unwrap().scene, before);
    }
}
