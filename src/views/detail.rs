//! Overview-mode country detail panel.

use tracing::warn;

use super::Data;
use crate::core::{data::DetailRecord, format_population, Mark, Scene, Shape, Style};

pub const PLACEHOLDER_TITLE: &str = "Select a country to explore";
const LINE_COLOR: &str = "#667eea";

/// (layer, y label, column)
const CHARTS: [(&str, &str, fn(&DetailRecord) -> f64); 4] = [
    ("population", "Population", |r| r.population),
    ("density", "Density (per km²)", |r| r.density),
    ("sex-ratio", "Sex Ratio", |r| r.sex_ratio),
    ("median-age", "Median Age (years)", |r| r.median_age),
];

pub struct CountryDetail {
    data: Data,
    open: Option<(String, String)>,
    summary: Option<String>,
    scene: Scene,
}

impl CountryDetail {
    pub fn new(data: Data) -> Self {
        let mut scene = Scene::default();
        scene.title = PLACEHOLDER_TITLE.to_string();
        Self {
            data,
            open: None,
            summary: None,
            scene,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn country(&self) -> Option<&str> {
        self.open.as_ref().map(|(_, name)| name.as_str())
    }

    pub fn title(&self) -> &str {
        &self.scene.title
    }

    pub fn flag_path(&self) -> Option<String> {
        self.open.as_ref().map(|(code, _)| format!("img/flags/{code}.png"))
    }

    /// Latest-year stats line.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// One layer per chart, named by [`chart_labels`](Self::chart_labels).
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn chart_labels() -> impl Iterator<Item = (&'static str, &'static str)> {
        CHARTS.iter().map(|(layer, label, _)| (*layer, *label))
    }

    /// Open the panel for a country. The header switches even when the
    /// detail table has no rows for it.
    pub fn show(&mut self, code: &str, name: &str) {
        self.open = Some((code.to_string(), name.to_string()));
        self.scene.title = name.to_string();

        let rows = self.data.country_detail(name);
        let Some(latest) = rows.last() else {
            warn!(country = name, "No detail data");
            self.summary = None;
            for (layer, _, _) in CHARTS {
                self.scene.join(layer, Vec::new());
            }
            self.scene.set_notice(Some(format!("No data available for {name}")));
            return;
        };

        self.summary = Some(format!(
            "Population: {} | Density: {:.1} per km² | Sex Ratio: {:.1} | Median Age: {:.1} years",
            format_population(latest.population),
            latest.density,
            latest.sex_ratio,
            latest.median_age
        ));
        for (layer, _, column) in CHARTS {
            let points = rows.iter().map(|r| [r.year as f64, column(r)]).collect();
            let mark = Mark::new(layer, Shape::Polyline(points), Style::line(LINE_COLOR, 2.0)).for_entity(name);
            self.scene.join(layer, vec![mark]);
        }
        self.scene.set_notice(None);
    }

    pub fn close(&mut self) {
        self.open = None;
        self.summary = None;
        self.scene = Scene::default();
        self.scene.title = PLACEHOLDER_TITLE.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DatasetFile, Datasets};
    use std::rc::Rc;

    fn detail() -> CountryDetail {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::CountryDetail,
            r#"{"United States of America": [
                {"year": 1950, "population": 158804395, "density": 17.3, "sexRatio": 99.3, "medianAge": 30.0},
                {"year": 2023, "population": 343477335, "density": 37.5, "sexRatio": 98.4, "medianAge": 38.1}
            ]}"#,
        )
        .unwrap();
        CountryDetail::new(Rc::new(data))
    }

    #[test]
    fn test_show_draws_four_charts_and_latest_summary() {
        let mut detail = detail();
        detail.show("USA", "United States");
        assert_eq!(detail.title(), "United States");
        assert_eq!(detail.flag_path().as_deref(), Some("img/flags/USA.png"));
        assert_eq!(
            detail.summary(),
            Some("Population: 343.48 million | Density: 37.5 per km² | Sex Ratio: 98.4 | Median Age: 38.1 years")
        );
        for (layer, _) in CountryDetail::chart_labels() {
            assert_eq!(detail.scene().marks(layer).len(), 1);
        }
    }

    #[test]
    fn test_missing_country_keeps_header_and_shows_notice() {
        let mut detail = detail();
        detail.show("TUV", "Tuvalu");
        assert_eq!(detail.title(), "Tuvalu");
        assert_eq!(detail.summary(), None);
        assert_eq!(detail.scene().notice(), Some("No data available for Tuvalu"));
    }

    #[test]
    fn test_close_restores_placeholder() {
        let mut detail = detail();
        detail.show("USA", "United States of America");
        detail.close();
        assert!(!detail.is_open());
        assert_eq!(detail.title(), PLACEHOLDER_TITLE);
        assert_eq!(detail.scene().mark_count(), 0);
    }
}
