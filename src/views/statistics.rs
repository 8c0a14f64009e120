//! Correlation scatter and per-region distributions for one year.
//!
//! Two metrics from the per-country series are plotted against each other
//! after dropping points outside 1.5 IQR on either axis. A least-squares
//! trend line and its R² are recomputed on every update. The y metric is
//! also summarized per region as box plots.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use super::scale::{quantile, sorted};
use super::{emphasize, ready, Data, Highlightable, ViewController, YearDriven, DATA_LAYER};
use crate::core::{Mark, SeriesKey, SharedState, Shape, Style, Surface, ViewError, ViewId, Year};

pub const METRICS: [SeriesKey; 9] = [
    SeriesKey::Population,
    SeriesKey::Density,
    SeriesKey::MedianAge,
    SeriesKey::BirthRate,
    SeriesKey::DeathRate,
    SeriesKey::FertilityRate,
    SeriesKey::LifeExpectancyBoth,
    SeriesKey::InfantMortality,
    SeriesKey::MigrationRate,
];

const TREND_LAYER: &str = "trend";
const BOX_LAYER: &str = "boxes";
const BOX_FILL: &str = "#69b3a2";
const DOT_RADIUS: f64 = 5.0;
const IQR_FENCE: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct StatPoint {
    pub country: String,
    pub region: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Regression {
    pub fn strength(&self) -> &'static str {
        if self.r_squared > 0.5 {
            "Strong correlation"
        } else if self.r_squared > 0.25 {
            "Moderate correlation"
        } else {
            "Weak correlation"
        }
    }

    /// Ordinary least squares; `None` for fewer than two points or no x spread.
    pub fn fit(points: &[StatPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let x_mean = points.iter().map(|p| p.x).sum::<f64>() / n;
        let y_mean = points.iter().map(|p| p.y).sum::<f64>() / n;
        let (mut ss_xx, mut ss_xy, mut ss_yy) = (0.0, 0.0, 0.0);
        for p in points {
            let (dx, dy) = (p.x - x_mean, p.y - y_mean);
            ss_xx += dx * dx;
            ss_xy += dx * dy;
            ss_yy += dy * dy;
        }
        if ss_xx == 0.0 {
            return None;
        }
        let slope = ss_xy / ss_xx;
        let r_squared = if ss_yy == 0.0 { 0.0 } else { ss_xy * ss_xy / (ss_xx * ss_yy) };
        Some(Self {
            slope,
            intercept: y_mean - slope * x_mean,
            r_squared,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub region: String,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub min: f64,
    pub max: f64,
}

fn fences(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let values = sorted(values);
    let q1 = quantile(&values, 0.25)?;
    let q3 = quantile(&values, 0.75)?;
    let iqr = q3 - q1;
    Some((q1 - IQR_FENCE * iqr, q3 + IQR_FENCE * iqr))
}

/// Drop points outside 1.5 IQR on either axis.
pub fn remove_outliers(points: Vec<StatPoint>) -> Vec<StatPoint> {
    let (Some(x), Some(y)) = (fences(points.iter().map(|p| p.x)), fences(points.iter().map(|p| p.y))) else {
        return points;
    };
    points
        .into_iter()
        .filter(|p| (x.0..=x.1).contains(&p.x) && (y.0..=y.1).contains(&p.y))
        .collect()
}

/// Box-plot summary of `y` per region, regions in name order.
pub fn box_summaries(points: &[StatPoint]) -> Vec<BoxSummary> {
    let mut by_region: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for p in points {
        by_region.entry(p.region.as_str()).or_default().push(p.y);
    }
    by_region
        .into_iter()
        .filter_map(|(region, ys)| {
            let ys = sorted(ys);
            Some(BoxSummary {
                region: region.to_string(),
                q1: quantile(&ys, 0.25)?,
                median: quantile(&ys, 0.5)?,
                q3: quantile(&ys, 0.75)?,
                min: *ys.first()?,
                max: *ys.last()?,
            })
        })
        .collect()
}

pub struct StatisticsView {
    data: Data,
    surface: Option<Surface>,
    x: SeriesKey,
    y: SeriesKey,
    year: Year,
    regions: HashMap<String, String>,
    regression: Option<Regression>,
    boxes: Vec<BoxSummary>,
    highlighted: Option<String>,
}

impl StatisticsView {
    pub fn new(data: Data) -> Self {
        Self {
            data,
            surface: None,
            x: SeriesKey::MedianAge,
            y: SeriesKey::BirthRate,
            year: Year::LAST,
            regions: HashMap::new(),
            regression: None,
            boxes: Vec::new(),
            highlighted: None,
        }
    }

    pub fn axes(&self) -> (SeriesKey, SeriesKey) {
        (self.x, self.y)
    }

    pub fn regression(&self) -> Option<&Regression> {
        self.regression.as_ref()
    }

    pub fn boxes(&self) -> &[BoxSummary] {
        &self.boxes
    }

    /// Axis selectors. Keys outside [`METRICS`] are ignored.
    pub fn set_axes(&mut self, x: SeriesKey, y: SeriesKey) -> Result<(), ViewError> {
        if !METRICS.contains(&x) || !METRICS.contains(&y) {
            warn!(x = x.field(), y = y.field(), "Unsupported statistics axis");
            return Ok(());
        }
        self.x = x;
        self.y = y;
        self.draw()
    }

    fn points(&self) -> Vec<StatPoint> {
        let year = self.year.get() as i64;
        self.data
            .country_time_series()
            .iter()
            .filter_map(|(country, rows)| {
                let row = rows.iter().find(|r| r.year == year)?;
                Some(StatPoint {
                    country: country.clone(),
                    region: self.regions.get(country).cloned().unwrap_or_else(|| "Other".to_string()),
                    x: row.value(self.x)?,
                    y: row.value(self.y)?,
                })
            })
            .collect()
    }

    fn draw(&mut self) -> Result<(), ViewError> {
        let all = self.points();
        let total = all.len();
        let points = remove_outliers(all);
        let removed = total - points.len();
        self.regression = Regression::fit(&points);
        self.boxes = box_summaries(&points);

        let dots: Vec<Mark> = points
            .iter()
            .map(|p| {
                Mark::new(
                    p.country.clone(),
                    Shape::Circle { x: p.x, y: p.y, r: DOT_RADIUS },
                    Style::filled(self.data.region_color(&p.region)),
                )
                .for_entity(p.country.clone())
            })
            .collect();

        let trend = match (&self.regression, super::scale::extent(points.iter().map(|p| p.x))) {
            (Some(fit), Some((lo, hi))) => vec![Mark::new(
                "trend",
                Shape::Polyline(vec![[lo, fit.slope * lo + fit.intercept], [hi, fit.slope * hi + fit.intercept]]),
                Style::line(Style::DEFAULT_STROKE, 1.5),
            )],
            _ => Vec::new(),
        };

        let mut boxes = Vec::with_capacity(self.boxes.len() * 3);
        for (i, b) in self.boxes.iter().enumerate() {
            let center = i as f64 + 0.5;
            boxes.push(Mark::new(
                format!("whisker:{}", b.region),
                Shape::Polyline(vec![[center, b.min], [center, b.max]]),
                Style::line(Style::DEFAULT_STROKE, 1.0),
            ));
            boxes.push(
                Mark::new(
                    format!("box:{}", b.region),
                    Shape::Band { x0: center - 0.3, x1: center + 0.3, y0: b.q1, y1: b.q3 },
                    Style::filled(BOX_FILL),
                )
                .for_entity(b.region.clone()),
            );
            boxes.push(Mark::new(
                format!("median:{}", b.region),
                Shape::Polyline(vec![[center - 0.3, b.median], [center + 0.3, b.median]]),
                Style::line(Style::DEFAULT_STROKE, 2.0),
            ));
        }

        let mut summary = format!("Statistical Analysis ({}): Sample Size: {} countries", self.year, points.len());
        if removed > 0 {
            summary.push_str(&format!(" ({removed} outliers removed)"));
        }
        if let Some(fit) = &self.regression {
            summary.push_str(&format!(" | R² = {:.3} | Slope: {:.3} | {}", fit.r_squared, fit.slope, fit.strength()));
        }
        debug!(year = %self.year, sample = points.len(), removed, "Statistics updated");

        let empty = points.is_empty();
        let (x, y) = (self.x, self.y);
        let highlighted = self.highlighted.clone();
        let surface = ready(&mut self.surface, ViewId::Statistics)?;
        surface.scene.join(DATA_LAYER, dots);
        surface.scene.join(TREND_LAYER, trend);
        surface.scene.join(BOX_LAYER, boxes);
        surface.scene.x_label = x.label().to_string();
        surface.scene.y_label = y.label().to_string();
        surface.scene.subtitle = summary;
        surface.scene.set_notice(empty.then(|| "No data available for this year".to_string()));
        if let Some(name) = highlighted {
            if !emphasize(surface, Some(&name)) && !empty {
                surface.scene.set_notice(Some(format!("No data available for {name}")));
            }
        }
        Ok(())
    }
}

impl ViewController for StatisticsView {
    fn id(&self) -> ViewId {
        ViewId::Statistics
    }

    fn init(&mut self, surface: Surface, state: &SharedState) -> Result<(), ViewError> {
        let mut surface = surface;
        surface.scene.title = "Correlations & Distributions".to_string();
        self.surface = Some(surface);
        self.regions = self
            .data
            .animation()
            .iter()
            .filter(|r| !r.country.is_empty() && !r.region.is_empty())
            .map(|r| (r.country.clone(), r.region.clone()))
            .collect();
        self.year = state.current_year();
        self.draw()
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
}

impl YearDriven for StatisticsView {
    fn update_year(&mut self, year: Year) -> Result<(), ViewError> {
        self.year = year;
        self.draw()
    }

    fn year(&self) -> Year {
        self.year
    }
}

impl Highlightable for StatisticsView {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DatasetFile, Datasets};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn point(country: &str, region: &str, x: f64, y: f64) -> StatPoint {
        StatPoint {
            country: country.to_string(),
            region: region.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn test_perfect_fit_is_strong() {
        let points = vec![point("a", "r", 1.0, 2.0), point("b", "r", 2.0, 4.0), point("c", "r", 3.0, 6.0)];
        let fit = Regression::fit(&points).unwrap();
        assert_eq!(fit.slope, 2.0);
        assert_eq!(fit.intercept, 0.0);
        assert_eq!(fit.r_squared, 1.0);
        assert_eq!(fit.strength(), "Strong correlation");
    }

    #[test]
    fn test_degenerate_fits() {
        assert_eq!(Regression::fit(&[point("a", "r", 1.0, 2.0)]), None);
        assert_eq!(Regression::fit(&[point("a", "r", 1.0, 2.0), point("b", "r", 1.0, 3.0)]), None);
    }

    #[test]
    fn test_outliers_outside_fence_are_dropped() {
        let points: Vec<StatPoint> = [1.0, 2.0, 3.0, 4.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, x)| point(&i.to_string(), "r", *x, 1.0))
            .collect();
        let kept = remove_outliers(points);
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|p| p.x < 100.0));
    }

    #[test]
    fn test_box_summary_per_region() {
        let points = vec![
            point("a", "Asia", 0.0, 1.0),
            point("b", "Asia", 0.0, 3.0),
            point("c", "Asia", 0.0, 5.0),
            point("d", "Africa", 0.0, 7.0),
        ];
        let boxes = box_summaries(&points);
        assert_eq!(
            boxes,
            vec![
                BoxSummary { region: "Africa".into(), q1: 7.0, median: 7.0, q3: 7.0, min: 7.0, max: 7.0 },
                BoxSummary { region: "Asia".into(), q1: 2.0, median: 3.0, q3: 4.0, min: 1.0, max: 5.0 },
            ]
        );
    }

    fn view() -> StatisticsView {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::CountryTimeSeries,
            r#"{
                "Niger": [{"year": 2023, "medianAge": 15.0, "birthRate": 45.0}, {"year": 1990, "medianAge": 15.5, "birthRate": 55.0}],
                "Japan": [{"year": 2023, "medianAge": 49.0, "birthRate": 6.0}],
                "Chile": [{"year": 2023, "medianAge": 36.0, "birthRate": 11.0}],
                "Tuvalu": [{"year": 2023, "medianAge": 26.0}]
            }"#,
        )
        .unwrap();
        data.insert(
            DatasetFile::Animation,
            r#"[{"country": "Japan", "year": 2023, "region": "Asia"}, {"country": "Niger", "year": 2023, "region": "Africa"}]"#,
        )
        .unwrap();
        let mut view = StatisticsView::new(Rc::new(data));
        view.init(Surface::new(ViewId::Statistics), &SharedState::new()).unwrap();
        view
    }

    #[test]
    fn test_current_year_scatter_with_regions() {
        let view = view();
        let scene = &view.surface().unwrap().scene;
        assert_eq!(scene.marks(DATA_LAYER).len(), 3);
        assert_eq!(scene.marks(TREND_LAYER).len(), 1);
        let regions: Vec<&str> = view.boxes().iter().map(|b| b.region.as_str()).collect();
        assert_eq!(regions, vec!["Africa", "Asia", "Other"]);
        assert!(view.regression().unwrap().slope < 0.0);
    }

    #[test]
    fn test_year_change_and_highlight() {
        let mut view = view();
        view.highlight_country("Niger").unwrap();
        view.update_year(Year::new(1990).unwrap()).unwrap();
        let scene = &view.surface().unwrap().scene;
        assert_eq!(scene.marks(DATA_LAYER).len(), 1);
        assert!(scene.mark(DATA_LAYER, "Niger").unwrap().style.is_highlighted());
        assert!(view.regression().is_none());

        view.highlight_country("Japan").unwrap();
        assert_eq!(view.surface().unwrap().scene.notice(), Some("No data available for Japan"));
    }

    #[test]
    fn test_unsupported_axis_is_ignored() {
        let mut view = view();
        view.set_axes(SeriesKey::SexRatio, SeriesKey::BirthRate).unwrap();
        assert_eq!(view.axes(), (SeriesKey::MedianAge, SeriesKey::BirthRate));
        view.set_axes(SeriesKey::BirthRate, SeriesKey::MedianAge).unwrap();
        assert_eq!(view.surface().unwrap().scene.x_label, "Birth Rate");
    }
}
