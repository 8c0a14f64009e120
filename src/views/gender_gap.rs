//! Female vs male life expectancy: slopegraph or per-country gap lines.

use tracing::{debug, warn};

use super::scale::{extent, CATEGORY10};
use super::{ready, Data, Highlightable, ViewController, DATA_LAYER};
use crate::core::{data::GapComparison, same_country, Mark, SharedState, Shape, Style, Surface, ViewError, ViewId};

pub const SLOPE_COUNT: usize = 30;
pub const SERIES_COUNT: usize = 10;
/// Endpoint dots are drawn for the leading countries only.
const DOT_COUNT: usize = 10;
const DIM_OPACITY: f32 = 0.15;

const REGION_COLORS: [(&str, &str); 6] = [
    ("Africa", "#e41a1c"),
    ("Asia", "#377eb8"),
    ("Europe", "#4daf4a"),
    ("Latin America and the Caribbean", "#984ea3"),
    ("Northern America", "#ff7f00"),
    ("Oceania", "#a65628"),
];

fn region_color(region: &str) -> &'static str {
    REGION_COLORS
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, c)| *c)
        .unwrap_or("#999999")
}

/// Years of the first and last `yearNNNN` snapshots.
fn snapshot_years(row: &GapComparison) -> Option<(f64, f64)> {
    let years: Vec<f64> = row
        .snapshots
        .keys()
        .filter_map(|k| k.strip_prefix("year")?.parse::<f64>().ok())
        .collect();
    Some((*years.first()?, *years.last()?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapMode {
    #[default]
    Slopegraph,
    TimeSeries,
}

pub struct GenderGapView {
    data: Data,
    surface: Option<Surface>,
    mode: GapMode,
    highlighted: Option<String>,
}

impl GenderGapView {
    pub fn new(data: Data) -> Self {
        Self {
            data,
            surface: None,
            mode: GapMode::default(),
            highlighted: None,
        }
    }

    pub fn mode(&self) -> GapMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GapMode) -> Result<(), ViewError> {
        if self.mode != mode {
            debug!(?mode, "Gender gap mode");
        }
        self.mode = mode;
        self.draw()
    }

    fn slopegraph(&self) -> (Vec<Mark>, Vec<(String, String)>) {
        let mut rows: Vec<&GapComparison> = self.data.gender_gap().comparison.iter().collect();
        rows.sort_by(|a, b| b.gap_change.total_cmp(&a.gap_change));
        rows.truncate(SLOPE_COUNT);

        let mut marks = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let (Some((y1, y2)), Some((first, last))) = (snapshot_years(row), row.endpoints()) else {
                continue;
            };
            let color = region_color(&row.region);

            let mut female = Style::line(color, 2.0);
            female.opacity = 0.6;
            marks.push(
                Mark::new(
                    format!("female:{}", row.country),
                    Shape::Polyline(vec![[y1, first.female], [y2, last.female]]),
                    female,
                )
                .for_entity(row.country.clone()),
            );
            let mut male = Style::line(color, 2.0);
            male.opacity = 0.3;
            marks.push(
                Mark::new(
                    format!("male:{}", row.country),
                    Shape::Polyline(vec![[y1, first.male], [y2, last.male]]),
                    male,
                )
                .for_entity(row.country.clone()),
            );

            if i < DOT_COUNT {
                for (x, y, end) in [(y1, first.female, "start"), (y2, last.female, "end")] {
                    marks.push(
                        Mark::new(format!("dot:{end}:{}", row.country), Shape::Circle { x, y, r: 4.0 }, Style::filled(color))
                            .for_entity(row.country.clone()),
                    );
                }
            }
        }
        let legend = vec![
            ("Female Life Expectancy".to_string(), "#667eea".to_string()),
            ("Male Life Expectancy".to_string(), "#667eea".to_string()),
        ];
        (marks, legend)
    }

    fn time_series(&self) -> (Vec<Mark>, Vec<(String, String)>) {
        let mut marks = Vec::new();
        let mut legend = Vec::new();
        for (i, series) in self.data.gender_gap().timeseries.iter().take(SERIES_COUNT).enumerate() {
            let color = CATEGORY10[i % CATEGORY10.len()];
            let points = series.values.iter().map(|v| [v.year as f64, v.gap]).collect();
            marks.push(
                Mark::new(series.country.clone(), Shape::Polyline(points), Style::line(color, 2.0))
                    .for_entity(series.country.clone()),
            );
            legend.push((series.country.clone(), color.to_string()));
        }
        (marks, legend)
    }

    fn draw(&mut self) -> Result<(), ViewError> {
        let (marks, legend, y_label) = match self.mode {
            GapMode::Slopegraph => {
                let (m, l) = self.slopegraph();
                (m, l, "Life Expectancy at Birth (years)")
            }
            GapMode::TimeSeries => {
                let (m, l) = self.time_series();
                (m, l, "Gender Gap in Life Expectancy (years)")
            }
        };
        let empty = marks.is_empty();
        let highlighted = self.highlighted.clone();

        let surface = ready(&mut self.surface, ViewId::GenderGap)?;
        surface.scene.join(DATA_LAYER, marks);
        surface.scene.legend = legend;
        surface.scene.y_label = y_label.to_string();
        surface.scene.set_notice(empty.then(|| "No data available".to_string()));

        if let Some(name) = highlighted {
            let mut matched = false;
            surface.scene.restyle(DATA_LAYER, |m| {
                if m.entity.as_deref().is_some_and(|e| same_country(&name, e)) {
                    matched = true;
                    m.style.stroke_width = 4.0;
                    m.style.opacity = 1.0;
                } else {
                    m.style.opacity = DIM_OPACITY;
                }
            });
            if !matched && !empty {
                warn!(country = %name, "Not in gender gap data");
                surface.scene.set_notice(Some(format!("No data available for {name}")));
            }
        }
        Ok(())
    }
}

impl ViewController for GenderGapView {
    fn id(&self) -> ViewId {
        ViewId::GenderGap
    }

    fn init(&mut self, surface: Surface, _state: &SharedState) -> Result<(), ViewError> {
        let mut surface = surface;
        surface.scene.title = "Gender Gap in Life Expectancy".to_string();
        surface.scene.x_label = "Year".to_string();
        let values = self
            .data
            .gender_gap()
            .comparison
            .iter()
            .filter_map(|r| r.endpoints())
            .flat_map(|(a, b)| [a.male, a.female, b.male, b.female]);
        if let Some((lo, hi)) = extent(values) {
            surface.scene.subtitle = format!("Life expectancy {:.0}-{:.0} years", lo, hi);
        }
        self.surface = Some(surface);
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
}

impl Highlightable for GenderGapView {
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
