//! Median-age distribution per decade, one ridge each. Static after init.

use tracing::{debug, error};

use super::scale::{extent, interpolate};
use super::{ready, Data, ViewController, DATA_LAYER};
use crate::core::{data::RidgelineDecade, Mark, SharedState, Shape, Style, Surface, ViewError, ViewId};

/// Age axis domain in years.
pub const AGE_DOMAIN: (f64, f64) = (10.0, 60.0);
/// Ridge height as a multiple of its band, so neighbours overlap.
const OVERLAP: f64 = 1.5;
const LABEL_LAYER: &str = "labels";
const FILL_OPACITY: f32 = 0.6;
const HOVER_OPACITY: f32 = 0.9;

fn decade_color(decade: i64) -> String {
    interpolate("Viridis", (decade as f64 - 1950.0) / 70.0)
}

pub struct RidgelineView {
    data: Data,
    surface: Option<Surface>,
    hovered: Option<i64>,
}

impl RidgelineView {
    pub fn new(data: Data) -> Self {
        Self {
            data,
            surface: None,
            hovered: None,
        }
    }

    pub fn hovered(&self) -> Option<i64> {
        self.hovered
    }

    /// Emphasize one ridge and return its tooltip text.
    pub fn hover_decade(&mut self, decade: i64) -> Result<Option<String>, ViewError> {
        let Some(d) = self.data.ridgeline().iter().find(|d| d.decade == decade) else {
            return Ok(None);
        };
        let tooltip = format!(
            "{}\nCountries: {}\nMean Age: {:.1} years\nMedian Age: {:.1} years",
            d.label, d.countries, d.mean, d.median
        );
        let key = format!("ridge:{decade}");
        ready(&mut self.surface, ViewId::Ridgeline)?.scene.restyle(DATA_LAYER, |m| {
            if m.key.starts_with("ridge:") {
                m.style.opacity = if m.key == key { HOVER_OPACITY } else { FILL_OPACITY };
            }
        });
        self.hovered = Some(decade);
        Ok(Some(tooltip))
    }

    pub fn unhover(&mut self) -> Result<(), ViewError> {
        ready(&mut self.surface, ViewId::Ridgeline)?.scene.restyle(DATA_LAYER, |m| {
            if m.key.starts_with("ridge:") {
                m.style.opacity = FILL_OPACITY;
            }
        });
        self.hovered = None;
        Ok(())
    }

    fn ridge_marks(decades: &[RidgelineDecade]) -> (Vec<Mark>, Vec<Mark>) {
        let max_density = extent(decades.iter().flat_map(|d| d.distribution.iter().map(|b| b.density)))
            .map(|(_, hi)| hi)
            .filter(|hi| *hi > 0.0)
            .unwrap_or(1.0);
        let n = decades.len();
        let mut ridges = Vec::with_capacity(n * 3);
        let mut labels = Vec::with_capacity(n);

        // Oldest decade on top.
        for (i, d) in decades.iter().enumerate() {
            let base = (n - 1 - i) as f64;
            let height = |density: f64| base + density / max_density * OVERLAP;
            let color = decade_color(d.decade);

            let outline: Vec<[f64; 2]> = d.distribution.iter().map(|b| [b.age, height(b.density)]).collect();
            let mut area = outline.clone();
            if let (Some(first), Some(last)) = (d.distribution.first(), d.distribution.last()) {
                area.push([last.age, base]);
                area.push([first.age, base]);
            }

            let mut fill = Style::filled(&color);
            fill.stroke = "none".to_string();
            fill.opacity = FILL_OPACITY;
            ridges.push(Mark::new(format!("ridge:{}", d.decade), Shape::Polygon(area), fill).for_entity(d.label.clone()));
            ridges.push(
                Mark::new(format!("outline:{}", d.decade), Shape::Polyline(outline), Style::line(&color, 2.0))
                    .for_entity(d.label.clone()),
            );

            let mut mean = Style::line(&color, 2.0);
            mean.opacity = 0.7;
            ridges.push(Mark::new(
                format!("mean:{}", d.decade),
                Shape::Polyline(vec![[d.mean, base], [d.mean, base + OVERLAP * 0.5]]),
                mean,
            ));

            labels.push(Mark::new(
                format!("label:{}", d.decade),
                Shape::Label {
                    x: AGE_DOMAIN.0,
                    y: base + 0.5,
                    text: d.label.clone(),
                },
                Style::line("#4a5568", 1.0),
            ));
        }
        (ridges, labels)
    }
}

impl ViewController for RidgelineView {
    fn id(&self) -> ViewId {
        ViewId::Ridgeline
    }

    fn init(&mut self, surface: Surface, _state: &SharedState) -> Result<(), ViewError> {
        let mut surface = surface;
        surface.scene.title = "Global Ageing Distribution".to_string();
        surface.scene.x_label = "Median Age (years)".to_string();

        let decades = self.data.ridgeline();
        if decades.is_empty() {
            error!("No ridgeline data available");
            surface.scene.set_notice(Some("No data available".to_string()));
        } else {
            let (ridges, labels) = Self::ridge_marks(decades);
            surface.scene.join(DATA_LAYER, ridges);
            surface.scene.join(LABEL_LAYER, labels);
            debug!(decades = decades.len(), "Ridgeline drawn");
        }
        self.surface = Some(surface);
        Ok(())
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

    fn view(json: &str) -> RidgelineView {
        let mut data = Datasets::default();
        data.insert(DatasetFile::Ridgeline, json).unwrap();
        let mut view = RidgelineView::new(Rc::new(data));
        view.init(Surface::new(ViewId::Ridgeline), &SharedState::new()).unwrap();
        view
    }

    const TWO_DECADES: &str = r#"[
        {"decade": 1950, "label": "1950s", "countries": 200, "mean": 21.5, "median": 20.1,
         "distribution": [{"age": 15, "count": 10, "density": 0.02}, {"age": 20, "count": 50, "density": 0.08}]},
        {"decade": 2020, "label": "2020s", "countries": 236, "mean": 31.0, "median": 30.2,
         "distribution": [{"age": 25, "count": 40, "density": 0.04}, {"age": 35, "count": 30, "density": 0.03}]}
    ]"#;

    #[test]
    fn test_one_ridge_per_decade() {
        let view = view(TWO_DECADES);
        let scene = &view.surface().unwrap().scene;
        assert_eq!(scene.marks(LABEL_LAYER).len(), 2);
        assert!(scene.mark(DATA_LAYER, "ridge:1950").is_some());
        assert!(scene.mark(DATA_LAYER, "mean:2020").is_some());
    }

    #[test]
    fn test_oldest_decade_on_top_and_peak_scaled() {
        let view = view(TWO_DECADES);
        let outline = view.surface().unwrap().scene.mark(DATA_LAYER, "outline:1950").unwrap();
        let Shape::Polyline(points) = &outline.shape else { panic!("expected polyline") };
        // Band 1 plus the tallest bin at full overlap.
        assert_eq!(points[1], [20.0, 1.0 + OVERLAP]);
    }

    #[test]
    fn test_hover_emphasizes_one_ridge() {
        let mut view = view(TWO_DECADES);
        let tooltip = view.hover_decade(2020).unwrap().unwrap();
        assert!(tooltip.contains("Mean Age: 31.0 years"));
        let scene = &view.surface().unwrap().scene;
        assert_eq!(scene.mark(DATA_LAYER, "ridge:2020").unwrap().style.opacity, HOVER_OPACITY);
        assert_eq!(scene.mark(DATA_LAYER, "ridge:1950").unwrap().style.opacity, FILL_OPACITY);
        assert_eq!(view.hover_decade(1900).unwrap(), None);
        view.unhover().unwrap();
        assert_eq!(view.hovered(), None);
    }

    #[test]
    fn test_empty_data_shows_notice() {
        let view = view("[]");
        assert_eq!(view.surface().unwrap().scene.notice(), Some("No data available"));
    }
}
