//! Retained rendering surfaces
//!
//! Each view draws into its own [`Surface`]: a set of named layers holding
//! keyed marks. Front ends (egui in the browser, text in the CLI) paint the
//! scene; views never paint directly.
//!
//! Updating a layer goes through [`Scene::join`], which matches marks by key
//! the way a data join does. Re-running an update with identical data yields
//! an identical scene.

use std::collections::HashSet;
use tracing::{trace, warn};

use super::types::ViewId;

// ============================================================================
// Marks
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { x: f64, y: f64, r: f64 },
    Polyline(Vec<[f64; 2]>),
    Polygon(Vec<[f64; 2]>),
    Label { x: f64, y: f64, text: String },
    /// Axis-aligned rectangle (box plots, bars).
    Band { x0: f64, x1: f64, y0: f64, y1: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub stroke: String,
    pub stroke_width: f32,
    pub fill: Option<String>,
    pub opacity: f32,
}

impl Style {
    pub const DEFAULT_STROKE: &'static str = "#333";
    pub const HIGHLIGHT_STROKE: &'static str = "#ff0000";

    pub fn filled(fill: &str) -> Self {
        Self {
            fill: Some(fill.to_string()),
            ..Self::default()
        }
    }

    pub fn line(stroke: &str, width: f32) -> Self {
        Self {
            stroke: stroke.to_string(),
            stroke_width: width,
            fill: None,
            opacity: 1.0,
        }
    }

    /// Emphasis used by brushing-and-linking.
    pub fn highlight(&mut self) {
        self.stroke = Self::HIGHLIGHT_STROKE.to_string();
        self.stroke_width = 3.0;
        self.opacity = 1.0;
    }

    /// Undo [`highlight`](Self::highlight).
    pub fn unhighlight(&mut self) {
        self.stroke = Self::DEFAULT_STROKE.to_string();
        self.stroke_width = 1.0;
        self.opacity = 0.7;
    }

    pub fn is_highlighted(&self) -> bool {
        self.stroke == Self::HIGHLIGHT_STROKE
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Self::DEFAULT_STROKE.to_string(),
            stroke_width: 1.0,
            fill: None,
            opacity: 0.7,
        }
    }
}

/// One drawn element. `key` is unique within its layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub key: String,
    pub shape: Shape,
    pub style: Style,
    /// Country or region this mark represents, for hit testing and highlight.
    pub entity: Option<String>,
}

impl Mark {
    pub fn new(key: impl Into<String>, shape: Shape, style: Style) -> Self {
        Self {
            key: key.into(),
            shape,
            style,
            entity: None,
        }
    }

    pub fn for_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

// ============================================================================
// Scene
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub name: String,
    pub marks: Vec<Mark>,
}

/// Counts from one keyed join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    layers: Vec<Layer>,
    pub title: String,
    pub subtitle: String,
    pub x_label: String,
    pub y_label: String,
    pub log_y: bool,
    /// (label, color) swatches.
    pub legend: Vec<(String, String)>,
    notice: Option<String>,
}

impl Scene {
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn marks(&self, layer: &str) -> &[Mark] {
        self.layer(layer).map(|l| l.marks.as_slice()).unwrap_or(&[])
    }

    pub fn mark(&self, layer: &str, key: &str) -> Option<&Mark> {
        self.marks(layer).iter().find(|m| m.key == key)
    }

    pub fn mark_count(&self) -> usize {
        self.layers.iter().map(|l| l.marks.len()).sum()
    }

    fn layer_mut(&mut self, name: &str) -> &mut Layer {
        match self.layers.iter().position(|l| l.name == name) {
            Some(pos) => &mut self.layers[pos],
            None => {
                self.layers.push(Layer {
                    name: name.to_string(),
                    marks: Vec::new(),
                });
                let last = self.layers.len() - 1;
                &mut self.layers[last]
            }
        }
    }

    /// Replace the contents of `layer` with `marks`, matched by key.
    ///
    /// Marks with a key already present are updated, new keys enter, keys
    /// absent from `marks` exit. A duplicated key keeps its last mark.
    pub fn join(&mut self, layer: &str, marks: Vec<Mark>) -> JoinStats {
        let target = self.layer_mut(layer);
        let previous: HashSet<String> = target.marks.iter().map(|m| m.key.clone()).collect();

        let mut next: Vec<Mark> = Vec::with_capacity(marks.len());
        for mark in marks {
            if let Some(existing) = next.iter_mut().find(|m| m.key == mark.key) {
                warn!(layer, key = %mark.key, "Duplicate mark key, keeping last");
                *existing = mark;
            } else {
                next.push(mark);
            }
        }

        let updated = next.iter().filter(|m| previous.contains(&m.key)).count();
        let stats = JoinStats {
            entered: next.len() - updated,
            updated,
            exited: previous.len() - updated,
        };
        target.marks = next;
        trace!(layer, entered = stats.entered, updated = stats.updated, exited = stats.exited, "Join");
        stats
    }

    /// Edit every mark style in `layer` in place.
    pub fn restyle<F: FnMut(&mut Mark)>(&mut self, layer: &str, mut f: F) {
        if let Some(l) = self.layers.iter_mut().find(|l| l.name == layer) {
            l.marks.iter_mut().for_each(&mut f);
        }
    }

    pub fn clear_layer(&mut self, layer: &str) {
        if let Some(l) = self.layers.iter_mut().find(|l| l.name == layer) {
            l.marks.clear();
        }
    }

    /// Drop a whole layer (small-multiple panels come and go).
    pub fn remove_layer(&mut self, layer: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.name != layer);
        self.layers.len() != before
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Inline message shown over the chart, e.g. "No data available".
    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    /// First mark in `layer` whose entity matches `entity`.
    pub fn find_entity(&self, layer: &str, entity: &str) -> Option<&Mark> {
        self.marks(layer)
            .iter()
            .find(|m| m.entity.as_deref() == Some(entity))
    }
}

// ============================================================================
// Surface
// ============================================================================

/// A view's drawing area. The size may be unknown at init and set later.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    view: ViewId,
    size: Option<(f32, f32)>,
    pub scene: Scene,
}

impl Surface {
    pub fn new(view: ViewId) -> Self {
        Self {
            view,
            size: None,
            scene: Scene::default(),
        }
    }

    pub fn sized(view: ViewId, width: f32, height: f32) -> Self {
        let mut surface = Self::new(view);
        surface.resize(width, height);
        surface
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn size(&self) -> Option<(f32, f32)> {
        self.size
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.size = Some((width, height));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(key: &str, x: f64) -> Mark {
        Mark::new(key, Shape::Circle { x, y: 0.0, r: 1.0 }, Style::default()).for_entity(key)
    }

    #[test]
    fn test_join_counts_enter_update_exit() {
        let mut scene = Scene::default();
        let first = scene.join("dots", vec![dot("a", 1.0), dot("b", 2.0)]);
        assert_eq!(first, JoinStats { entered: 2, updated: 0, exited: 0 });

        let second = scene.join("dots", vec![dot("b", 3.0), dot("c", 4.0)]);
        assert_eq!(second, JoinStats { entered: 1, updated: 1, exited: 1 });
        assert_eq!(scene.marks("dots").len(), 2);
        assert!(scene.mark("dots", "a").is_none());
    }

    #[test]
    fn test_repeated_join_is_idempotent() {
        let mut scene = Scene::default();
        scene.join("dots", vec![dot("a", 1.0), dot("b", 2.0)]);
        let snapshot = scene.clone();
        scene.join("dots", vec![dot("a", 1.0), dot("b", 2.0)]);
        assert_eq!(scene, snapshot);
    }

    #[test]
    fn test_duplicate_keys_collapse() {
        let mut scene = Scene::default();
        scene.join("dots", vec![dot("a", 1.0), dot("a", 9.0)]);
        assert_eq!(scene.marks("dots").len(), 1);
        assert_eq!(
            scene.mark("dots", "a").map(|m| m.shape.clone()),
            Some(Shape::Circle { x: 9.0, y: 0.0, r: 1.0 })
        );
    }

    #[test]
    fn test_join_leaves_other_layers_alone() {
        let mut scene = Scene::default();
        scene.join("axes", vec![dot("x", 0.0)]);
        scene.join("dots", vec![dot("a", 1.0)]);
        scene.join("dots", vec![]);
        assert_eq!(scene.marks("axes").len(), 1);
        assert!(scene.marks("dots").is_empty());
    }

    #[test]
    fn test_highlight_round_trip() {
        let mut style = Style::default();
        let original = style.clone();
        style.highlight();
        assert!(style.is_highlighted());
        assert_eq!(style.stroke_width, 3.0);
        style.unhighlight();
        assert_eq!(style, original);
    }

    #[test]
    fn test_surface_size_is_optional() {
        let mut surface = Surface::new(ViewId::Radar);
        assert_eq!(surface.size(), None);
        surface.resize(0.0, 300.0);
        assert_eq!(surface.size(), None);
        surface.resize(640.0, 480.0);
        assert_eq!(surface.size(), Some((640.0, 480.0)));
    }
}
