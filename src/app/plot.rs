//! Scene painting with egui_plot, plus pointer hit testing

use eframe::egui;
use egui_plot::{Line, Plot, PlotPoint, PlotPoints, PlotTransform, Points, Polygon, Text};

use crate::core::{Mark, Scene, Shape};
use crate::theme::{colors, scene_color};
use crate::views::globe::{point_in_ring, Projection};

/// Screen distance within which a line vertex or dot counts as hovered.
const HIT_RADIUS: f32 = 6.0;

/// Maps scene coordinates to plot coordinates.
#[derive(Clone, Copy)]
pub(crate) enum Axes {
    Data { log_y: bool },
    Globe(Projection),
}

impl Axes {
    fn map(&self, p: [f64; 2]) -> Option<[f64; 2]> {
        match self {
            Axes::Data { log_y: false } => Some(p),
            Axes::Data { log_y: true } => (p[1] > 0.0).then(|| [p[0], p[1].log10()]),
            Axes::Globe(projection) => projection.project(p[0], p[1]),
        }
    }

    fn map_all(&self, points: &[[f64; 2]]) -> Option<Vec<[f64; 2]>> {
        points.iter().map(|p| self.map(*p)).collect()
    }
}

/// What the pointer did over a painted scene.
#[derive(Default)]
pub(crate) struct PointerHit {
    /// Topmost mark under the pointer: (layer, key, entity).
    pub hovered: Option<(String, String, Option<String>)>,
    pub clicked: bool,
    /// Drag delta in screen points while the primary button is held.
    pub drag: Option<egui::Vec2>,
    pub scroll: f32,
}

fn paint_mark(plot_ui: &mut egui_plot::PlotUi, mark: &Mark, axes: Axes) {
    let style = &mark.style;
    let stroke_color = scene_color(&style.stroke, style.opacity);
    let fill_color = style.fill.as_deref().map(|f| scene_color(f, style.opacity));

    match &mark.shape {
        Shape::Polyline(points) => {
            if let Some(mapped) = axes.map_all(points) {
                plot_ui.line(Line::new(PlotPoints::from(mapped)).color(stroke_color).width(style.stroke_width));
            }
        }
        Shape::Polygon(points) => {
            if let Some(mapped) = axes.map_all(points) {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(mapped))
                        .fill_color(fill_color.unwrap_or(egui::Color32::TRANSPARENT))
                        .stroke(egui::Stroke::new(style.stroke_width, stroke_color)),
                );
            }
        }
        Shape::Band { x0, x1, y0, y1 } => {
            let corners = [[*x0, *y0], [*x1, *y0], [*x1, *y1], [*x0, *y1]];
            if let Some(mapped) = axes.map_all(&corners) {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(mapped))
                        .fill_color(fill_color.unwrap_or(egui::Color32::TRANSPARENT))
                        .stroke(egui::Stroke::new(style.stroke_width, stroke_color)),
                );
            }
        }
        Shape::Circle { x, y, r } => {
            if let Some(center) = axes.map([*x, *y]) {
                plot_ui.points(
                    Points::new(vec![center])
                        .radius(*r as f32)
                        .color(fill_color.unwrap_or(stroke_color))
                        .filled(true),
                );
            }
        }
        Shape::Label { x, y, text } => {
            if let Some([px, py]) = axes.map([*x, *y]) {
                plot_ui.text(Text::new(
                    PlotPoint::new(px, py),
                    egui::RichText::new(text).color(colors::TEXT_SECONDARY).size(10.0),
                ));
            }
        }
    }
}

fn screen(transform: &PlotTransform, p: [f64; 2]) -> egui::Pos2 {
    transform.position_from_point(&PlotPoint::new(p[0], p[1]))
}

fn hits(mark: &Mark, axes: Axes, transform: &PlotTransform, pointer: egui::Pos2) -> bool {
    let near = |p: [f64; 2]| screen(transform, p).distance(pointer) <= HIT_RADIUS;
    match &mark.shape {
        Shape::Circle { x, y, r } => axes
            .map([*x, *y])
            .is_some_and(|c| screen(transform, c).distance(pointer) <= (*r as f32).max(HIT_RADIUS)),
        Shape::Polyline(points) => axes.map_all(points).is_some_and(|pts| pts.into_iter().any(near)),
        Shape::Polygon(points) => axes.map_all(points).is_some_and(|pts| {
            let ring: Vec<[f64; 2]> = pts
                .iter()
                .map(|p| {
                    let s = screen(transform, *p);
                    [s.x as f64, s.y as f64]
                })
                .collect();
            point_in_ring(&ring, [pointer.x as f64, pointer.y as f64])
        }),
        Shape::Band { x0, x1, y0, y1 } => {
            let (Some(a), Some(b)) = (axes.map([*x0, *y0]), axes.map([*x1, *y1])) else {
                return false;
            };
            egui::Rect::from_two_pos(screen(transform, a), screen(transform, b)).contains(pointer)
        }
        Shape::Label { .. } => false,
    }
}

/// Title, subtitle, plot, legend and notice of one scene.
pub(crate) fn paint_scene(ui: &mut egui::Ui, id: &str, scene: &Scene, axes: Axes) -> PointerHit {
    if !scene.title.is_empty() {
        ui.label(egui::RichText::new(&scene.title).strong().size(14.0));
    }
    if !scene.subtitle.is_empty() {
        ui.label(egui::RichText::new(&scene.subtitle).color(colors::TEXT_SECONDARY).size(11.0));
    }
    if let Some(notice) = scene.notice() {
        ui.colored_label(colors::NOTICE, notice);
    }

    let globe = matches!(axes, Axes::Globe(_));
    let legend_space = if scene.legend.is_empty() { 0.0 } else { 24.0 };
    let mut plot = Plot::new(id.to_string())
        .height((ui.available_height() - legend_space).max(120.0))
        .show_grid(!globe)
        .show_axes([!globe, !globe])
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_boxed_zoom(false)
        .show_x(false)
        .show_y(false);
    if globe {
        plot = plot.data_aspect(1.0).include_x(-1.7).include_x(1.7).include_y(-1.1).include_y(1.1);
    } else {
        plot = plot.x_axis_label(scene.x_label.clone()).y_axis_label(scene.y_label.clone());
    }

    let response = plot.show(ui, |plot_ui| {
        for layer in scene.layers() {
            for mark in &layer.marks {
                paint_mark(plot_ui, mark, axes);
            }
        }
    });

    let mut hit = PointerHit::default();
    if let Some(pointer) = response.response.hover_pos() {
        hit.hovered = scene
            .layers()
            .iter()
            .rev()
            .flat_map(|layer| layer.marks.iter().rev().map(move |m| (layer, m)))
            .find(|(_, m)| hits(m, axes, &response.transform, pointer))
            .map(|(layer, m)| (layer.name.clone(), m.key.clone(), m.entity.clone()));
        hit.scroll = ui.input(|i| i.smooth_scroll_delta.y);
    }
    hit.clicked = response.response.clicked();
    if response.response.dragged() {
        hit.drag = Some(response.response.drag_delta());
    }

    if !scene.legend.is_empty() {
        ui.horizontal_wrapped(|ui| {
            for (label, color) in &scene.legend {
                ui.colored_label(scene_color(color, 1.0), "■");
                ui.label(egui::RichText::new(label).size(10.0));
                ui.add_space(6.0);
            }
        });
    }
    hit
}
