//! Header bar: view navigation, globe metric and pane controls

use eframe::egui;
use tracing::warn;

use super::DashboardApp;
use crate::core::{GlobeView, Metric, ViewMode};
use crate::dashboard::Dashboard;
use crate::theme::colors;

impl DashboardApp {
    pub(crate) fn render_header(dash: &mut Dashboard, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label(egui::RichText::new("World Demographics").strong().color(colors::ACCENT));
            ui.add_space(10.0);

            let current = dash.state().current_mode;
            for &mode in ViewMode::ALL {
                let text = match mode {
                    ViewMode::Overview => "Overview",
                    _ => mode.title(),
                };
                let label = egui::RichText::new(text).size(11.0);
                if ui.selectable_label(current == mode, label).clicked() && current != mode {
                    if let Err(e) = dash.switch_visualization(mode) {
                        warn!(%mode, error = %e, "View switch failed");
                    }
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let projection = match dash.state().globe_view {
                    GlobeView::Globe3d => "2D Map",
                    GlobeView::Map2d => "3D Globe",
                };
                if ui.button(projection).clicked() {
                    if let Err(e) = dash.toggle_globe_view() {
                        warn!(error = %e, "Projection toggle failed");
                    }
                }

                let mut metric = dash.state().current_visualization;
                egui::ComboBox::from_id_salt("metric")
                    .selected_text(metric.name())
                    .show_ui(ui, |ui| {
                        for &m in Metric::ALL {
                            ui.selectable_value(&mut metric, m, m.name());
                        }
                    });
                if metric != dash.state().current_visualization {
                    if let Err(e) = dash.choose_metric(metric) {
                        warn!(%metric, error = %e, "Metric change failed");
                    }
                }
            });
        });
    }
}
