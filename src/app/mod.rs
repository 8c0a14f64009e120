//! Browser dashboard app
//!
//! Paints the globe pane and the details pane from view scenes and turns
//! egui input into [`Dashboard`] entry points. All cross-view effects go
//! through the dashboard's dispatcher; this module never touches another
//! view's state directly.

mod header;
mod plot;

use eframe::egui;
use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::core::{Datasets, LoadError, PaneState, SeriesKey, ViewId, ViewMode, Year};
use crate::dashboard::Dashboard;
use crate::theme::{colors, light_visuals};
use crate::time::now_seconds;
use crate::views::statistics::METRICS;
use crate::views::{ComparisonMode, CountryDetail, GapMode, YearDriven};
use plot::{paint_scene, Axes, PointerHit};

/// Animation speed buttons: (label, interval).
const SPEEDS: [(&str, u64); 3] = [("0.5x", 2000), ("1x", 1000), ("2x", 500)];

enum Session {
    Ready(Box<Dashboard>),
    Failed(String),
}

pub struct DashboardApp {
    session: Session,
    panes: PaneUi,
}

/// Widget state that lives between frames.
#[derive(Default)]
struct PaneUi {
    /// Entity currently announced as highlighted by hover.
    hovered: Option<String>,
    /// Country picked in the per-view dropdowns.
    picked: String,
    dragging_globe: bool,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig, loaded: Result<Datasets, LoadError>) -> Self {
        cc.egui_ctx.set_visuals(light_visuals());

        let session = match loaded {
            Ok(datasets) => match Dashboard::start(config, datasets) {
                Ok(dash) => {
                    info!("Dashboard ready");
                    Session::Ready(Box::new(dash))
                }
                Err(e) => Session::Failed(format!("Error initializing dashboard: {e}")),
            },
            Err(e) => Session::Failed(format!("Error loading data: {e}")),
        };
        Self {
            session,
            panes: PaneUi::default(),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let Self { session, panes: pane_ui } = self;
        let dash = match session {
            Session::Ready(dash) => dash,
            Session::Failed(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.colored_label(colors::NOTICE, message.as_str());
                });
                return;
            }
        };

        // Playback timers and globe rotation are pumped once per frame.
        dash.tick(now_seconds());
        ctx.request_repaint();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            DashboardApp::render_header(dash, ui);
        });

        let panes = dash.state().panes;
        let mut hovered = pane_ui.hovered.take();
        match (panes.globe(), panes.details()) {
            (PaneState::Minimized, _) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    pane_ui.render_details_pane(dash, ui, &mut hovered);
                });
            }
            (_, PaneState::Minimized) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    pane_ui.render_globe_pane(dash, ui, &mut hovered);
                });
            }
            _ => {
                egui::SidePanel::left("globe")
                    .resizable(true)
                    .default_width(ctx.screen_rect().width() * 0.45)
                    .show(ctx, |ui| {
                        pane_ui.render_globe_pane(dash, ui, &mut hovered);
                    });
                egui::CentralPanel::default().show(ctx, |ui| {
                    pane_ui.render_details_pane(dash, ui, &mut hovered);
                });
            }
        }
        pane_ui.hovered = hovered;
    }
}

// ============================================================================
// Panes
// ============================================================================

impl PaneUi {
    fn render_globe_pane(&mut self, dash: &mut Dashboard, ui: &mut egui::Ui, hovered: &mut Option<String>) {
        ui.horizontal(|ui| {
            Self::playback_buttons(dash, ui, ViewId::Globe);
            let mut year = dash.state().current_year().get();
            let slider = ui.add(egui::Slider::new(&mut year, Year::FIRST.get()..=Year::LAST.get()).text("Year"));
            if slider.changed() {
                if let Some(year) = Year::new(year.into()) {
                    if let Err(e) = dash.drag_year(year) {
                        warn!(error = %e, "Year change failed");
                    }
                }
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⛶").on_hover_text("Maximize globe").clicked() {
                    dash.toggle_globe_pane();
                }
            });
        });

        let projection = dash.views().globe.projection();
        let Some(surface) = dash.surface(ViewId::Globe) else {
            return;
        };
        let hit = paint_scene(ui, "globe", &surface.scene, Axes::Globe(projection));

        match hit.drag {
            Some(delta) => {
                self.dragging_globe = true;
                dash.views_mut().globe.drag(delta.x.into(), delta.y.into());
            }
            None if self.dragging_globe => {
                self.dragging_globe = false;
                dash.views_mut().globe.drag_end();
            }
            None => {}
        }
        if hit.scroll != 0.0 {
            let zoom = projection.zoom * (1.0 + f64::from(hit.scroll) * 0.002);
            dash.views_mut().globe.zoom(zoom);
        }
        Self::pointer(dash, hit, hovered);
    }

    fn render_details_pane(&mut self, dash: &mut Dashboard, ui: &mut egui::Ui, hovered: &mut Option<String>) {
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new(dash.details_title()).color(colors::TEXT_PRIMARY));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⛶").on_hover_text("Maximize details").clicked() {
                    dash.toggle_details_pane();
                }
                if dash.views().detail.is_open() && ui.button("✕").clicked() {
                    dash.close_detail();
                }
            });
        });
        ui.separator();

        if dash.state().current_mode == ViewMode::Overview {
            Self::render_country_detail(&dash.views().detail, ui);
            return;
        }

        self.render_view_controls(dash, ui);
        let view = dash.visible_view();
        let Some(surface) = dash.surface(view) else {
            ui.spinner();
            return;
        };
        let axes = Axes::Data {
            log_y: surface.scene.log_y,
        };
        let hit = paint_scene(ui, view.name(), &surface.scene, axes);
        if view == ViewId::Ridgeline {
            Self::ridgeline_hover(dash, &hit);
        }
        Self::pointer(dash, hit, hovered);
    }

    fn render_country_detail(detail: &CountryDetail, ui: &mut egui::Ui) {
        let Some(country) = detail.country() else {
            ui.label(egui::RichText::new("Click a country on the globe to see its demographics.").color(colors::TEXT_MUTED));
            return;
        };
        if let Some(flag) = detail.flag_path() {
            ui.label(egui::RichText::new(flag).color(colors::TEXT_MUTED).size(10.0));
        }
        if let Some(summary) = detail.summary() {
            ui.label(summary);
        }
        let scene = detail.scene();
        if let Some(notice) = scene.notice() {
            ui.colored_label(colors::NOTICE, notice);
            return;
        }
        let height = (ui.available_height() / 4.0 - 8.0).max(80.0);
        for (layer, label) in CountryDetail::chart_labels() {
            ui.label(egui::RichText::new(label).size(11.0));
            let marks = scene.marks(layer);
            egui_plot::Plot::new(format!("detail-{country}-{layer}"))
                .height(height)
                .allow_zoom(false)
                .allow_drag(false)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    for mark in marks {
                        if let crate::core::Shape::Polyline(points) = &mark.shape {
                            plot_ui.line(
                                egui_plot::Line::new(egui_plot::PlotPoints::from(points.clone()))
                                    .color(crate::theme::scene_color(&mark.style.stroke, mark.style.opacity))
                                    .width(mark.style.stroke_width),
                            );
                        }
                    }
                });
        }
    }
}

// ============================================================================
// Input
// ============================================================================

impl PaneUi {
    /// Hover announces highlight changes; a click selects.
    fn pointer(dash: &mut Dashboard, hit: PointerHit, hovered: &mut Option<String>) {
        let entity = hit.hovered.and_then(|(_, _, entity)| entity);
        if entity != *hovered {
            let result = match &entity {
                Some(name) => dash.hover_country(name),
                None => dash.unhover_country(),
            };
            if let Err(e) = result {
                warn!(error = %e, "Hover announcement failed");
            }
            *hovered = entity.clone();
        }

        if !hit.clicked {
            return;
        }
        let Some(name) = entity else {
            return;
        };
        let is_region = dash.data().region_metadata().iter().any(|r| r.name == name);
        let result = if is_region && dash.visible_view() == ViewId::TimeSeries {
            dash.select_region(&name).map(Some)
        } else {
            dash.click_country(&name)
        };
        if let Err(e) = result {
            warn!(entity = %name, error = %e, "Click failed");
        }
    }

    fn ridgeline_hover(dash: &mut Dashboard, hit: &PointerHit) {
        let decade = hit
            .hovered
            .as_ref()
            .and_then(|(_, key, _)| key.strip_prefix("ridge:"))
            .and_then(|d| d.parse::<i64>().ok());
        let ridgeline = &mut dash.views_mut().ridgeline;
        let result = match decade {
            Some(d) if ridgeline.hovered() != Some(d) => ridgeline.hover_decade(d).map(|_| ()),
            None if ridgeline.hovered().is_some() => ridgeline.unhover(),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!(error = %e, "Ridgeline hover failed");
        }
    }

    fn playback_buttons(dash: &mut Dashboard, ui: &mut egui::Ui, view: ViewId) {
        let now = now_seconds();
        if ui.button("▶").on_hover_text("Play").clicked() {
            dash.play(view, now);
        }
        if ui.button("⏸").on_hover_text("Pause").clicked() {
            dash.pause(view);
        }
        if ui.button("⟲").on_hover_text("Reset").clicked() {
            if let Err(e) = dash.reset(view) {
                warn!(%view, error = %e, "Reset failed");
            }
        }
    }

    fn country_picker(&mut self, dash: &Dashboard, ui: &mut egui::Ui, id: &str) -> Option<String> {
        let mut chosen = None;
        egui::ComboBox::from_id_salt(id)
            .selected_text(if self.picked.is_empty() { "Add country" } else { self.picked.as_str() })
            .show_ui(ui, |ui| {
                for name in dash.data().countries_list() {
                    if ui.selectable_label(false, name).clicked() {
                        chosen = Some(name.clone());
                    }
                }
            });
        if let Some(name) = &chosen {
            self.picked = name.clone();
        }
        chosen
    }

    /// Controls local to the visible view.
    fn render_view_controls(&mut self, dash: &mut Dashboard, ui: &mut egui::Ui) {
        let now = now_seconds();
        let mode = dash.state().current_mode;
        ui.horizontal_wrapped(|ui| {
            let result = match mode {
                ViewMode::TimeSeries => {
                    let mut log = dash.views().time_series.log_scale();
                    let toggled = ui.checkbox(&mut log, "Log scale").changed();
                    let picked = self.country_picker(dash, ui, "ts-country");
                    let series = &mut dash.views_mut().time_series;
                    match (toggled, picked) {
                        (true, _) => series.set_log_scale(log),
                        (_, Some(name)) => series.toggle_country(&name),
                        _ => Ok(()),
                    }
                }
                ViewMode::Comparison => {
                    let mut cmp = dash.views().comparison.mode();
                    ui.radio_value(&mut cmp, ComparisonMode::Regions, "Regions");
                    ui.radio_value(&mut cmp, ComparisonMode::Countries, "Countries");
                    let picked = self.country_picker(dash, ui, "cmp-country");
                    let comparison = &mut dash.views_mut().comparison;
                    let mut result = Ok(());
                    if cmp != comparison.mode() {
                        result = comparison.set_mode(cmp);
                    }
                    if let Some(name) = picked {
                        result = result.and(comparison.add_country(&name).map(|_| ()));
                    }
                    let selected: Vec<String> = comparison.selected_countries().to_vec();
                    for name in selected {
                        if ui.small_button(format!("{name} ✕")).clicked() {
                            result = result.and(comparison.remove_country(&name));
                        }
                    }
                    result
                }
                ViewMode::Multiples => match self.country_picker(dash, ui, "sm-country") {
                    Some(name) => dash.views_mut().multiples.toggle_country(&name),
                    None => Ok(()),
                },
                ViewMode::Animation => {
                    Self::playback_buttons(dash, ui, ViewId::Animation);
                    for (label, ms) in SPEEDS {
                        if ui.small_button(label).clicked() {
                            dash.set_animation_speed(ms, now);
                        }
                    }
                    Self::view_year_slider(dash, ui, ViewId::Animation)
                }
                ViewMode::GrowthDrivers => {
                    Self::playback_buttons(dash, ui, ViewId::GrowthDrivers);
                    Self::view_year_slider(dash, ui, ViewId::GrowthDrivers)
                }
                ViewMode::Radar => match self.country_picker(dash, ui, "radar-country") {
                    Some(name) => match dash.click_country(&name) {
                        Ok(_) => Ok(()),
                        Err(e) => {
                            warn!(error = %e, "Radar selection failed");
                            Ok(())
                        }
                    },
                    None => Ok(()),
                },
                ViewMode::GenderGap => {
                    let mut gap = dash.views().gender_gap.mode();
                    ui.radio_value(&mut gap, GapMode::Slopegraph, "Slopegraph");
                    ui.radio_value(&mut gap, GapMode::TimeSeries, "Time series");
                    if gap != dash.views().gender_gap.mode() {
                        dash.views_mut().gender_gap.set_mode(gap)
                    } else {
                        Ok(())
                    }
                }
                ViewMode::Statistics => {
                    let (mut x, mut y) = dash.views().statistics.axes();
                    Self::metric_combo(ui, "stats-x", "X", &mut x);
                    Self::metric_combo(ui, "stats-y", "Y", &mut y);
                    if (x, y) != dash.views().statistics.axes() {
                        dash.views_mut().statistics.set_axes(x, y)
                    } else {
                        Ok(())
                    }
                }
                ViewMode::Overview | ViewMode::Ridgeline => Ok(()),
            };
            if let Err(e) = result {
                warn!(%mode, error = %e, "View control failed");
            }
        });
    }

    fn metric_combo(ui: &mut egui::Ui, id: &str, label: &str, key: &mut SeriesKey) {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(key.label())
            .show_ui(ui, |ui| {
                for m in METRICS {
                    ui.selectable_value(key, m, m.label());
                }
            });
    }

    fn view_year_slider(dash: &mut Dashboard, ui: &mut egui::Ui, view: ViewId) -> Result<(), crate::core::ViewError> {
        let current = match view {
            ViewId::Animation => dash.views().animation.year(),
            _ => dash.views().growth.year(),
        };
        let mut year = current.get();
        if ui
            .add(egui::Slider::new(&mut year, Year::FIRST.get()..=Year::LAST.get()))
            .changed()
        {
            if let Some(year) = Year::new(year.into()) {
                return dash.drag_view_year(view, year);
            }
        }
        Ok(())
    }
}
