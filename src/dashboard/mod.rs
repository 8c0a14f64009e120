//! Main controller
//!
//! [`Dashboard`] is the application context: it owns the shared state, the
//! dispatcher, the datasets and every view controller. Front ends turn raw
//! input into the entry points below; cross-view coordination then happens
//! only through dispatched events.
//!
//! Startup initializes the globe, registers the brushing-and-linking
//! subscriptions and announces `dataLoaded`. Other views are initialized
//! lazily, once, on first navigation; each one's own keyed subscriptions are
//! registered right after its init.

pub mod command;

use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::core::{
    dispatch, Channel, Datasets, DispatchContext, DispatchError, DispatchReport, Dispatcher, Event, Metric,
    SharedState, SubscriptionId, Surface, ViewError, ViewId, ViewMode, Year,
};
use crate::views::{
    Animated, AnimationView, ComparisonView, CountryDetail, Data, GenderGapView, GlobeController, GrowthDriversView, RadarView,
    RidgelineView, SmallMultiplesView, StatisticsView, TimeSeriesView, ViewController,
};

pub use command::{CommandError, UiCommand};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

// ============================================================================
// Views
// ============================================================================

/// One instance of every controller, built at startup.
pub struct Views {
    pub globe: GlobeController,
    pub time_series: TimeSeriesView,
    pub comparison: ComparisonView,
    pub multiples: SmallMultiplesView,
    pub animation: AnimationView,
    pub radar: RadarView,
    pub ridgeline: RidgelineView,
    pub growth: GrowthDriversView,
    pub gender_gap: GenderGapView,
    pub statistics: StatisticsView,
    /// Overview-mode detail panel.
    pub detail: CountryDetail,
}

impl Views {
    fn new(data: &Data, config: &DashboardConfig) -> Self {
        Self {
            globe: GlobeController::new(Rc::clone(data), config),
            time_series: TimeSeriesView::new(Rc::clone(data)),
            comparison: ComparisonView::new(Rc::clone(data), config),
            multiples: SmallMultiplesView::new(Rc::clone(data)),
            animation: AnimationView::new(Rc::clone(data), config),
            radar: RadarView::new(Rc::clone(data)),
            ridgeline: RidgelineView::new(Rc::clone(data)),
            growth: GrowthDriversView::new(Rc::clone(data), config),
            gender_gap: GenderGapView::new(Rc::clone(data)),
            statistics: StatisticsView::new(Rc::clone(data)),
            detail: CountryDetail::new(Rc::clone(data)),
        }
    }

    pub fn get(&self, id: ViewId) -> &dyn ViewController {
        match id {
            ViewId::Globe => &self.globe,
            ViewId::TimeSeries => &self.time_series,
            ViewId::Comparison => &self.comparison,
            ViewId::SmallMultiples => &self.multiples,
            ViewId::Animation => &self.animation,
            ViewId::Radar => &self.radar,
            ViewId::Ridgeline => &self.ridgeline,
            ViewId::GrowthDrivers => &self.growth,
            ViewId::GenderGap => &self.gender_gap,
            ViewId::Statistics => &self.statistics,
        }
    }

    pub fn get_mut(&mut self, id: ViewId) -> &mut dyn ViewController {
        match id {
            ViewId::Globe => &mut self.globe,
            ViewId::TimeSeries => &mut self.time_series,
            ViewId::Comparison => &mut self.comparison,
            ViewId::SmallMultiples => &mut self.multiples,
            ViewId::Animation => &mut self.animation,
            ViewId::Radar => &mut self.radar,
            ViewId::Ridgeline => &mut self.ridgeline,
            ViewId::GrowthDrivers => &mut self.growth,
            ViewId::GenderGap => &mut self.gender_gap,
            ViewId::Statistics => &mut self.statistics,
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

pub struct Dashboard {
    state: SharedState,
    dispatcher: Dispatcher<Dashboard>,
    data: Data,
    config: DashboardConfig,
    views: Views,
}

impl DispatchContext for Dashboard {
    fn dispatcher(&mut self) -> &mut Dispatcher<Self> {
        &mut self.dispatcher
    }
}

impl Dashboard {
    /// Wire everything over loaded datasets and announce `dataLoaded`.
    pub fn start(config: DashboardConfig, datasets: Datasets) -> Result<Self, DashboardError> {
        let data: Data = Rc::new(datasets);
        let views = Views::new(&data, &config);
        let mut dashboard = Self {
            state: SharedState::new(),
            dispatcher: Dispatcher::new(),
            data,
            config,
            views,
        };

        dashboard.ensure_initialized(ViewId::Globe)?;
        dashboard.register_links();

        let summary = dashboard.data.summary();
        info!(?summary, "Dashboard ready");
        dispatch(&mut dashboard, Event::DataLoaded(summary))?;
        Ok(dashboard)
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    /// View-local controls (comparison list, gender-gap mode, axes, ...).
    pub fn views_mut(&mut self) -> &mut Views {
        &mut self.views
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn handler_count(&self, channel: Channel) -> usize {
        self.dispatcher.handler_count(channel)
    }

    /// Surface shown in the details pane for the current mode.
    pub fn visible_view(&self) -> ViewId {
        self.state.current_mode.view()
    }

    /// Header text above the details pane.
    pub fn details_title(&self) -> &str {
        if self.views.detail.is_open() {
            self.views.detail.title()
        } else {
            self.state.current_mode.title()
        }
    }

    pub fn surface(&self, view: ViewId) -> Option<&Surface> {
        self.views.get(view).surface()
    }

    pub fn resize(&mut self, view: ViewId, width: f32, height: f32) -> Result<(), ViewError> {
        if view == ViewId::Globe {
            return self.views.globe.resize(width, height);
        }
        if let Some(surface) = self.views.get_mut(view).surface_mut() {
            surface.resize(width, height);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Run `view`'s one-time init if it has not run yet.
    fn ensure_initialized(&mut self, view: ViewId) -> Result<(), ViewError> {
        if self.state.is_processed(view) {
            return Ok(());
        }
        self.views.get_mut(view).init(Surface::new(view), &self.state)?;
        self.state.mark_processed(view);
        self.register_view_links(view);
        info!(%view, "View initialized");
        Ok(())
    }

    /// Show exactly one view, initializing it on first use, then announce
    /// `visualizationChanged`.
    pub fn switch_visualization(&mut self, mode: ViewMode) -> Result<DispatchReport, DashboardError> {
        debug!(%mode, "Switching visualization");
        self.state.current_mode = mode;
        self.views.detail.close();
        self.ensure_initialized(mode.view())?;
        Ok(dispatch(self, Event::VisualizationChanged(mode))?)
    }

    pub fn toggle_globe_pane(&mut self) {
        self.state.panes.toggle_globe();
        debug!(globe = ?self.state.panes.globe(), details = ?self.state.panes.details(), "Pane layout");
    }

    pub fn toggle_details_pane(&mut self) {
        self.state.panes.toggle_details();
        debug!(globe = ?self.state.panes.globe(), details = ?self.state.panes.details(), "Pane layout");
    }

    /// Detail panel close button: back to overview with nothing selected.
    pub fn close_detail(&mut self) {
        self.views.detail.close();
        self.state.current_mode = ViewMode::Overview;
        self.state.clear_selection();
        for id in ViewId::ALL {
            let view = self.views.get_mut(*id);
            if !view.is_initialized() {
                continue;
            }
            if let Err(e) = view.deselect() {
                warn!(view = %id, error = %e, "Deselect failed");
            }
        }
        self.unhighlight_all_countries();
    }

    // ------------------------------------------------------------------
    // Brushing and linking
    // ------------------------------------------------------------------

    fn register_links(&mut self) {
        let main = |channel| SubscriptionId::new(channel, "");
        self.dispatcher.on(main(Channel::CountrySelected), Self::on_country_selected);
        self.dispatcher.on(main(Channel::CountryHighlighted), |dash: &mut Self, event: &Event| {
            if let Event::CountryHighlighted(name) = event {
                dash.highlight_country_in_all_views(name);
            }
            Ok(())
        });
        self.dispatcher.on(main(Channel::CountryUnhighlighted), |dash: &mut Self, _: &Event| {
            dash.unhighlight_all_countries();
            Ok(())
        });
        self.dispatcher.on(main(Channel::YearChanged), Self::on_year_changed);
        self.dispatcher.on(main(Channel::ModeChanged), |dash: &mut Self, event: &Event| {
            if let Event::ModeChanged(metric) = event {
                dash.state.current_visualization = *metric;
            }
            Ok(())
        });
        self.dispatcher.on(main(Channel::RegionSelected), |dash: &mut Self, event: &Event| {
            if let Event::RegionSelected(region) = event {
                dash.state.selected_region = Some(region.clone());
            }
            Ok(())
        });
        self.dispatcher.on(main(Channel::DataLoaded), |_: &mut Self, event: &Event| {
            if let Event::DataLoaded(summary) = event {
                info!(
                    globe_years = summary.globe_years,
                    countries = summary.detail_countries,
                    regions = summary.regions,
                    "Data loaded"
                );
            }
            Ok(())
        });
    }

    /// Subscriptions a view owns, keyed by the view.
    fn register_view_links(&mut self, view: ViewId) {
        match view {
            ViewId::TimeSeries => {
                let id = |channel| SubscriptionId::new(channel, "timeseries");
                self.dispatcher.on(id(Channel::CountrySelected), |dash: &mut Self, event: &Event| {
                    match event {
                        Event::CountrySelected { name, .. } => dash.views.time_series.toggle_country(name),
                        _ => Ok(()),
                    }
                });
                self.dispatcher.on(id(Channel::ModeChanged), |dash: &mut Self, event: &Event| match event {
                    Event::ModeChanged(metric) => dash.views.time_series.change_mode(*metric),
                    _ => Ok(()),
                });
                self.dispatcher.on(id(Channel::RegionSelected), |dash: &mut Self, event: &Event| match event {
                    Event::RegionSelected(region) => dash.views.time_series.toggle_region(region),
                    _ => Ok(()),
                });
            }
            ViewId::Radar => {
                self.dispatcher.on(
                    SubscriptionId::new(Channel::CountrySelected, "radar"),
                    |dash: &mut Self, event: &Event| match event {
                        Event::CountrySelected { name, .. } => dash.views.radar.select_country(name),
                        _ => Ok(()),
                    },
                );
            }
            ViewId::SmallMultiples => {
                self.dispatcher.on(
                    SubscriptionId::new(Channel::CountrySelected, "smallMultiples"),
                    |dash: &mut Self, event: &Event| match event {
                        Event::CountrySelected { name, .. } => dash.views.multiples.toggle_country(name),
                        _ => Ok(()),
                    },
                );
            }
            _ => {}
        }
    }

    fn on_country_selected(&mut self, event: &Event) -> Result<(), ViewError> {
        let Event::CountrySelected { code, name } = event else {
            return Ok(());
        };
        self.state.select_country(code.as_str(), name.as_str());
        if self.state.current_mode == ViewMode::Overview {
            self.views.detail.show(code, name);
        }
        self.highlight_country_in_all_views(name);
        Ok(())
    }

    fn on_year_changed(&mut self, event: &Event) -> Result<(), ViewError> {
        let Event::YearChanged(year) = event else {
            return Ok(());
        };
        self.state.set_current_year(*year);
        if let Err(e) = self.views.globe.show_year(*year) {
            warn!(view = %ViewId::Globe, error = %e, "Year update failed");
        }
        for id in ViewId::ALL {
            let view = self.views.get_mut(*id);
            if !view.is_initialized() {
                continue;
            }
            if let Some(driven) = view.as_year_driven() {
                if let Err(e) = driven.update_year(*year) {
                    warn!(view = %id, error = %e, "Year update failed");
                }
            }
        }
        Ok(())
    }

    /// Best-effort highlight on every initialized view that supports it.
    /// Returns how many views applied it.
    pub fn highlight_country_in_all_views(&mut self, name: &str) -> usize {
        let mut applied = 0;
        for id in ViewId::ALL {
            let view = self.views.get_mut(*id);
            if !view.is_initialized() {
                continue;
            }
            if let Some(target) = view.as_highlightable() {
                match target.highlight_country(name) {
                    Ok(()) => applied += 1,
                    Err(e) => warn!(view = %id, country = name, error = %e, "Highlight failed"),
                }
            }
        }
        debug!(country = name, views = applied, "Coordinated highlight");
        applied
    }

    pub fn unhighlight_all_countries(&mut self) {
        for id in ViewId::ALL {
            let view = self.views.get_mut(*id);
            if !view.is_initialized() {
                continue;
            }
            if let Some(target) = view.as_highlightable() {
                if let Err(e) = target.unhighlight() {
                    warn!(view = %id, error = %e, "Unhighlight failed");
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Raw input
    // ------------------------------------------------------------------

    /// Globe click by name or ISO3 code. Unknown countries are ignored.
    pub fn click_country(&mut self, name_or_code: &str) -> Result<Option<DispatchReport>, DispatchError> {
        match self.views.globe.click_country(name_or_code) {
            Some(event) => dispatch(self, event).map(Some),
            None => {
                warn!(country = name_or_code, "Clicked country not on the map");
                Ok(None)
            }
        }
    }

    /// Announce a selection directly, e.g. from a country dropdown.
    pub fn select_country(&mut self, code: &str, name: &str) -> Result<DispatchReport, DispatchError> {
        dispatch(self, Event::country_selected(code, name))
    }

    pub fn hover_country(&mut self, name: &str) -> Result<DispatchReport, DispatchError> {
        dispatch(self, Event::CountryHighlighted(name.to_string()))
    }

    pub fn unhover_country(&mut self) -> Result<DispatchReport, DispatchError> {
        dispatch(self, Event::CountryUnhighlighted)
    }

    /// Globe year slider.
    pub fn drag_year(&mut self, year: Year) -> Result<DispatchReport, DashboardError> {
        let event = self.views.globe.drag_year(&mut self.state, year)?;
        Ok(dispatch(self, event)?)
    }

    /// Year slider inside the animation or growth-drivers view. Local only.
    pub fn drag_view_year(&mut self, view: ViewId, year: Year) -> Result<(), ViewError> {
        match view {
            ViewId::Animation => self.views.animation.drag_year(year),
            ViewId::GrowthDrivers => self.views.growth.drag_year(year),
            _ => {
                warn!(%view, "View has no year slider");
                Ok(())
            }
        }
    }

    /// Globe metric selector.
    pub fn choose_metric(&mut self, metric: Metric) -> Result<DispatchReport, DashboardError> {
        let event = self.views.globe.choose_metric(&mut self.state, metric)?;
        Ok(dispatch(self, event)?)
    }

    pub fn select_region(&mut self, region: &str) -> Result<DispatchReport, DispatchError> {
        dispatch(self, Event::RegionSelected(region.to_string()))
    }

    pub fn toggle_globe_view(&mut self) -> Result<(), ViewError> {
        self.views.globe.toggle_view(&mut self.state)
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    /// Start `view`'s timer. `false` if it was already running, has no
    /// timer, or is not initialized.
    pub fn play(&mut self, view: ViewId, now: f64) -> bool {
        let controller = self.views.get_mut(view);
        if !controller.is_initialized() {
            return false;
        }
        controller.as_animated().is_some_and(|a| a.play(now))
    }

    pub fn pause(&mut self, view: ViewId) {
        if let Some(animated) = self.views.get_mut(view).as_animated() {
            animated.pause();
        }
    }

    /// Stop and rewind `view`. The globe announces its reset year.
    pub fn reset(&mut self, view: ViewId) -> Result<Option<Year>, DashboardError> {
        let controller = self.views.get_mut(view);
        if !controller.is_initialized() {
            return Ok(None);
        }
        let Some(animated) = controller.as_animated() else {
            return Ok(None);
        };
        let year = animated.reset()?;
        if view == ViewId::Globe {
            self.state.set_current_year(year);
            dispatch(self, Event::YearChanged(year))?;
        }
        Ok(Some(year))
    }

    pub fn set_animation_speed(&mut self, interval_ms: u64, now: f64) {
        self.views.animation.set_speed(interval_ms, now);
    }

    /// Pump every live timer. Hosts call this once per frame or interval.
    /// Returns how many views advanced a year.
    pub fn tick(&mut self, now: f64) -> usize {
        let mut advanced = 0;
        for id in ViewId::ALL {
            let controller = self.views.get_mut(*id);
            if !controller.is_initialized() {
                continue;
            }
            let Some(animated) = controller.as_animated() else {
                continue;
            };
            match animated.tick(now) {
                Ok(Some(year)) => {
                    advanced += 1;
                    if *id == ViewId::Globe {
                        self.state.set_current_year(year);
                        if let Err(e) = dispatch(self, Event::YearChanged(year)) {
                            warn!(error = %e, "Year announcement failed");
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(view = %id, error = %e, "Tick failed"),
            }
        }
        advanced
    }

    pub fn live_timers(&self) -> usize {
        [ViewId::Globe, ViewId::Animation, ViewId::GrowthDrivers]
            .into_iter()
            .filter(|id| match id {
                ViewId::Globe => self.views.globe.playback().has_live_timer(),
                ViewId::Animation => self.views.animation.playback().has_live_timer(),
                _ => self.views.growth.playback().has_live_timer(),
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DatasetFile, Datasets};
    use crate::views::{Highlightable, YearDriven};

    fn datasets() -> Datasets {
        let mut data = Datasets::default();
        data.insert(
            DatasetFile::GeoJson,
            r#"{"features": [
                {"id": "FRA", "properties": {"name": "France"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,45],[5,45],[5,50],[0,50],[0,45]]]}}
            ]}"#,
        )
        .unwrap();
        data.insert(
            DatasetFile::Animation,
            r#"[{"country": "France", "year": 1950, "fertility": 2.9, "lifeExpectancy": 66.0, "population": 41800, "region": "Europe"}]"#,
        )
        .unwrap();
        data
    }

    #[test]
    fn test_start_initializes_only_the_globe() {
        let dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        assert_eq!(dash.state().processed().collect::<Vec<_>>(), vec![ViewId::Globe]);
        assert_eq!(dash.handler_count(Channel::CountrySelected), 1);
        assert_eq!(dash.details_title(), "Select a country to explore");
    }

    #[test]
    fn test_view_links_registered_on_first_init() {
        let mut dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        dash.switch_visualization(ViewMode::TimeSeries).unwrap();
        dash.switch_visualization(ViewMode::Radar).unwrap();
        dash.switch_visualization(ViewMode::Radar).unwrap();
        assert_eq!(dash.handler_count(Channel::CountrySelected), 3);
        assert_eq!(dash.handler_count(Channel::ModeChanged), 2);
    }

    #[test]
    fn test_click_in_overview_opens_detail() {
        let mut dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        dash.click_country("FRA").unwrap();
        assert_eq!(dash.state().selected_country(), Some("France"));
        assert_eq!(dash.details_title(), "France");
        assert_eq!(dash.views().globe.highlighted(), Some("France"));

        dash.close_detail();
        assert_eq!(dash.state().selection(), None);
        assert_eq!(dash.views().globe.highlighted(), None);
        assert_eq!(dash.details_title(), "Select a country to explore");
    }

    #[test]
    fn test_hover_does_not_select() {
        let mut dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        dash.switch_visualization(ViewMode::Animation).unwrap();
        dash.hover_country("France").unwrap();
        assert_eq!(dash.state().selection(), None);
        assert_eq!(dash.views().animation.highlighted(), Some("France"));
        dash.unhover_country().unwrap();
        assert_eq!(dash.views().animation.highlighted(), None);
    }

    #[test]
    fn test_metric_choice_updates_state() {
        let mut dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        dash.choose_metric(Metric::MedianAge).unwrap();
        assert_eq!(dash.state().current_visualization, Metric::MedianAge);
        assert_eq!(dash.state().current_mode, ViewMode::Overview);
    }

    #[test]
    fn test_globe_reset_announces_last_year() {
        let mut dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        dash.switch_visualization(ViewMode::Animation).unwrap();
        dash.drag_year(Year::FIRST).unwrap();
        assert_eq!(dash.views().animation.year(), Year::FIRST);
        assert_eq!(dash.reset(ViewId::Globe).unwrap(), Some(Year::LAST));
        assert_eq!(dash.state().current_year(), Year::LAST);
        assert_eq!(dash.views().animation.year(), Year::LAST);
        assert_eq!(dash.reset(ViewId::Animation).unwrap(), Some(Year::FIRST));
        assert_eq!(dash.state().current_year(), Year::LAST);
    }

    #[test]
    fn test_globe_playback_drives_shared_year() {
        let mut dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        dash.drag_year(Year::new(2021).unwrap()).unwrap();
        assert!(dash.play(ViewId::Globe, 0.0));
        assert!(!dash.play(ViewId::Globe, 0.1));
        assert_eq!(dash.live_timers(), 1);

        dash.tick(0.5);
        assert_eq!(dash.state().current_year(), Year::new(2022).unwrap());
        dash.tick(1.0);
        dash.tick(1.5);
        assert_eq!(dash.state().current_year(), Year::LAST);
        assert_eq!(dash.live_timers(), 0);
    }

    #[test]
    fn test_globe_failure_does_not_block_year_fan_out() {
        let mut dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        dash.switch_visualization(ViewMode::Animation).unwrap();
        // Globe stays marked processed but loses its surface.
        dash.views.globe = GlobeController::new(Rc::clone(&dash.data), &dash.config);

        let year = Year::new(1990).unwrap();
        let report = dispatch(&mut dash, Event::YearChanged(year)).unwrap();
        assert_eq!(report.failed, 0);
        assert_eq!(dash.state().current_year(), year);
        assert_eq!(dash.views().animation.year(), year);
    }

    #[test]
    fn test_uninitialized_views_are_skipped() {
        let mut dash = Dashboard::start(DashboardConfig::default(), datasets()).unwrap();
        assert!(!dash.play(ViewId::Animation, 0.0));
        assert_eq!(dash.reset(ViewId::GrowthDrivers).unwrap(), None);
        assert_eq!(dash.highlight_country_in_all_views("France"), 1);
    }
}
