//! Shared application state
//!
//! One instance per session, owned by the dashboard. Views read any field;
//! a field is written only by the code path that owns the corresponding UI
//! control, which then announces the change through the dispatcher.

use std::collections::BTreeSet;
use tracing::debug;

use super::types::{GlobeView, Metric, PaneLayout, ViewId, ViewMode, Year};

/// A focused country. Name and code are always set and cleared together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountrySelection {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SharedState {
    selection: Option<CountrySelection>,
    pub selected_region: Option<String>,
    current_year: Year,
    pub current_mode: ViewMode,
    pub current_visualization: Metric,
    pub globe_view: GlobeView,
    pub panes: PaneLayout,
    processed: BTreeSet<ViewId>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            selection: None,
            selected_region: None,
            current_year: Year::LAST,
            current_mode: ViewMode::default(),
            current_visualization: Metric::default(),
            globe_view: GlobeView::default(),
            panes: PaneLayout::default(),
            processed: BTreeSet::new(),
        }
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&CountrySelection> {
        self.selection.as_ref()
    }

    pub fn selected_country(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.name.as_str())
    }

    pub fn selected_country_code(&self) -> Option<&str> {
        self.selection.as_ref().map(|s| s.code.as_str())
    }

    pub fn select_country(&mut self, code: impl Into<String>, name: impl Into<String>) {
        let selection = CountrySelection {
            code: code.into(),
            name: name.into(),
        };
        debug!(country = %selection.name, code = %selection.code, "Country selected");
        self.selection = Some(selection);
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            debug!("Country selection cleared");
        }
    }

    pub fn current_year(&self) -> Year {
        self.current_year
    }

    pub fn set_current_year(&mut self, year: Year) {
        self.current_year = year;
    }

    pub fn is_processed(&self, view: ViewId) -> bool {
        self.processed.contains(&view)
    }

    /// Record that `view` ran its one-time init. Returns `false` if it
    /// already had.
    pub fn mark_processed(&mut self, view: ViewId) -> bool {
        let first = self.processed.insert(view);
        if first {
            debug!(%view, "View marked processed");
        }
        first
    }

    pub fn processed(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.processed.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_fields_move_together() {
        let mut state = SharedState::new();
        assert_eq!(state.selected_country(), None);
        assert_eq!(state.selected_country_code(), None);

        state.select_country("FRA", "France");
        assert_eq!(state.selected_country(), Some("France"));
        assert_eq!(state.selected_country_code(), Some("FRA"));

        state.clear_selection();
        assert_eq!(state.selection(), None);
        assert_eq!(state, SharedState::new());
    }

    #[test]
    fn test_region_is_independent_of_country() {
        let mut state = SharedState::new();
        state.selected_region = Some("Oceania".into());
        state.select_country("FJI", "Fiji");
        state.clear_selection();
        assert_eq!(state.selected_region.as_deref(), Some("Oceania"));
    }

    #[test]
    fn test_processed_flag_is_set_once() {
        let mut state = SharedState::new();
        assert!(!state.is_processed(ViewId::Radar));
        assert!(state.mark_processed(ViewId::Radar));
        assert!(!state.mark_processed(ViewId::Radar));
        assert_eq!(state.processed().collect::<Vec<_>>(), vec![ViewId::Radar]);
    }

    #[test]
    fn test_defaults_match_initial_dashboard() {
        let state = SharedState::new();
        assert_eq!(state.current_year(), Year::LAST);
        assert_eq!(state.current_mode, ViewMode::Overview);
        assert_eq!(state.current_visualization, Metric::Population);
        assert_eq!(state.globe_view, GlobeView::Globe3d);
        assert!(state.panes.is_consistent());
    }
}
