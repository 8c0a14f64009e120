//! View controllers
//!
//! Each controller owns its [`Surface`] and its local UI state. Controllers
//! never call each other: they react to dispatcher events routed by the
//! dashboard and read [`SharedState`] snapshots.
//!
//! Optional behavior is exposed through capability traits
//! ([`Highlightable`], [`YearDriven`], [`Animated`]) reached with the
//! `as_*` accessors, so a fan-out only touches views that opt in.

use std::rc::Rc;

use crate::core::{Datasets, Playback, SharedState, Surface, ViewError, ViewId, Year};

pub mod animation;
pub mod comparison;
pub mod detail;
pub mod gender_gap;
pub mod globe;
pub mod growth_drivers;
pub mod radar;
pub mod ridgeline;
pub mod scale;
pub mod small_multiples;
pub mod statistics;
pub mod time_series;

pub use animation::AnimationView;
pub use comparison::{ComparisonMode, ComparisonView};
pub use detail::CountryDetail;
pub use gender_gap::{GapMode, GenderGapView};
pub use globe::{GlobeController, Projection};
pub use growth_drivers::GrowthDriversView;
pub use radar::RadarView;
pub use ridgeline::RidgelineView;
pub use small_multiples::SmallMultiplesView;
pub use statistics::StatisticsView;
pub use time_series::TimeSeriesView;

/// Layer holding the per-entity marks that brushing restyles.
pub const DATA_LAYER: &str = "data";

pub trait ViewController {
    fn id(&self) -> ViewId;

    fn is_initialized(&self) -> bool {
        self.surface().is_some()
    }

    /// One-time construction. The surface may not be sized yet.
    fn init(&mut self, surface: Surface, state: &SharedState) -> Result<(), ViewError>;

    fn surface(&self) -> Option<&Surface>;

    fn surface_mut(&mut self) -> Option<&mut Surface>;

    /// Forget a country chosen through `countrySelected`.
    fn deselect(&mut self) -> Result<(), ViewError> {
        Ok(())
    }

    fn as_highlightable(&mut self) -> Option<&mut dyn Highlightable> {
        None
    }

    fn as_year_driven(&mut self) -> Option<&mut dyn YearDriven> {
        None
    }

    fn as_animated(&mut self) -> Option<&mut dyn Animated> {
        None
    }
}

/// Views that can emphasize one country without changing the selection.
///
/// A country missing from the view's data must yield a local notice, not
/// an error.
pub trait Highlightable {
    fn highlight_country(&mut self, name: &str) -> Result<(), ViewError>;

    /// Restore default styling for every data point.
    fn unhighlight(&mut self) -> Result<(), ViewError>;

    fn highlighted(&self) -> Option<&str>;
}

/// Views re-rendered from a year.
pub trait YearDriven {
    fn update_year(&mut self, year: Year) -> Result<(), ViewError>;

    fn year(&self) -> Year;
}

/// Views with a play/pause/reset timer.
pub trait Animated {
    fn playback(&self) -> &Playback;

    fn play(&mut self, now: f64) -> bool;

    fn pause(&mut self);

    /// Stop and jump back to the view's starting year.
    fn reset(&mut self) -> Result<Year, ViewError>;

    /// Pump the timer. Returns the year shown if playback advanced it.
    fn tick(&mut self, now: f64) -> Result<Option<Year>, ViewError>;
}

/// Surface of an initialized view, or `NotInitialized`.
pub(crate) fn ready(surface: &mut Option<Surface>, view: ViewId) -> Result<&mut Surface, ViewError> {
    surface.as_mut().ok_or(ViewError::NotInitialized(view))
}

/// Shared dataset handle every controller is built with.
pub type Data = Rc<Datasets>;

/// Restyle the data layer so only `name` stands out. Returns whether any
/// mark matched.
pub(crate) fn emphasize(surface: &mut Surface, name: Option<&str>) -> bool {
    let mut matched = false;
    surface.scene.restyle(DATA_LAYER, |mark| {
        let hit = match (name, mark.entity.as_deref()) {
            (Some(target), Some(entity)) => crate::core::same_country(target, entity),
            _ => false,
        };
        if hit {
            matched = true;
            mark.style.highlight();
        } else {
            mark.style.unhighlight();
        }
    });
    matched
}
