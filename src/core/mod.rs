//! Platform-agnostic coordination core - shared between the WASM dashboard and the CLI

pub mod data;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod loader;
pub mod names;
pub mod playback;
pub mod state;
pub mod surface;
pub mod types;

pub use data::{format_population, DatasetFile, DatasetSummary, Datasets, SeriesKey};
pub use dispatcher::{dispatch, DispatchContext, DispatchReport, Dispatcher, Handler};
pub use error::{DispatchError, ViewError};
pub use events::{Channel, Event, SubscriptionId};
pub use loader::{load_all, DataSource, LoadError};
pub use names::{normalize_country, same_country};
pub use playback::{Playback, PlaybackState, Step, Ticker};
pub use state::{CountrySelection, SharedState};
pub use surface::{JoinStats, Mark, Scene, Shape, Style, Surface};
pub use types::{GlobeView, Metric, PaneLayout, PaneState, UnknownName, ViewId, ViewMode, Year};
