//! Error types for dispatch and per-view rendering.

use super::types::{UnknownName, ViewId};
use super::events::Channel;

/// Misuse of the dispatcher. These are programming errors, not runtime
/// conditions, and are always logged at `error!`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown event channel: {0}")]
    UnknownChannel(#[from] UnknownName),
    #[error("malformed subscription '{0}', expected 'channel.key'")]
    MalformedSubscription(String),
    #[error("re-entrant dispatch of '{0}' refused while its handlers are running")]
    Reentrant(Channel),
}

/// Failure inside one view controller. Never crosses a fan-out boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("{0} view used before init")]
    NotInitialized(ViewId),
    #[error("{view} view: {reason}")]
    Data { view: ViewId, reason: String },
}
