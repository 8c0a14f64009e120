//! Event channels and their typed payloads
//!
//! Channels are fixed at compile time. A subscription is addressed by
//! `(channel, key)`, written `"countrySelected.radar"` in string form; a bare
//! channel name uses the empty key.

use std::fmt;
use std::str::FromStr;

use super::data::DatasetSummary;
use super::error::DispatchError;
use super::types::{named_enum, Metric, ViewMode, Year};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    CountrySelected,
    YearChanged,
    ModeChanged,
    VisualizationChanged,
    CountryHighlighted,
    CountryUnhighlighted,
    RegionSelected,
    DataLoaded,
}

named_enum!(Channel, "channel", {
    CountrySelected => "countrySelected",
    YearChanged => "yearChanged",
    ModeChanged => "modeChanged",
    VisualizationChanged => "visualizationChanged",
    CountryHighlighted => "countryHighlighted",
    CountryUnhighlighted => "countryUnhighlighted",
    RegionSelected => "regionSelected",
    DataLoaded => "dataLoaded",
});

impl Channel {
    /// Dense index for per-channel tables.
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// A dispatched event. The dispatcher never inspects the payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CountrySelected { code: String, name: String },
    YearChanged(Year),
    /// Globe metric (`currentVisualization`).
    ModeChanged(Metric),
    /// Visible top-level view (`currentMode`).
    VisualizationChanged(ViewMode),
    CountryHighlighted(String),
    CountryUnhighlighted,
    RegionSelected(String),
    DataLoaded(DatasetSummary),
}

impl Event {
    pub fn channel(&self) -> Channel {
        match self {
            Event::CountrySelected { .. } => Channel::CountrySelected,
            Event::YearChanged(_) => Channel::YearChanged,
            Event::ModeChanged(_) => Channel::ModeChanged,
            Event::VisualizationChanged(_) => Channel::VisualizationChanged,
            Event::CountryHighlighted(_) => Channel::CountryHighlighted,
            Event::CountryUnhighlighted => Channel::CountryUnhighlighted,
            Event::RegionSelected(_) => Channel::RegionSelected,
            Event::DataLoaded(_) => Channel::DataLoaded,
        }
    }

    pub fn country_selected(code: impl Into<String>, name: impl Into<String>) -> Self {
        Event::CountrySelected {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// `(channel, key)` identity of one registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    pub channel: Channel,
    pub key: String,
}

impl SubscriptionId {
    pub fn new(channel: Channel, key: impl Into<String>) -> Self {
        Self {
            channel,
            key: key.into(),
        }
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.channel)
        } else {
            write!(f, "{}.{}", self.channel, self.key)
        }
    }
}

impl FromStr for SubscriptionId {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (channel, key) = match s.split_once('.') {
            Some((_, "")) => return Err(DispatchError::MalformedSubscription(s.to_string())),
            Some((channel, key)) => (channel, key),
            None => (s, ""),
        };
        Ok(SubscriptionId::new(channel.parse::<Channel>()?, key))
    }
}
