//! Domain vocabulary shared by every view: years, view modes, metrics, panes.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Year
// ============================================================================

/// A calendar year inside dataset coverage (1950..=2023).
///
/// Construction is checked, so a `Year` held anywhere in the dashboard is
/// always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u16")]
pub struct Year(u16);

impl Year {
    pub const FIRST: Year = Year(1950);
    pub const LAST: Year = Year(2023);

    pub fn new(value: i64) -> Option<Self> {
        if (Self::FIRST.0 as i64..=Self::LAST.0 as i64).contains(&value) {
            Some(Year(value as u16))
        } else {
            None
        }
    }

    /// Clamp any integer into coverage.
    pub fn clamped(value: i64) -> Self {
        Year(value.clamp(Self::FIRST.0 as i64, Self::LAST.0 as i64) as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Following year, or `None` at the end of coverage.
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 as i64 + 1)
    }

    pub fn is_last(self) -> bool {
        self == Self::LAST
    }
}

impl From<Year> for u16 {
    fn from(year: Year) -> u16 {
        year.0
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Year::new(raw).ok_or_else(|| {
            serde::de::Error::custom(format!("year {raw} outside 1950..=2023"))
        })
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error for string forms that name no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! named_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub const fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::core::types::UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    _ => Err($crate::core::types::UnknownName {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use named_enum;

// ============================================================================
// Views and modes
// ============================================================================

/// Identity of each view controller; also the key of the processed flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViewId {
    Globe,
    TimeSeries,
    Comparison,
    SmallMultiples,
    Animation,
    Radar,
    Ridgeline,
    GrowthDrivers,
    GenderGap,
    Statistics,
}

named_enum!(ViewId, "view", {
    Globe => "globe",
    TimeSeries => "timeseries",
    Comparison => "comparison",
    SmallMultiples => "multiples",
    Animation => "animation",
    Radar => "radar",
    Ridgeline => "ridgeline",
    GrowthDrivers => "growth-drivers",
    GenderGap => "gender-gap",
    Statistics => "statistics",
});

/// Top-level visible view (`currentMode`). Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Overview,
    TimeSeries,
    Comparison,
    Multiples,
    Animation,
    Radar,
    Ridgeline,
    GrowthDrivers,
    GenderGap,
    Statistics,
}

named_enum!(ViewMode, "view mode", {
    Overview => "overview",
    TimeSeries => "timeseries",
    Comparison => "comparison",
    Multiples => "multiples",
    Animation => "animation",
    Radar => "radar",
    Ridgeline => "ridgeline",
    GrowthDrivers => "growth-drivers",
    GenderGap => "gender-gap",
    Statistics => "statistics",
});

impl ViewMode {
    /// The controller whose surface this mode shows. Overview lives on the globe.
    pub fn view(self) -> ViewId {
        match self {
            ViewMode::Overview => ViewId::Globe,
            ViewMode::TimeSeries => ViewId::TimeSeries,
            ViewMode::Comparison => ViewId::Comparison,
            ViewMode::Multiples => ViewId::SmallMultiples,
            ViewMode::Animation => ViewId::Animation,
            ViewMode::Radar => ViewId::Radar,
            ViewMode::Ridgeline => ViewId::Ridgeline,
            ViewMode::GrowthDrivers => ViewId::GrowthDrivers,
            ViewMode::GenderGap => ViewId::GenderGap,
            ViewMode::Statistics => ViewId::Statistics,
        }
    }

    /// Header shown above the details pane.
    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Overview => "Select a country to explore",
            ViewMode::TimeSeries => "Regional Population Trends",
            ViewMode::Comparison => "Population Comparison",
            ViewMode::Multiples => "Regional Birth & Death Rates",
            ViewMode::Animation => "Demographic Transition Animation",
            ViewMode::Radar => "Country DNA Profile",
            ViewMode::Ridgeline => "Global Ageing Distribution",
            ViewMode::GrowthDrivers => "Drivers of Population Growth",
            ViewMode::GenderGap => "Life Expectancy Gender Gap",
            ViewMode::Statistics => "Correlations & Distributions",
        }
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Metric the globe colors by (`currentVisualization`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    #[default]
    Population,
    Density,
    SexRatio,
    MedianAge,
    DemographicTransition,
    GrowthDrivers,
    LongevityGap,
    FertilityHealth,
    HealthcareQuality,
    GenderGap,
}

named_enum!(Metric, "metric", {
    Population => "population",
    Density => "density",
    SexRatio => "sex-ratio",
    MedianAge => "median-age",
    DemographicTransition => "demographic-transition",
    GrowthDrivers => "growth-drivers",
    LongevityGap => "longevity-gap",
    FertilityHealth => "fertility-health",
    HealthcareQuality => "healthcare-quality",
    GenderGap => "gender-gap",
});

impl Metric {
    /// Sequential or diverging color scheme the globe uses for this metric.
    pub fn color_scheme(self) -> &'static str {
        match self {
            Metric::Population => "Reds",
            Metric::Density => "Blues",
            Metric::SexRatio => "PiYG",
            Metric::MedianAge => "YlOrRd",
            Metric::DemographicTransition => "Greens",
            Metric::GrowthDrivers => "Purples",
            Metric::LongevityGap => "Oranges",
            Metric::FertilityHealth => "Purples",
            Metric::HealthcareQuality => "Reds",
            Metric::GenderGap => "RdBu",
        }
    }

    /// Population and density span orders of magnitude and use a log domain.
    pub fn uses_log_scale(self) -> bool {
        matches!(self, Metric::Population | Metric::Density)
    }

    /// Gender gap can be negative and uses a domain symmetric around zero.
    pub fn is_diverging(self) -> bool {
        matches!(self, Metric::GenderGap)
    }
}

// ============================================================================
// Globe and pane layout
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlobeView {
    #[default]
    Globe3d,
    Map2d,
}

impl GlobeView {
    pub fn toggled(self) -> Self {
        match self {
            GlobeView::Globe3d => GlobeView::Map2d,
            GlobeView::Map2d => GlobeView::Globe3d,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneState {
    #[default]
    Normal,
    Maximized,
    Minimized,
}

/// Globe and details panes. One maximized always means the other minimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneLayout {
    globe: PaneState,
    details: PaneState,
}

impl PaneLayout {
    pub fn globe(&self) -> PaneState {
        self.globe
    }

    pub fn details(&self) -> PaneState {
        self.details
    }

    /// Globe maximize button: maximize from normal, otherwise restore both.
    pub fn toggle_globe(&mut self) {
        if self.globe == PaneState::Normal {
            self.globe = PaneState::Maximized;
            self.details = PaneState::Minimized;
        } else {
            self.restore();
        }
    }

    /// Details maximize button: maximize from normal, otherwise restore both.
    pub fn toggle_details(&mut self) {
        if self.details == PaneState::Normal {
            self.details = PaneState::Maximized;
            self.globe = PaneState::Minimized;
        } else {
            self.restore();
        }
    }

    pub fn restore(&mut self) {
        self.globe = PaneState::Normal;
        self.details = PaneState::Normal;
    }

    pub fn is_consistent(&self) -> bool {
        match (self.globe, self.details) {
            (PaneState::Normal, PaneState::Normal) => true,
            (PaneState::Maximized, PaneState::Minimized) => true,
            (PaneState::Minimized, PaneState::Maximized) => true,
            _ => false,
        }
    }
}
