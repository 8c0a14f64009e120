//! Text commands for the headless session.
//!
//! Each command maps onto one [`Dashboard`](super::Dashboard) entry point,
//! so a typed session exercises the same paths as pointer input.

use thiserror::Error;
use tracing::{debug, info};

use super::{Dashboard, DashboardError};
use crate::core::{Metric, SeriesKey, UnknownName, ViewId, ViewMode, Year};
use crate::views::{ComparisonMode, GapMode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{command}' needs {what}")]
    MissingArgument { command: &'static str, what: &'static str },
    #[error("year must be between 1950 and 2023, got '{0}'")]
    InvalidYear(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unknown option '{value}' for '{command}'")]
    InvalidOption { command: &'static str, value: String },
    #[error(transparent)]
    UnknownName(#[from] UnknownName),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    /// Globe click by name or ISO3 code.
    Click(String),
    /// Selection with an explicit code, as the dropdowns send it.
    Select { code: String, name: String },
    Hover(String),
    Unhover,
    CloseDetail,
    Year(Year),
    View(ViewMode),
    Metric(Metric),
    Region(String),
    Play(ViewId),
    Pause(ViewId),
    Reset(ViewId),
    Speed(u64),
    PaneGlobe,
    PaneDetails,
    ToggleProjection,
    CompareMode(ComparisonMode),
    CompareAdd(String),
    CompareRemove(String),
    GapMode(GapMode),
    Axes(SeriesKey, SeriesKey),
    LogScale(bool),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  click <country|ISO3>          select a country on the globe
  select <ISO3> <country>       select with an explicit code
  hover <country> | unhover     highlight without selecting
  close                         close the country detail panel
  year <1950-2023>              move the globe year slider
  view <mode>                   overview, timeseries, comparison, multiples, animation,
                                radar, ridgeline, growth-drivers, gender-gap, statistics
  metric <metric>               globe coloring metric
  region <name>                 toggle a region in the time series
  play|pause|reset [view]       globe (default), animation, growth-drivers
  speed <ms>                    animation interval
  pane globe|details            maximize/restore a pane
  projection                    toggle 3D globe / 2D map
  compare regions|countries     comparison mode
  compare add|remove <country>  edit the comparison list
  gap slopegraph|timeseries     gender gap mode
  axes <xField> <yField>        statistics metrics, e.g. medianAge birthRate
  log on|off                    time-series log scale
  status | help | quit";

fn rest(words: &[&str]) -> String {
    words.join(" ")
}

fn required(words: &[&str], command: &'static str, what: &'static str) -> Result<String, CommandError> {
    if words.is_empty() {
        Err(CommandError::MissingArgument { command, what })
    } else {
        Ok(rest(words))
    }
}

fn series_key(field: &str) -> Result<SeriesKey, CommandError> {
    SeriesKey::from_field(field).ok_or_else(|| CommandError::InvalidOption {
        command: "axes",
        value: field.to_string(),
    })
}

impl UiCommand {
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let words: Vec<&str> = input.split_whitespace().collect();
        let Some((head, args)) = words.split_first() else {
            return Err(CommandError::Empty);
        };

        let view_or_globe = |args: &[&str]| -> Result<ViewId, CommandError> {
            match args.first() {
                None => Ok(ViewId::Globe),
                Some(name) => Ok(name.parse()?),
            }
        };

        let command = match head.to_lowercase().as_str() {
            "click" => UiCommand::Click(required(args, "click", "a country")?),
            "select" => match args.split_first() {
                Some((code, name)) if !name.is_empty() => UiCommand::Select {
                    code: code.to_string(),
                    name: rest(name),
                },
                _ => {
                    return Err(CommandError::MissingArgument {
                        command: "select",
                        what: "a code and a country name",
                    })
                }
            },
            "hover" => UiCommand::Hover(required(args, "hover", "a country")?),
            "unhover" => UiCommand::Unhover,
            "close" => UiCommand::CloseDetail,
            "year" => {
                let raw = required(args, "year", "a year")?;
                let year = raw
                    .parse::<i64>()
                    .ok()
                    .and_then(Year::new)
                    .ok_or(CommandError::InvalidYear(raw))?;
                UiCommand::Year(year)
            }
            "view" => UiCommand::View(required(args, "view", "a mode")?.parse()?),
            "metric" => UiCommand::Metric(required(args, "metric", "a metric")?.parse()?),
            "region" => UiCommand::Region(required(args, "region", "a region")?),
            "play" => UiCommand::Play(view_or_globe(args)?),
            "pause" => UiCommand::Pause(view_or_globe(args)?),
            "reset" => UiCommand::Reset(view_or_globe(args)?),
            "speed" => {
                let raw = required(args, "speed", "milliseconds")?;
                UiCommand::Speed(raw.parse().map_err(|_| CommandError::InvalidNumber(raw))?)
            }
            "pane" => match args.first().copied() {
                Some("globe") => UiCommand::PaneGlobe,
                Some("details") => UiCommand::PaneDetails,
                Some(other) => {
                    return Err(CommandError::InvalidOption {
                        command: "pane",
                        value: other.to_string(),
                    })
                }
                None => {
                    return Err(CommandError::MissingArgument {
                        command: "pane",
                        what: "'globe' or 'details'",
                    })
                }
            },
            "projection" => UiCommand::ToggleProjection,
            "compare" => match args.split_first() {
                Some((&"regions", _)) => UiCommand::CompareMode(ComparisonMode::Regions),
                Some((&"countries", _)) => UiCommand::CompareMode(ComparisonMode::Countries),
                Some((&"add", name)) => UiCommand::CompareAdd(required(name, "compare add", "a country")?),
                Some((&"remove", name)) => UiCommand::CompareRemove(required(name, "compare remove", "a country")?),
                Some((other, _)) => {
                    return Err(CommandError::InvalidOption {
                        command: "compare",
                        value: other.to_string(),
                    })
                }
                None => {
                    return Err(CommandError::MissingArgument {
                        command: "compare",
                        what: "a mode or add/remove",
                    })
                }
            },
            "gap" => match args.first().copied() {
                Some("slopegraph") => UiCommand::GapMode(GapMode::Slopegraph),
                Some("timeseries") => UiCommand::GapMode(GapMode::TimeSeries),
                other => {
                    return Err(CommandError::InvalidOption {
                        command: "gap",
                        value: other.unwrap_or_default().to_string(),
                    })
                }
            },
            "axes" => match args {
                [x, y] => UiCommand::Axes(series_key(x)?, series_key(y)?),
                _ => {
                    return Err(CommandError::MissingArgument {
                        command: "axes",
                        what: "an x and a y field",
                    })
                }
            },
            "log" => match args.first().copied() {
                Some("on") => UiCommand::LogScale(true),
                Some("off") => UiCommand::LogScale(false),
                other => {
                    return Err(CommandError::InvalidOption {
                        command: "log",
                        value: other.unwrap_or_default().to_string(),
                    })
                }
            },
            "status" => UiCommand::Status,
            "help" | "?" => UiCommand::Help,
            "quit" | "exit" => UiCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

// ============================================================================
// Execution
// ============================================================================

impl Dashboard {
    /// Run one parsed command. Session commands (`status`, `help`, `quit`)
    /// belong to the host and are ignored here.
    pub fn apply(&mut self, command: UiCommand, now: f64) -> Result<(), DashboardError> {
        match command {
            UiCommand::Click(name) => {
                self.click_country(&name)?;
            }
            UiCommand::Select { code, name } => {
                self.select_country(&code, &name)?;
            }
            UiCommand::Hover(name) => {
                self.hover_country(&name)?;
            }
            UiCommand::Unhover => {
                self.unhover_country()?;
            }
            UiCommand::CloseDetail => self.close_detail(),
            UiCommand::Year(year) => {
                self.drag_year(year)?;
            }
            UiCommand::View(mode) => {
                self.switch_visualization(mode)?;
            }
            UiCommand::Metric(metric) => {
                self.choose_metric(metric)?;
            }
            UiCommand::Region(region) => {
                self.select_region(&region)?;
            }
            UiCommand::Play(view) => {
                if !self.play(view, now) {
                    info!(%view, "Nothing to play");
                }
            }
            UiCommand::Pause(view) => self.pause(view),
            UiCommand::Reset(view) => {
                self.reset(view)?;
            }
            UiCommand::Speed(ms) => self.set_animation_speed(ms, now),
            UiCommand::PaneGlobe => self.toggle_globe_pane(),
            UiCommand::PaneDetails => self.toggle_details_pane(),
            UiCommand::ToggleProjection => self.toggle_globe_view()?,
            UiCommand::CompareMode(mode) => self.views_mut().comparison.set_mode(mode)?,
            UiCommand::CompareAdd(name) => {
                if !self.views_mut().comparison.add_country(&name)? {
                    info!(country = %name, "Not added to comparison");
                }
            }
            UiCommand::CompareRemove(name) => self.views_mut().comparison.remove_country(&name)?,
            UiCommand::GapMode(mode) => self.views_mut().gender_gap.set_mode(mode)?,
            UiCommand::Axes(x, y) => self.views_mut().statistics.set_axes(x, y)?,
            UiCommand::LogScale(on) => self.views_mut().time_series.set_log_scale(on)?,
            session @ (UiCommand::Status | UiCommand::Help | UiCommand::Quit) => {
                debug!(command = ?session, "Session command");
            }
        }
        Ok(())
    }

    /// One-line summary of the shared state for `status`.
    pub fn status_line(&self) -> String {
        let state = self.state();
        format!(
            "view={} year={} metric={} globe={:?} selected={} timers={}",
            state.current_mode,
            state.current_year(),
            state.current_visualization,
            state.globe_view,
            state.selected_country().unwrap_or("-"),
            self.live_timers()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_word_country_names() {
        assert_eq!(
            UiCommand::parse("select USA United States of America"),
            Ok(UiCommand::Select {
                code: "USA".into(),
                name: "United States of America".into()
            })
        );
        assert_eq!(UiCommand::parse("hover  Viet   Nam"), Ok(UiCommand::Hover("Viet Nam".into())));
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(UiCommand::parse("year 1950"), Ok(UiCommand::Year(Year::FIRST)));
        assert_eq!(UiCommand::parse("year 2024"), Err(CommandError::InvalidYear("2024".into())));
        assert_eq!(UiCommand::parse("year soon"), Err(CommandError::InvalidYear("soon".into())));
    }

    #[test]
    fn test_named_enums() {
        assert_eq!(UiCommand::parse("view growth-drivers"), Ok(UiCommand::View(ViewMode::GrowthDrivers)));
        assert_eq!(UiCommand::parse("metric sex-ratio"), Ok(UiCommand::Metric(Metric::SexRatio)));
        assert_eq!(UiCommand::parse("play"), Ok(UiCommand::Play(ViewId::Globe)));
        assert_eq!(UiCommand::parse("reset animation"), Ok(UiCommand::Reset(ViewId::Animation)));
        assert!(matches!(UiCommand::parse("view atlas"), Err(CommandError::UnknownName(_))));
    }

    #[test]
    fn test_view_local_controls() {
        assert_eq!(
            UiCommand::parse("axes medianAge birthRate"),
            Ok(UiCommand::Axes(SeriesKey::MedianAge, SeriesKey::BirthRate))
        );
        assert_eq!(
            UiCommand::parse("compare add South Korea"),
            Ok(UiCommand::CompareAdd("South Korea".into()))
        );
        assert_eq!(UiCommand::parse("gap timeseries"), Ok(UiCommand::GapMode(GapMode::TimeSeries)));
        assert_eq!(UiCommand::parse("log on"), Ok(UiCommand::LogScale(true)));
    }

    #[test]
    fn test_errors() {
        assert_eq!(UiCommand::parse("   "), Err(CommandError::Empty));
        assert_eq!(UiCommand::parse("fly"), Err(CommandError::Unknown("fly".into())));
        assert!(matches!(UiCommand::parse("select USA"), Err(CommandError::MissingArgument { .. })));
        assert_eq!(UiCommand::parse("speed fast"), Err(CommandError::InvalidNumber("fast".into())));
    }

    #[test]
    fn test_apply_routes_through_dashboard() {
        use crate::config::DashboardConfig;
        use crate::core::{DatasetFile, Datasets};

        let mut data = Datasets::default();
        data.insert(
            DatasetFile::GeoJson,
            r#"{"features": [
                {"id": "FRA", "properties": {"name": "France"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,45],[5,45],[5,50],[0,50],[0,45]]]}}
            ]}"#,
        )
        .unwrap();
        let mut dash = Dashboard::start(DashboardConfig::default(), data).unwrap();

        for line in ["click France", "year 1990", "view radar", "quit"] {
            dash.apply(UiCommand::parse(line).unwrap(), 0.0).unwrap();
        }
        assert_eq!(dash.state().selected_country(), Some("France"));
        assert_eq!(dash.state().current_year(), Year::new(1990).unwrap());
        assert_eq!(dash.state().current_mode, ViewMode::Radar);
        assert!(dash.status_line().starts_with("view=radar year=1990"));
    }
}
