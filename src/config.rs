//! Dashboard configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var naming an optional JSON config file.
pub const CONFIG_ENV: &str = "DEMOGRAPHICS_CONFIG";
/// Env var overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "DEMOGRAPHICS_DATA_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory (CLI) or URL prefix (browser) holding the dataset files.
    pub data_dir: String,

    /// Globe year playback interval.
    pub globe_interval_ms: u64,

    /// Initial bubble animation interval; changed by the speed buttons.
    pub animation_interval_ms: u64,

    pub growth_interval_ms: u64,

    /// Globe auto-rotation frame interval.
    pub rotation_interval_ms: u64,

    /// Most countries the comparison view plots at once.
    pub comparison_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            globe_interval_ms: 500,
            animation_interval_ms: 1000,
            growth_interval_ms: 1000,
            rotation_interval_ms: 16,
            comparison_limit: 10,
        }
    }
}

impl DashboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, dir: impl Into<String>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// File named by `DEMOGRAPHICS_CONFIG` if set, then the data dir override.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        Ok(match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => config.with_data_dir(dir),
            _ => config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.globe_interval_ms, 500);
        assert_eq!(config.comparison_limit, 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"data_dir": "/srv/un-wpp", "animation_interval_ms": 250}"#).unwrap();
        assert_eq!(config.data_dir, "/srv/un-wpp");
        assert_eq!(config.animation_interval_ms, 250);
        assert_eq!(config.growth_interval_ms, 1000);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = DashboardConfig::from_file(Path::new("/nonexistent/demographics.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/demographics.json"));
    }
}
