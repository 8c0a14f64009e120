//! Startup dataset loading
//!
//! All thirteen files are requested concurrently and awaited together. The
//! load is all-or-nothing: any missing or malformed file fails the whole
//! startup with one error naming every failing file.

use futures_util::future::join_all;
use std::fmt;
use std::future::Future;
use tracing::{error, info};

use super::data::{DatasetFile, Datasets};

/// Where dataset text comes from (filesystem in the CLI, `fetch` in the browser).
pub trait DataSource {
    fn fetch(&self, file_name: &'static str) -> impl Future<Output = Result<String, String>>;
}

/// Why one file failed.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("could not read: {0}")]
    Fetch(String),
    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct FileFailure {
    pub file: &'static str,
    pub error: FileError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file, self.error)
    }
}

/// Aggregated startup failure.
#[derive(Debug, thiserror::Error)]
#[error("failed to load {count} dataset file(s): {list}", count = .failures.len(), list = join_failures(.failures))]
pub struct LoadError {
    pub failures: Vec<FileFailure>,
}

impl LoadError {
    pub fn files(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.failures.iter().map(|f| f.file)
    }
}

fn join_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fetch and parse every dataset file.
pub async fn load_all<S: DataSource>(source: &S) -> Result<Datasets, LoadError> {
    info!(files = DatasetFile::ALL.len(), "Loading datasets");

    let fetches = DatasetFile::ALL.iter().map(|&file| async move {
        (file, source.fetch(file.file_name()).await)
    });
    let results = join_all(fetches).await;

    let mut datasets = Datasets::default();
    let mut failures = Vec::new();
    for (file, result) in results {
        let outcome = match result {
            Ok(text) => datasets.insert(file, &text).map_err(FileError::from),
            Err(reason) => Err(FileError::Fetch(reason)),
        };
        if let Err(error) = outcome {
            error!(file = file.file_name(), error = %error, "Dataset failed");
            failures.push(FileFailure {
                file: file.file_name(),
                error,
            });
        }
    }

    if !failures.is_empty() {
        return Err(LoadError { failures });
    }

    let summary = datasets.summary();
    info!(
        years = summary.globe_years,
        countries = summary.detail_countries,
        regions = summary.regions,
        features = summary.geo_features,
        "Datasets loaded"
    );
    Ok(datasets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory source; files not listed are reported missing.
    struct MemorySource(HashMap<&'static str, String>);

    impl MemorySource {
        fn complete() -> Self {
            let mut files = HashMap::new();
            for file in DatasetFile::ALL {
                let body = match file {
                    DatasetFile::Globe
                    | DatasetFile::CountryDetail
                    | DatasetFile::CountryTimeSeries
                    | DatasetFile::GeoJson
                    | DatasetFile::Radar
                    | DatasetFile::GenderGap => "{}",
                    _ => "[]",
                };
                files.insert(file.file_name(), body.to_string());
            }
            Self(files)
        }
    }

    impl DataSource for MemorySource {
        async fn fetch(&self, file_name: &'static str) -> Result<String, String> {
            self.0
                .get(file_name)
                .cloned()
                .ok_or_else(|| "not found".to_string())
        }
    }

    #[tokio::test]
    async fn test_complete_bundle_loads() {
        let source = MemorySource::complete();
        let data = load_all(&source).await.unwrap();
        assert_eq!(data.summary(), Default::default());
    }

    #[tokio::test]
    async fn test_every_failure_is_reported() {
        let mut source = MemorySource::complete();
        source.0.remove("ridgeline_data.json");
        source.0.insert("radar_chart_data.json", "{not json".to_string());

        let err = load_all(&source).await.unwrap_err();
        let mut files: Vec<_> = err.files().collect();
        files.sort_unstable();
        assert_eq!(files, vec!["radar_chart_data.json", "ridgeline_data.json"]);

        let message = err.to_string();
        assert!(message.starts_with("failed to load 2 dataset file(s)"));
        assert!(message.contains("ridgeline_data.json (could not read: not found)"));
        assert!(message.contains("radar_chart_data.json (malformed JSON"));
    }
}
