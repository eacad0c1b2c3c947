use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::analysis::chart::DEFAULT_BIN_COUNT;

/// Optional settings file read from the working directory.
pub const CONFIG_FILE: &str = "dashboard.json";

/// Startup settings. Every field has a default, so the file may set any subset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub page_title: String,
    /// Dataset opened at startup.
    pub dataset_path: Option<PathBuf>,
    pub histogram_bins: usize,
    /// Rows shown in the dataset overview.
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_title: "Data Visualization Dashboard".to_string(),
            dataset_path: None,
            histogram_bins: DEFAULT_BIN_COUNT,
            preview_rows: 5,
        }
    }
}

impl DashboardConfig {
    /// Read `dashboard.json` if present, then let the first command-line
    /// argument override the dataset path.
    pub fn load(args: impl IntoIterator<Item = String>) -> Self {
        let mut config = match Self::from_file(Path::new(CONFIG_FILE)) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("ignoring {CONFIG_FILE}: {e:#}");
                Self::default()
            }
        };
        if let Some(path) = args.into_iter().nth(1) {
            config.dataset_path = Some(PathBuf::from(path));
        }
        if config.histogram_bins == 0 {
            log::warn!("histogram_bins must be positive, using {DEFAULT_BIN_COUNT}");
            config.histogram_bins = DEFAULT_BIN_COUNT;
        }
        config
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).map(Some)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing dashboard config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{ "dataset_path": "StressLevelDataset.csv" }"#).unwrap();
        assert_eq!(config.dataset_path, Some(PathBuf::from("StressLevelDataset.csv")));
        assert_eq!(config.histogram_bins, 30);
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.page_title, "Data Visualization Dashboard");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(DashboardConfig::from_json("{ histogram_bins: }").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = Path::new("definitely/not/here/dashboard.json");
        assert_eq!(DashboardConfig::from_file(path).unwrap(), None);
    }

    #[test]
    fn first_argument_overrides_dataset_path() {
        let args = vec!["rusty-dashboard".to_string(), "data/other.csv".to_string()];
        let config = DashboardConfig::load(args);
        assert_eq!(config.dataset_path, Some(PathBuf::from("data/other.csv")));
    }
}
