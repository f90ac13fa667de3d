//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.cacaodash.toml` files.

use crate::analysis::Thresholds;
use crate::cli::MAX_RATING;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = ".cacaodash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Rating cutoffs.
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Country name resolution.
    #[serde(default)]
    pub countries: CountryConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the ratings file.
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Output file; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            output: None,
        }
    }
}

pub fn default_data_path() -> String {
    "data/flavors_of_cacao.csv".to_string()
}

/// Rating cutoffs for the charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Cutoff for the location and origin bar charts.
    #[serde(default = "default_top_rated")]
    pub top_rated: f64,

    /// Cutoff for the cocoa/rating scatter.
    #[serde(default = "default_scatter")]
    pub scatter: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            top_rated: default_top_rated(),
            scatter: default_scatter(),
        }
    }
}

fn default_top_rated() -> f64 {
    4.0
}

fn default_scatter() -> f64 {
    1.0
}

impl From<&ThresholdConfig> for Thresholds {
    fn from(config: &ThresholdConfig) -> Self {
        Self {
            top_rated: config.top_rated,
            scatter: config.scatter,
        }
    }
}

/// Extra country spellings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountryConfig {
    /// Case-insensitive regex -> canonical short name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Pretty-print JSON output.
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Maximum categories listed per bar chart in Markdown.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            max_rows: default_max_rows(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_rows() -> usize {
    15
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line (or through their
    /// environment variables) override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.general.data_path = data.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        if let Some(top_rated) = args.top_threshold {
            self.thresholds.top_rated = top_rated;
        }
        if let Some(scatter) = args.scatter_threshold {
            self.thresholds.scatter = scatter;
        }

        if args.compact {
            self.report.pretty = false;
        }
        if let Some(max_rows) = args.max_rows {
            self.report.max_rows = max_rows;
        }
    }

    /// Check values that may have come from the config file.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("thresholds.top_rated", self.thresholds.top_rated),
            ("thresholds.scatter", self.thresholds.scatter),
        ] {
            if !(0.0..=MAX_RATING).contains(&value) {
                bail!("{} must be between 0.0 and {:.1}, got {}", key, MAX_RATING, value);
            }
        }

        if self.report.max_rows == 0 {
            bail!("report.max_rows must be at least 1");
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
