//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Highest score on the chocolate rating scale.
pub const MAX_RATING: f64 = 5.0;

/// CacaoDash - chocolate ratings dashboard builder
///
/// Cleans the Flavors of Cacao ratings file and writes the three dashboard
/// charts (company location, bean origin, cocoa vs rating) as JSON figures
/// or as a Markdown summary.
///
/// Examples:
///   cacaodash
///   cacaodash --data ./flavors_of_cacao.csv --output figures.json
///   cacaodash --format markdown --top-threshold 3.75
///   cacaodash --list-columns
///   cacaodash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path of the ratings file
    ///
    /// Defaults to data/flavors_of_cacao.csv or the config file setting.
    #[arg(short, long, value_name = "FILE", env = "CACAODASH_DATA")]
    pub data: Option<PathBuf>,

    /// Output file path (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .cacaodash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum rating for the location and origin charts (default 4.0)
    #[arg(long, value_name = "RATING")]
    pub top_threshold: Option<f64>,

    /// Minimum rating for the cocoa/rating scatter (default 1.0)
    #[arg(long, value_name = "RATING")]
    pub scatter_threshold: Option<f64>,

    /// Maximum categories per bar chart in Markdown output
    #[arg(long, value_name = "COUNT")]
    pub max_rows: Option<usize>,

    /// Write JSON on a single line
    #[arg(long)]
    pub compact: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the normalized column names of the data file and exit
    #[arg(long)]
    pub list_columns: bool,

    /// Generate a default .cacaodash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plotly-style JSON figure list (default)
    #[default]
    Json,
    /// Markdown summary
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        for (flag, value) in [
            ("--top-threshold", self.top_threshold),
            ("--scatter-threshold", self.scatter_threshold),
        ] {
            if let Some(threshold) = value {
                if !(0.0..=MAX_RATING).contains(&threshold) {
                    return Err(format!(
                        "{} must be between 0.0 and {:.1}",
                        flag, MAX_RATING
                    ));
                }
            }
        }

        if self.max_rows == Some(0) {
            return Err("Max rows must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn make_args() -> Args {
        Args {
            data: None,
            output: None,
            format: OutputFormat::Json,
            config: None,
            top_threshold: None,
            scatter_threshold: None,
            max_rows: None,
            compact: false,
            verbose: false,
            quiet: false,
            list_columns: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["cacaodash"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.top_threshold.is_none());
        assert!(!args.compact);
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "cacaodash",
            "--data",
            "ratings.csv",
            "--format",
            "markdown",
            "--top-threshold",
            "3.5",
        ])
        .unwrap();
        assert_eq!(args.data, Some(PathBuf::from("ratings.csv")));
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.top_threshold, Some(3.5));
    }

    #[test]
    fn test_validation_threshold_range() {
        let mut args = make_args();
        assert!(args.validate().is_ok());

        args.top_threshold = Some(5.5);
        assert!(args.validate().is_err());

        args.top_threshold = Some(4.0);
        args.scatter_threshold = Some(-1.0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_config() {
        let mut args = make_args();
        args.config = Some(PathBuf::from("no/such/config.toml"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
