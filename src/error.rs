//! Error types for the cleaning pipeline.

use thiserror::Error;

/// Failures that abort a cleaning pass.
///
/// Unresolvable country names are not errors: those rows are dropped.
#[derive(Debug, Error)]
pub enum CleanError {
    /// A column was requested that does not exist after header normalization.
    #[error("column '{column}' not found (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A `Rating` cell could not be read as a number.
    #[error("invalid rating '{value}' in row {row}")]
    InvalidRating { row: usize, value: String },

    /// A `CocoaPercent` cell is not of the form `NN%` or is out of range.
    #[error("invalid cocoa percent '{value}' in row {row}")]
    InvalidPercent { row: usize, value: String },

    /// The source could not be parsed as delimited records.
    #[error("failed to read records: {0}")]
    Csv(#[from] csv::Error),

    /// The source file could not be opened.
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type CleanResult<T> = std::result::Result<T, CleanError>;
