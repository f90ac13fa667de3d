//! Data models for the chocolate ratings dashboard.
//!
//! This module contains the in-memory record set produced by loading and
//! cleaning the ratings file, and the chart descriptions handed to the
//! rendering side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value in a record set.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Raw or corrected text.
    Text(String),
    /// A parsed numeric value (ratings, cocoa fractions).
    Number(f64),
    /// Missing-value marker; rows holding one are dropped.
    Missing,
}

impl Cell {
    /// Returns the text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Missing => write!(f, "NaN"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// An ordered table of rows sharing one header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    /// Column names, in source order.
    pub columns: Vec<String>,
    /// Rows; each row has exactly one cell per column.
    pub rows: Vec<Vec<Cell>>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over one column's cells, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// True if any cell in the set is the missing-value marker.
    pub fn has_missing(&self) -> bool {
        self.rows.iter().flatten().any(Cell::is_missing)
    }
}

/// Axis display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: String,
}

impl Axis {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

/// Chart title and axis labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

/// How scatter points are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatterMode {
    /// Unconnected points.
    Markers,
}

/// One plot series, tagged with its plot type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    /// Category labels with their counts.
    Bar { x: Vec<String>, y: Vec<usize> },
    /// Paired numeric points.
    Scatter {
        x: Vec<f64>,
        y: Vec<f64>,
        mode: ScatterMode,
    },
}

impl Trace {
    /// Number of points in the series.
    pub fn len(&self) -> usize {
        match self {
            Trace::Bar { x, .. } => x.len(),
            Trace::Scatter { x, .. } => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete chart description: series plus layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// True when no series carries any point.
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(Trace::is_empty)
    }
}

/// Metadata about a dashboard run.
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    /// Path of the ratings file that was read.
    pub data_path: String,
    /// Date and time the figures were built.
    pub generated_at: DateTime<Utc>,
    /// Rows read from the source before cleaning.
    pub rows_loaded: usize,
    /// Rating cutoff for the two bar charts.
    pub top_rated_threshold: f64,
    /// Rating cutoff for the scatter chart.
    pub scatter_threshold: f64,
    /// Wall time of load and aggregation in seconds.
    pub duration_seconds: f64,
}

/// The figures of one run together with their metadata.
#[derive(Debug, Clone)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub figures: Vec<Figure>,
}
