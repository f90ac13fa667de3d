//! Chart aggregation.
//!
//! This module builds the three dashboard figures from one loaded record
//! set. Each figure runs its own cleaning pass over the shared raw rows.

use crate::cleaning::{
    self, CleanOptions, CountryResolver, BROAD_BEAN_ORIGIN, COCOA_PERCENT, COMPANY_LOCATION,
    RATING,
};
use crate::error::CleanResult;
use crate::models::{Axis, Cell, Figure, Layout, RecordSet, ScatterMode, Trace};
use std::collections::HashMap;
use tracing::{debug, warn};

pub const COMPANY_LOCATION_TITLE: &str = "Company location for the best rated chocolates";
pub const BEAN_ORIGIN_TITLE: &str = "Bean origin for the best rated chocolates";
pub const COCOA_RATING_TITLE: &str = "Chocolate rating and cocoa percent";
const TOP_RATED_AXIS: &str = "Number of top-rated chocolates";

/// Rating cutoffs for the figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Cutoff for the two "best rated" bar charts.
    pub top_rated: f64,
    /// Cutoff for the cocoa/rating scatter.
    pub scatter: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            top_rated: 4.0,
            scatter: 1.0,
        }
    }
}

/// Count distinct values, most frequent first.
///
/// Ties keep the order in which values first appear.
pub fn value_counts<I, S>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for value in values {
        let value = value.as_ref();
        match index.get(value) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                index.insert(value.to_string(), counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    // sort_by_key is stable
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    counts
}

/// Split `"Ghana, Venezuela"`-style values into one token per origin.
pub fn split_origins<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .flat_map(|value| value.split(", "))
        .filter(|token| !token.is_empty())
        .collect()
}

fn text_column<'a>(set: &'a RecordSet, column: &str) -> Vec<&'a str> {
    set.column(column)
        .map(|cells| cells.filter_map(Cell::as_text).collect())
        .unwrap_or_default()
}

fn number_column(set: &RecordSet, column: &str) -> Vec<f64> {
    set.column(column)
        .map(|cells| cells.filter_map(Cell::as_number).collect())
        .unwrap_or_default()
}

fn bar_figure(counts: Vec<(String, usize)>, title: &str) -> Figure {
    let (x, y) = counts.into_iter().unzip();
    Figure {
        data: vec![Trace::Bar { x, y }],
        layout: Layout {
            title: title.to_string(),
            xaxis: None,
            yaxis: Some(Axis::titled(TOP_RATED_AXIS)),
        },
    }
}

fn warn_if_empty(figure: &Figure) {
    if figure.is_empty() {
        warn!("No rows left for '{}'; chart will be empty", figure.layout.title);
    }
}

/// Bar chart of company locations among top-rated bars.
pub fn company_location_figure(
    raw: &RecordSet,
    thresholds: &Thresholds,
    resolver: &dyn CountryResolver,
) -> CleanResult<Figure> {
    let options = CleanOptions::new(&[COMPANY_LOCATION], thresholds.top_rated);
    let set = cleaning::clean(raw, &options, resolver)?;

    let counts = value_counts(text_column(&set, COMPANY_LOCATION));
    debug!("{} distinct company locations", counts.len());

    let figure = bar_figure(counts, COMPANY_LOCATION_TITLE);
    warn_if_empty(&figure);
    Ok(figure)
}

/// Bar chart of bean origins among top-rated bars, one count per origin.
pub fn bean_origin_figure(
    raw: &RecordSet,
    thresholds: &Thresholds,
    resolver: &dyn CountryResolver,
) -> CleanResult<Figure> {
    let options = CleanOptions::new(&[BROAD_BEAN_ORIGIN], thresholds.top_rated);
    let set = cleaning::clean(raw, &options, resolver)?;

    let origins = split_origins(text_column(&set, BROAD_BEAN_ORIGIN));
    let counts = value_counts(origins);
    debug!("{} distinct bean origins", counts.len());

    let figure = bar_figure(counts, BEAN_ORIGIN_TITLE);
    warn_if_empty(&figure);
    Ok(figure)
}

/// Scatter of cocoa fraction against rating.
pub fn cocoa_rating_figure(
    raw: &RecordSet,
    thresholds: &Thresholds,
    resolver: &dyn CountryResolver,
) -> CleanResult<Figure> {
    let options = CleanOptions::new(&[COCOA_PERCENT, RATING], thresholds.scatter);
    let set = cleaning::clean(raw, &options, resolver)?;

    let figure = Figure {
        data: vec![Trace::Scatter {
            x: number_column(&set, COCOA_PERCENT),
            y: number_column(&set, RATING),
            mode: ScatterMode::Markers,
        }],
        layout: Layout {
            title: COCOA_RATING_TITLE.to_string(),
            xaxis: Some(Axis::titled("Cocoa percent %")),
            yaxis: Some(Axis::titled("Chocolate rating")),
        },
    };
    warn_if_empty(&figure);
    Ok(figure)
}

/// Build all three dashboard figures from one loaded record set.
pub fn return_figures(
    raw: &RecordSet,
    thresholds: &Thresholds,
    resolver: &dyn CountryResolver,
) -> CleanResult<Vec<Figure>> {
    Ok(vec![
        company_location_figure(raw, thresholds, resolver)?,
        bean_origin_figure(raw, thresholds, resolver)?,
        cocoa_rating_figure(raw, thresholds, resolver)?,
    ])
}

/// Range and mean of one scatter axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Summarize a series of values. `None` for an empty series.
pub fn axis_summary(values: &[f64]) -> Option<AxisSummary> {
    if values.is_empty() {
        return None;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    Some(AxisSummary { min, max, mean })
}
