//! The cleaning pipeline.
//!
//! Turns the raw ratings table into a small, complete record set: rows are
//! filtered by rating, projected to the requested columns, corrected,
//! canonicalized, converted, and finally every incomplete row is dropped.
//! The raw set is only borrowed, so one load can feed any number of passes.

pub mod country;
pub mod loader;
pub mod rules;

pub use country::{CountryResolver, StaticCountryTable};
pub use loader::{load_record_set, read_record_set};

use crate::error::{CleanError, CleanResult};
use crate::models::{Cell, RecordSet};
use tracing::debug;

pub const RATING: &str = "Rating";
pub const COMPANY_LOCATION: &str = "CompanyLocation";
pub const BROAD_BEAN_ORIGIN: &str = "BroadBeanOrigin";
pub const COCOA_PERCENT: &str = "CocoaPercent";

/// Which columns and rows a cleaning pass keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOptions {
    /// Columns to retain, in output order.
    pub keep_columns: Vec<String>,
    /// Rows rated below this are dropped.
    pub rating_threshold: f64,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            keep_columns: vec![COMPANY_LOCATION.to_string(), RATING.to_string()],
            rating_threshold: 4.0,
        }
    }
}

impl CleanOptions {
    pub fn new(keep_columns: &[&str], rating_threshold: f64) -> Self {
        Self {
            keep_columns: keep_columns.iter().map(|c| c.to_string()).collect(),
            rating_threshold,
        }
    }
}

/// Run every cleaning step over a loaded record set.
///
/// Fails if `Rating` or a requested column is absent, if a rating is not a
/// number, or if a cocoa percentage is malformed. Unresolvable countries
/// are not errors; their rows are dropped.
pub fn clean(
    raw: &RecordSet,
    options: &CleanOptions,
    resolver: &dyn CountryResolver,
) -> CleanResult<RecordSet> {
    let rated = filter_by_rating(raw, options.rating_threshold)?;
    debug!(
        "{} of {} rows rated >= {}",
        rated.len(),
        raw.len(),
        options.rating_threshold
    );

    let mut set = project(&rated, &options.keep_columns)?;

    for row in &mut set.rows {
        for cell in row.iter_mut() {
            *cell = rules::correct(std::mem::replace(cell, Cell::Missing));
        }
    }

    if set.has_column(BROAD_BEAN_ORIGIN) {
        canonicalize_column(&mut set, BROAD_BEAN_ORIGIN, resolver, true);
    }
    if set.has_column(COMPANY_LOCATION) {
        canonicalize_column(&mut set, COMPANY_LOCATION, resolver, false);
    }
    if set.has_column(COCOA_PERCENT) {
        convert_percent(&mut set, COCOA_PERCENT)?;
    }

    for row in &mut set.rows {
        for cell in row.iter_mut() {
            *cell = rules::mark_missing(std::mem::replace(cell, Cell::Missing));
        }
    }

    let before = set.len();
    set.rows.retain(|row| !row.iter().any(Cell::is_missing));
    debug_assert!(!set.has_missing());
    debug!(
        "Dropped {} incomplete rows, {} remain ({})",
        before - set.len(),
        set.len(),
        options.keep_columns.join(", ")
    );

    Ok(set)
}

fn require_column(set: &RecordSet, name: &str) -> CleanResult<usize> {
    set.column_index(name).ok_or_else(|| CleanError::MissingColumn {
        column: name.to_string(),
        available: set.columns.clone(),
    })
}

/// Keep rows whose rating is at least `threshold`.
///
/// Ratings are parsed into numbers on the way. Blank ratings never pass.
pub fn filter_by_rating(raw: &RecordSet, threshold: f64) -> CleanResult<RecordSet> {
    let idx = require_column(raw, RATING)?;
    let mut rows = Vec::new();

    for (i, row) in raw.rows.iter().enumerate() {
        let rating = match &row[idx] {
            Cell::Number(n) => Some(*n),
            Cell::Missing => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.trim().parse::<f64>().map_err(|_| {
                CleanError::InvalidRating {
                    row: i + 1,
                    value: s.clone(),
                }
            })?),
        };

        if let Some(rating) = rating.filter(|r| *r >= threshold) {
            let mut kept = row.clone();
            kept[idx] = Cell::Number(rating);
            rows.push(kept);
        }
    }

    Ok(RecordSet::new(raw.columns.clone(), rows))
}

/// Narrow a record set to exactly `columns`, in that order.
pub fn project(set: &RecordSet, columns: &[String]) -> CleanResult<RecordSet> {
    let indices = columns
        .iter()
        .map(|name| require_column(set, name))
        .collect::<CleanResult<Vec<_>>>()?;

    let rows = set
        .rows
        .iter()
        .map(|row| indices.iter().map(|&idx| row[idx].clone()).collect())
        .collect();

    Ok(RecordSet::new(columns.to_vec(), rows))
}

/// Replace a column's text values with canonical country names.
///
/// Unresolved values become missing. With `strip_artifacts`, list
/// punctuation left by resolvers that render several names as a list
/// (`['Ghana', 'Peru']`) is removed.
fn canonicalize_column(
    set: &mut RecordSet,
    column: &str,
    resolver: &dyn CountryResolver,
    strip_artifacts: bool,
) {
    let Some(idx) = set.column_index(column) else {
        return;
    };

    let positions: Vec<usize> = set
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matches!(row[idx], Cell::Text(_)))
        .map(|(i, _)| i)
        .collect();
    let names: Vec<String> = positions
        .iter()
        .filter_map(|&i| set.rows[i][idx].as_text().map(str::to_string))
        .collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();

    let resolved = resolver.canonicalize(&refs);
    let mut unresolved = 0;

    for (n, &row) in positions.iter().enumerate() {
        set.rows[row][idx] = match resolved.get(n).cloned().flatten() {
            Some(name) if strip_artifacts => Cell::Text(strip_list_artifacts(&name)),
            Some(name) => Cell::Text(name),
            None => {
                unresolved += 1;
                Cell::Missing
            }
        };
    }

    debug!("{}: {} of {} names unresolved", column, unresolved, positions.len());
}

/// Remove list brackets and the quotes around each name.
///
/// Quotes inside a name (`Cote d'Ivoire`) are kept.
pub fn strip_list_artifacts(value: &str) -> String {
    let inner = value.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(|token| token.trim().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert `"70%"` cells to the fraction `0.7`.
///
/// Blank cells are left for the missing-value pass.
fn convert_percent(set: &mut RecordSet, column: &str) -> CleanResult<()> {
    let idx = require_column(set, column)?;

    for (i, row) in set.rows.iter_mut().enumerate() {
        let Cell::Text(ref raw) = row[idx] else {
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }

        let fraction = parse_percent(raw).ok_or_else(|| CleanError::InvalidPercent {
            row: i + 1,
            value: raw.clone(),
        })?;
        row[idx] = Cell::Number(fraction);
    }

    Ok(())
}

/// Parse `"NN%"` or `"NN.N%"` into a fraction within `[0, 1]`.
pub fn parse_percent(raw: &str) -> Option<f64> {
    let number = raw.trim().strip_suffix('%')?;
    let value = number.trim().parse::<f64>().ok()? / 100.0;
    (0.0..=1.0).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../fixtures/flavors_of_cacao_sample.csv");

    fn sample() -> RecordSet {
        read_record_set(SAMPLE.as_bytes()).unwrap()
    }

    fn raw_set(columns: &[&str], rows: &[&[&str]]) -> RecordSet {
        RecordSet::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|v| Cell::from(*v)).collect())
                .collect(),
        )
    }

    fn texts<'a>(set: &'a RecordSet, column: &str) -> Vec<&'a str> {
        set.column(column).unwrap().filter_map(Cell::as_text).collect()
    }

    #[test]
    fn test_default_options() {
        let options = CleanOptions::default();
        assert_eq!(options.keep_columns, vec!["CompanyLocation", "Rating"]);
        assert_eq!(options.rating_threshold, 4.0);
    }

    #[test]
    fn test_scotland_scenario() {
        let raw = raw_set(
            &["CompanyLocation", "Rating", "BroadBeanOrigin", "CocoaPercent"],
            &[&["Scotland", "4.5", "Venez,Trinidad", "70%"]],
        );
        let options = CleanOptions::new(
            &["CompanyLocation", "Rating", "BroadBeanOrigin", "CocoaPercent"],
            4.0,
        );

        let set = clean(&raw, &options, &StaticCountryTable::new()).unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.rows[0][0], Cell::from("United Kingdom"));
        assert_eq!(set.rows[0][1], Cell::Number(4.5));
        assert_eq!(set.rows[0][2], Cell::from("Venezuela, Trinidad and Tobago"));
        let cocoa = set.rows[0][3].as_number().unwrap();
        assert!((cocoa - 0.70).abs() < 1e-12);
    }

    #[test]
    fn test_ven_prefix_keeps_co_origins() {
        let raw = raw_set(
            &["BroadBeanOrigin", "Rating"],
            &[&["Ven, Trinidad, Ecuador", "4.0"], &["Ven,Ecuador", "4.0"]],
        );
        let set = clean(
            &raw,
            &CleanOptions::new(&["BroadBeanOrigin"], 4.0),
            &StaticCountryTable::new(),
        )
        .unwrap();

        assert_eq!(
            texts(&set, "BroadBeanOrigin"),
            vec!["Venezuela, Trinidad and Tobago, Ecuador", "Venezuela, Ecuador"]
        );
    }

    #[test]
    fn test_threshold_filters_rows() {
        let raw = raw_set(
            &["CompanyLocation", "Rating"],
            &[&["France", "3.0"], &["Canada", "4.0"], &["Italy", "3.99"]],
        );
        let resolver = StaticCountryTable::new();

        let top = clean(&raw, &CleanOptions::new(&["CompanyLocation"], 4.0), &resolver).unwrap();
        assert_eq!(texts(&top, "CompanyLocation"), vec!["Canada"]);

        let all = clean(&raw, &CleanOptions::new(&["CompanyLocation"], 1.0), &resolver).unwrap();
        assert_eq!(texts(&all, "CompanyLocation"), vec!["France", "Canada", "Italy"]);
    }

    #[test]
    fn test_not_found_location_is_dropped() {
        let raw = raw_set(
            &["CompanyLocation", "Rating"],
            &[&["not found", "4.5"], &["France", "4.5"]],
        );
        let set = clean(&raw, &CleanOptions::default(), &StaticCountryTable::new()).unwrap();
        assert_eq!(texts(&set, "CompanyLocation"), vec!["France"]);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let raw = raw_set(&["CompanyLocation", "Rating"], &[&["France", "4.5"]]);
        let err = clean(
            &raw,
            &CleanOptions::new(&["CocoaPercent"], 4.0),
            &StaticCountryTable::new(),
        )
        .unwrap_err();

        match err {
            CleanError::MissingColumn { column, available } => {
                assert_eq!(column, "CocoaPercent");
                assert_eq!(available, vec!["CompanyLocation", "Rating"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_rating_column_is_fatal() {
        let raw = raw_set(&["CompanyLocation"], &[&["France"]]);
        let err = clean(
            &raw,
            &CleanOptions::new(&["CompanyLocation"], 4.0),
            &StaticCountryTable::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CleanError::MissingColumn { ref column, .. } if column == "Rating"));
    }

    #[test]
    fn test_invalid_rating_is_fatal() {
        let raw = raw_set(&["CompanyLocation", "Rating"], &[&["France", "great"]]);
        let err = clean(&raw, &CleanOptions::default(), &StaticCountryTable::new()).unwrap_err();
        assert!(matches!(err, CleanError::InvalidRating { row: 1, .. }));
    }

    #[test]
    fn test_blank_rating_never_passes() {
        let raw = raw_set(&["CompanyLocation", "Rating"], &[&["France", ""]]);
        let set = clean(
            &raw,
            &CleanOptions::new(&["CompanyLocation"], 0.0),
            &StaticCountryTable::new(),
        )
        .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_malformed_percent_is_fatal() {
        let raw = raw_set(&["CocoaPercent", "Rating"], &[&["70%", "3"], &["seventy", "3"]]);
        let err = clean(
            &raw,
            &CleanOptions::new(&["CocoaPercent", "Rating"], 1.0),
            &StaticCountryTable::new(),
        )
        .unwrap_err();
        assert!(matches!(err, CleanError::InvalidPercent { row: 2, .. }));
    }

    #[test]
    fn test_parse_percent() {
        assert_eq!(parse_percent("70%"), Some(0.7));
        assert_eq!(parse_percent("100%"), Some(1.0));
        assert_eq!(parse_percent(" 0% "), Some(0.0));
        assert!((parse_percent("72.5%").unwrap() - 0.725).abs() < 1e-12);
        assert_eq!(parse_percent("70"), None);
        assert_eq!(parse_percent("abc%"), None);
        assert_eq!(parse_percent("150%"), None);
    }

    #[test]
    fn test_strip_list_artifacts() {
        assert_eq!(strip_list_artifacts("['Ghana', 'Peru']"), "Ghana, Peru");
        assert_eq!(strip_list_artifacts("Ghana, Peru"), "Ghana, Peru");
        assert_eq!(strip_list_artifacts("Cote d'Ivoire"), "Cote d'Ivoire");
    }

    #[test]
    fn test_projection_keeps_requested_order() {
        let raw = raw_set(&["A", "Rating", "B"], &[&["a", "5", "b"]]);
        let rated = filter_by_rating(&raw, 1.0).unwrap();
        let set = project(&rated, &["B".to_string(), "Rating".to_string()]).unwrap();
        assert_eq!(set.columns, vec!["B", "Rating"]);
        assert_eq!(set.rows[0], vec![Cell::from("b"), Cell::Number(5.0)]);
    }

    #[test]
    fn test_cleaned_sample_has_no_missing() {
        let raw = sample();
        let resolver = StaticCountryTable::new();
        let selections: [(&[&str], f64); 4] = [
            (&["CompanyLocation"], 4.0),
            (&["BroadBeanOrigin"], 4.0),
            (&["CocoaPercent", "Rating"], 1.0),
            (&["CompanyLocation", "BroadBeanOrigin", "CocoaPercent", "Rating"], 1.0),
        ];

        for (columns, threshold) in selections {
            let set = clean(&raw, &CleanOptions::new(columns, threshold), &resolver).unwrap();
            assert!(!set.has_missing(), "missing values left for {:?}", columns);
            assert_eq!(set.columns, columns);
        }
    }

    #[test]
    fn test_sample_ratings_respect_threshold() {
        let raw = sample();
        let resolver = StaticCountryTable::new();

        for threshold in [1.0, 3.5, 4.0, 4.5] {
            let set = clean(&raw, &CleanOptions::new(&["Rating"], threshold), &resolver).unwrap();
            assert!(set
                .column("Rating")
                .unwrap()
                .all(|c| c.as_number().is_some_and(|r| r >= threshold)));
        }
    }

    #[test]
    fn test_sample_cocoa_in_unit_range() {
        let raw = sample();
        let set = clean(
            &raw,
            &CleanOptions::new(&["CocoaPercent", "Rating"], 1.0),
            &StaticCountryTable::new(),
        )
        .unwrap();

        assert_eq!(set.len(), 12);
        assert!(set
            .column("CocoaPercent")
            .unwrap()
            .all(|c| c.as_number().is_some_and(|p| (0.0..=1.0).contains(&p))));
    }

    #[test]
    fn test_corrections_apply_before_canonicalization() {
        let raw = sample();
        let set = clean(
            &raw,
            &CleanOptions::new(&["CompanyLocation"], 1.0),
            &StaticCountryTable::new(),
        )
        .unwrap();
        let locations = texts(&set, "CompanyLocation");

        assert!(locations.contains(&"Netherlands"));
        assert!(locations.contains(&"United Kingdom"));
        assert!(!locations.contains(&"Hawaii"));
        assert!(!locations.contains(&"not found"));
        assert_eq!(set.len(), 11);
    }

    #[test]
    fn test_clean_loaded_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let raw = load_record_set(file.path()).unwrap();
        let set = clean(
            &raw,
            &CleanOptions::new(&["BroadBeanOrigin"], 4.0),
            &StaticCountryTable::new(),
        )
        .unwrap();
        assert_eq!(set.len(), 8);
    }
}
