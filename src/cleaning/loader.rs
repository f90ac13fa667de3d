//! Loading the ratings file into a [`RecordSet`].

use crate::error::{CleanError, CleanResult};
use crate::models::{Cell, RecordSet};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Normalize raw header names.
///
/// Embedded line breaks become spaces, a non-breaking space in the first
/// header becomes a space, and then every space is removed:
/// `"Broad Bean\nOrigin"` becomes `"BroadBeanOrigin"`.
pub fn normalize_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let mut name = header.as_ref().replace("\r\n", " ").replace(['\n', '\r'], " ");
            if i == 0 {
                name = name.replace('\u{a0}', " ");
            }
            name.replace(' ', "")
        })
        .collect()
}

/// Read every row of a delimited file.
pub fn load_record_set(path: &Path) -> CleanResult<RecordSet> {
    let file = File::open(path).map_err(|source| CleanError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let set = read_record_set(file)?;
    debug!(
        "Loaded {} rows x {} columns from {}",
        set.len(),
        set.columns.len(),
        path.display()
    );
    Ok(set)
}

/// Read delimited records from any reader. Cells are kept as raw text.
pub fn read_record_set<R: Read>(source: R) -> CleanResult<RecordSet> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::None)
        .flexible(true) // short rows are padded below
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let raw_headers: Vec<&str> = headers.iter().collect();
    let columns = normalize_headers(&raw_headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Vec<Cell> = (0..columns.len())
            .map(|idx| Cell::Text(record.get(idx).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }

    Ok(RecordSet::new(columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = include_str!("../../fixtures/flavors_of_cacao_sample.csv");

    #[test]
    fn test_normalize_headers() {
        let raw = [
            "Company\u{a0}\n(Maker-if known)",
            "Specific Bean Origin\nor Bar Name",
            "REF",
            "Cocoa\nPercent",
            "Broad Bean\nOrigin",
        ];
        assert_eq!(
            normalize_headers(&raw),
            vec![
                "Company(Maker-ifknown)",
                "SpecificBeanOriginorBarName",
                "REF",
                "CocoaPercent",
                "BroadBeanOrigin",
            ]
        );
    }

    #[test]
    fn test_nbsp_only_replaced_in_first_header() {
        let raw = ["A\u{a0}B", "C\u{a0}D"];
        assert_eq!(normalize_headers(&raw), vec!["AB", "C\u{a0}D"]);
    }

    #[test]
    fn test_read_sample() {
        let set = read_record_set(SAMPLE.as_bytes()).unwrap();
        assert_eq!(set.len(), 12);
        assert_eq!(
            set.columns,
            vec![
                "Company(Maker-ifknown)",
                "SpecificBeanOriginorBarName",
                "REF",
                "ReviewDate",
                "CocoaPercent",
                "CompanyLocation",
                "Rating",
                "BeanType",
                "BroadBeanOrigin",
            ]
        );
        let origins: Vec<_> = set.column("BroadBeanOrigin").unwrap().collect();
        assert_eq!(origins[4], &Cell::from("Ghana, Venezuela"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let set = read_record_set("a,b,c\n1,2\n".as_bytes()).unwrap();
        assert_eq!(set.rows[0], vec![Cell::from("1"), Cell::from("2"), Cell::from("")]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let set = load_record_set(file.path()).unwrap();
        assert_eq!(set.len(), 12);
        assert!(set.has_column("Rating"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_record_set(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, CleanError::Io { .. }));
    }
}
