use std::io::{Cursor, Read as _};
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets};
use worldex_core::{Cell, WorldexError};

/// Run blocking decode work off the async runtime.
///
/// # Errors
/// Propagates `f`'s error; a panicked task becomes `Other`.
pub(crate) async fn off_thread<T, F>(source: &str, f: F) -> Result<T, WorldexError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, WorldexError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WorldexError::Other(format!("{source}: decode task failed: {e}")))?
}

/// A decoded worksheet: its name and rows.
pub type Sheet = (String, Vec<Vec<Cell>>);

fn cell_from(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::from(*i),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

fn range_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    range.rows().map(|r| r.iter().map(cell_from).collect()).collect()
}

fn read_sheets<RS>(source: &str, mut wb: Sheets<RS>) -> Result<Vec<Sheet>, WorldexError>
where
    RS: std::io::Read + std::io::Seek,
{
    let names: Vec<String> = wb.sheet_names().clone();
    if names.is_empty() {
        return Err(WorldexError::decode(source, "workbook contains no sheets"));
    }
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let range = wb
            .worksheet_range(&name)
            .map_err(|e| WorldexError::decode(source, format!("sheet '{name}': {e}")))?;
        out.push((name, range_rows(&range)));
    }
    Ok(out)
}

/// Decode every sheet of an in-memory workbook (xlsx, xls, xlsb, or ods).
///
/// # Errors
/// Returns `Decode` if the bytes are not a readable workbook.
pub fn workbook_from_bytes(source: &str, bytes: Vec<u8>) -> Result<Vec<Sheet>, WorldexError> {
    let wb = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| WorldexError::decode(source, format!("workbook: {e}")))?;
    read_sheets(source, wb)
}

/// Decode every sheet of a workbook on disk.
///
/// # Errors
/// Returns `Decode` if the file cannot be opened as a workbook.
pub fn workbook_from_path(source: &str, path: &Path) -> Result<Vec<Sheet>, WorldexError> {
    let wb = calamine::open_workbook_auto(path)
        .map_err(|e| WorldexError::decode(source, format!("{}: {e}", path.display())))?;
    read_sheets(source, wb)
}

/// Index of the first sheet whose name contains any of `hints` (case-insensitive).
#[must_use]
pub fn pick_sheet(sheets: &[Sheet], hints: &[&str]) -> Option<usize> {
    sheets.iter().position(|(name, _)| {
        let lower = name.to_lowercase();
        hints.iter().any(|h| lower.contains(&h.to_lowercase()))
    })
}

/// Parse CSV bytes into rows of text cells. Invalid UTF-8 is replaced, not rejected, and
/// ragged rows are kept.
///
/// # Errors
/// Returns `Decode` on malformed CSV framing.
pub fn csv_rows(source: &str, bytes: &[u8]) -> Result<Vec<Vec<Cell>>, WorldexError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for rec in rdr.byte_records() {
        let rec = rec.map_err(|e| WorldexError::decode(source, format!("csv: {e}")))?;
        rows.push(
            rec.iter()
                .map(|f| {
                    let s = String::from_utf8_lossy(f);
                    if s.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(s.into_owned())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

/// True if `bytes` start with the ZIP local-file magic.
#[must_use]
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(b"PK")
}

/// Read the first archive member whose name contains `needle` and ends in `.csv`
/// (both case-insensitive).
///
/// # Errors
/// Returns `Decode` if the archive is unreadable, and `SchemaNotFound` if no member matches.
pub fn zip_csv_member(source: &str, bytes: Vec<u8>, needle: &str) -> Result<Vec<u8>, WorldexError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| WorldexError::decode(source, format!("zip: {e}")))?;
    let needle = needle.to_uppercase();
    let name = archive
        .file_names()
        .find(|n| {
            let upper = n.to_uppercase();
            upper.contains(&needle) && upper.ends_with(".CSV")
        })
        .map(str::to_string)
        .ok_or_else(|| {
            WorldexError::schema_not_found(source, format!("{needle}*.csv in archive"))
        })?;
    let mut file = archive
        .by_name(&name)
        .map_err(|e| WorldexError::decode(source, format!("zip member {name}: {e}")))?;
    let mut out = Vec::new();
    file.read_to_end(&mut out)
        .map_err(|e| WorldexError::decode(source, format!("zip member {name}: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_strip_bom_and_keep_ragged_rows() {
        let rows = csv_rows("t", b"\xEF\xBB\xBFCode,Year,Value\nFRA,2020\nDEU,2021,3.5\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], Cell::from("Code"));
        assert_eq!(rows[1].len(), 2);
        assert_eq!(rows[2][2].text(), "3.5");
    }

    #[test]
    fn blank_csv_fields_become_empty_cells() {
        let rows = csv_rows("t", b"a, ,c\n").unwrap();
        assert_eq!(rows[0][1], Cell::Empty);
    }

    #[test]
    fn garbage_is_not_a_workbook() {
        let err = workbook_from_bytes("sipri", b"<html>moved</html>".to_vec()).unwrap_err();
        assert!(matches!(err, WorldexError::Decode { .. }));
    }

    #[test]
    fn zip_magic() {
        assert!(is_zip(b"PK\x03\x04rest"));
        assert!(!is_zip(b"<!DOCTYPE html>"));
    }

    #[test]
    fn pick_sheet_matches_case_insensitively() {
        let sheets: Vec<Sheet> = vec![
            ("Front page".into(), vec![]),
            ("Share of GDP".into(), vec![]),
        ];
        assert_eq!(pick_sheet(&sheets, &["share of gdp"]), Some(1));
        assert_eq!(pick_sheet(&sheets, &["per capita"]), None);
    }
}
