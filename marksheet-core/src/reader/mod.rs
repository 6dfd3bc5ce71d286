//! Workbook decoding using calamine

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Sheets, open_workbook_auto_from_rs};
use std::io::Cursor;
use std::path::Path;

pub mod workbook;

pub use workbook::{Cell, CellValue, Extent, Sheet, Workbook};

/// Extensions the decoder accepts
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Check whether a path looks like a spreadsheet the decoder can open
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Read a workbook from a file path
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    read_workbook_bytes(bytes)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))
}

/// Decode workbook bytes; the format is detected from the content
pub fn read_workbook_bytes(bytes: Vec<u8>) -> Result<Workbook> {
    let mut excel: Sheets<_> =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("Unrecognized workbook format")?;

    let mut sheets = Vec::new();
    for sheet_name in excel.sheet_names() {
        let range = excel
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Failed to read sheet '{}'", sheet_name))?;
        sheets.push(parse_sheet(&sheet_name, &range));
    }

    Ok(Workbook { sheets })
}

fn parse_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let cells = range
        .used_cells()
        .map(|(rel_row, rel_col, data)| {
            Cell::new(
                start_row + rel_row as u32,
                start_col + rel_col as u32,
                parse_cell_value(data),
            )
        })
        .collect::<Vec<_>>();

    let sheet = Sheet::from_cells(name, cells);
    log::debug!(
        "decoded sheet '{}' with {} cells, extent {:?}",
        name,
        sheet.cells.len(),
        sheet.extent
    );
    sheet
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_path(Path::new("results.xlsx")));
        assert!(is_supported_path(Path::new("RESULTS.XLS")));
        assert!(is_supported_path(Path::new("dir/results.ods")));
        assert!(!is_supported_path(Path::new("results.csv")));
        assert!(!is_supported_path(Path::new("results")));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        let err = read_workbook_bytes(b"not a workbook".to_vec()).unwrap_err();
        assert!(err.to_string().contains("Unrecognized workbook format"));
    }

    #[test]
    fn test_parse_cell_value() {
        assert_eq!(parse_cell_value(&Data::Int(5)), CellValue::Number(5.0));
        assert_eq!(
            parse_cell_value(&Data::String("USN".to_string())),
            CellValue::Text("USN".to_string())
        );
        assert_eq!(parse_cell_value(&Data::Empty), CellValue::Empty);
    }
}
