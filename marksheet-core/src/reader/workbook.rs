//! Workbook data structures and the cell grid accessor

use serde::Serialize;
use std::collections::HashMap;

/// Represents a decoded workbook
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Get all sheet names
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Inclusive bounds of the populated region, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

/// Represents a worksheet as a sparse grid.
///
/// Cells are stored 0-based; the lookup methods take 1-based coordinates so
/// that offsets read the same way a user counts rows on screen.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub cells: HashMap<(u32, u32), Cell>,
    pub extent: Option<Extent>,
}

impl Sheet {
    /// Build a sheet from cells, computing the extent from their positions
    pub fn from_cells(name: impl Into<String>, cells: impl IntoIterator<Item = Cell>) -> Self {
        let cells: HashMap<(u32, u32), Cell> = cells
            .into_iter()
            .filter(|c| !c.value.is_empty())
            .map(|c| ((c.row, c.col), c))
            .collect();

        let extent = cells.keys().fold(None, |acc: Option<Extent>, &(row, col)| {
            Some(match acc {
                Some(e) => Extent {
                    min_row: e.min_row.min(row),
                    min_col: e.min_col.min(col),
                    max_row: e.max_row.max(row),
                    max_col: e.max_col.max(col),
                },
                None => Extent {
                    min_row: row,
                    min_col: col,
                    max_row: row,
                    max_col: col,
                },
            })
        });

        Self {
            name: name.into(),
            cells,
            extent,
        }
    }

    /// Get a cell at the given 0-based position
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Value at a 1-based position. Row or column 0 and anything outside the
    /// grid read as empty.
    pub fn value_at(&self, row: u32, col: u32) -> &CellValue {
        if row == 0 || col == 0 {
            return &CellValue::Empty;
        }
        self.get_cell(row - 1, col - 1)
            .map(|c| &c.value)
            .unwrap_or(&CellValue::Empty)
    }

    /// Value at a 1-based position shifted by (`d_row`, `d_col`). A shift that
    /// overflows the coordinate range reads as empty.
    pub fn value_offset(&self, row: u32, col: u32, d_row: u32, d_col: u32) -> &CellValue {
        match (row.checked_add(d_row), col.checked_add(d_col)) {
            (Some(r), Some(c)) => self.value_at(r, c),
            _ => &CellValue::Empty,
        }
    }

    /// First 1-based (row, col) whose trimmed text equals the trimmed search
    /// value, scanning the extent in row-major order.
    pub fn find_first(&self, search: &str) -> Option<(u32, u32)> {
        let extent = self.extent?;
        let needle = search.trim();

        for row in extent.min_row..=extent.max_row {
            for col in extent.min_col..=extent.max_col {
                if let Some(cell) = self.get_cell(row, col) {
                    if cell.value.as_text().trim() == needle {
                        return Some((row + 1, col + 1));
                    }
                }
            }
        }
        None
    }

    /// Last 1-based row of the extent, or 0 for an empty sheet
    pub fn last_row(&self) -> u32 {
        self.extent.map(|e| e.max_row + 1).unwrap_or(0)
    }
}

/// Represents a single cell
#[derive(Debug, Clone)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
}

impl Cell {
    pub fn new(row: u32, col: u32, value: CellValue) -> Self {
        Self { row, col, value }
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Empty cells, empty text, zero and false all count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Boolean(b) => !b,
            CellValue::Error(_) => false,
        }
    }

    /// Text form used for anchor matching and text fields
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }

    /// Numeric reading of the value; text is parsed, anything else is `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
        .filter(|n| n.is_finite())
    }

    /// Check whether the value is exactly the given text (no trimming)
    pub fn is_text(&self, expected: &str) -> bool {
        matches!(self, CellValue::Text(s) if s == expected)
    }
}

/// Integral values print without a fractional part
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(row: u32, col: u32, s: &str) -> Cell {
        Cell::new(row, col, CellValue::Text(s.to_string()))
    }

    #[test]
    fn test_value_at_is_one_based() {
        let sheet = Sheet::from_cells("Sheet1", vec![text(0, 0, "A1"), text(2, 1, "B3")]);

        assert_eq!(sheet.value_at(1, 1), &CellValue::Text("A1".to_string()));
        assert_eq!(sheet.value_at(3, 2), &CellValue::Text("B3".to_string()));
        assert!(sheet.value_at(0, 1).is_empty());
        assert!(sheet.value_at(500, 500).is_empty());
    }

    #[test]
    fn test_value_offset_overflow_reads_empty() {
        let sheet = Sheet::from_cells("Sheet1", vec![text(3, 2, "C4")]);

        assert_eq!(sheet.value_offset(2, 1, 2, 2), &CellValue::Text("C4".to_string()));
        assert!(sheet.value_offset(2, 1, u32::MAX, 0).is_empty());
        assert!(sheet.value_offset(2, 1, 0, u32::MAX).is_empty());
    }

    #[test]
    fn test_find_first_is_row_major_and_trimmed() {
        let sheet = Sheet::from_cells(
            "Sheet1",
            vec![
                text(4, 0, "Course Code"),
                text(2, 3, "  Course Code "),
                text(2, 5, "Course Code"),
            ],
        );

        assert_eq!(sheet.find_first("Course Code"), Some((3, 4)));
        assert_eq!(sheet.find_first(" Course Code"), Some((3, 4)));
        assert_eq!(sheet.find_first("Missing"), None);
    }

    #[test]
    fn test_find_first_matches_numbers_by_text() {
        let sheet = Sheet::from_cells(
            "Sheet2",
            vec![Cell::new(1, 1, CellValue::Number(85.0))],
        );
        assert_eq!(sheet.find_first("85"), Some((2, 2)));
        assert_eq!(sheet.find_first("85.0"), None);
    }

    #[test]
    fn test_empty_sheet_has_no_extent() {
        let sheet = Sheet::from_cells("Empty", Vec::new());
        assert!(sheet.extent.is_none());
        assert_eq!(sheet.last_row(), 0);
        assert_eq!(sheet.find_first(""), None);
    }

    #[test]
    fn test_text_and_number_forms() {
        assert_eq!(CellValue::Number(85.0).as_text(), "85");
        assert_eq!(CellValue::Number(8.25).as_text(), "8.25");
        assert_eq!(CellValue::Text(" 72 ".to_string()).as_number(), Some(72.0));
        assert_eq!(CellValue::Text("AB".to_string()).as_number(), None);
        assert!(CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Text("0".to_string()).is_blank());
    }
}
