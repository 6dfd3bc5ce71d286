//! Declarative offsets of a student block relative to its sequence ID cell

use crate::reader::{CellValue, Sheet};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Grid limits of an XLSX worksheet; offsets at or past them never hit a cell
pub const MAX_SHEET_ROWS: u32 = 1_048_576;
pub const MAX_SHEET_COLS: u32 = 16_384;

/// Identity fields read from fixed offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentField {
    Name,
    RegistrationNumber,
    Sgpa,
    Cgpa,
    ResultStatus,
    TermGrade,
}

/// How a raw cell turns into a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldParser {
    /// Text form of the cell, blank cells read as ""
    Text,
    /// Raw value kept as-is, blank cells read as 0
    Score,
    /// Letters following "Result: "
    ResultToken,
    /// Rest of the line following "Term Grade: ", trimmed
    TermGrade,
}

/// Parsed value of one field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Score(CellValue),
}

impl FieldParser {
    pub fn parse(&self, raw: &CellValue) -> FieldValue {
        let text = || {
            if raw.is_blank() {
                String::new()
            } else {
                raw.as_text()
            }
        };

        match self {
            FieldParser::Text => FieldValue::Text(text()),
            FieldParser::Score => FieldValue::Score(if raw.is_blank() {
                CellValue::Number(0.0)
            } else {
                raw.clone()
            }),
            FieldParser::ResultToken => FieldValue::Text(parse_result_status(&text())),
            FieldParser::TermGrade => FieldValue::Text(parse_term_grade(&text())),
        }
    }
}

/// One row of the offset table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOffset {
    pub field: StudentField,
    pub row: u32,
    pub col: u32,
    pub parser: FieldParser,
}

impl FieldOffset {
    pub const fn new(field: StudentField, row: u32, col: u32, parser: FieldParser) -> Self {
        Self {
            field,
            row,
            col,
            parser,
        }
    }
}

/// Where everything in a student block lives, relative to the sequence ID
/// cell at (anchor row, anchor col).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentLayout {
    pub fields: Vec<FieldOffset>,
    /// Column offset of the first subject code on the anchor row
    pub subject_col: u32,
    /// Row offset of the numeric marks and the total
    pub mark_row: u32,
    /// Row offset of the per-subject result text
    pub result_row: u32,
}

impl Default for StudentLayout {
    fn default() -> Self {
        use FieldParser as P;
        use StudentField as F;

        Self {
            fields: vec![
                FieldOffset::new(F::Name, 2, 0, P::Text),
                FieldOffset::new(F::RegistrationNumber, 1, 1, P::Text),
                FieldOffset::new(F::Sgpa, 5, 1, P::Score),
                FieldOffset::new(F::Cgpa, 6, 1, P::Score),
                FieldOffset::new(F::ResultStatus, 7, 0, P::ResultToken),
                FieldOffset::new(F::TermGrade, 9, 0, P::TermGrade),
            ],
            subject_col: 3,
            mark_row: 7,
            result_row: 10,
        }
    }
}

impl StudentLayout {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for offset in &self.fields {
            if !seen.insert(offset.field) {
                anyhow::bail!(
                    "Configuration error: layout lists field {:?} more than once",
                    offset.field
                );
            }
        }
        if self.subject_col == 0 {
            anyhow::bail!("Configuration error: subject_col must point right of the ID column");
        }

        let rows = self
            .fields
            .iter()
            .map(|o| (format!("{:?} row", o.field), o.row))
            .chain([
                ("mark_row".to_string(), self.mark_row),
                ("result_row".to_string(), self.result_row),
            ]);
        for (name, value) in rows {
            if value >= MAX_SHEET_ROWS {
                anyhow::bail!(
                    "Configuration error: layout offset {} = {} exceeds the {} sheet rows",
                    name,
                    value,
                    MAX_SHEET_ROWS
                );
            }
        }

        let cols = self
            .fields
            .iter()
            .map(|o| (format!("{:?} col", o.field), o.col))
            .chain([("subject_col".to_string(), self.subject_col)]);
        for (name, value) in cols {
            if value >= MAX_SHEET_COLS {
                anyhow::bail!(
                    "Configuration error: layout offset {} = {} exceeds the {} sheet columns",
                    name,
                    value,
                    MAX_SHEET_COLS
                );
            }
        }

        Ok(())
    }

    /// Read every field of the table for the block anchored at the given
    /// 1-based position.
    pub fn read_fields(&self, sheet: &Sheet, anchor_row: u32, anchor_col: u32) -> FieldValues {
        let values = self
            .fields
            .iter()
            .map(|offset| {
                let raw = sheet.value_offset(anchor_row, anchor_col, offset.row, offset.col);
                (offset.field, offset.parser.parse(raw))
            })
            .collect();
        FieldValues { values }
    }
}

/// Field values of one student block
#[derive(Debug, Clone, Default)]
pub struct FieldValues {
    values: HashMap<StudentField, FieldValue>,
}

impl FieldValues {
    /// Text of a field; fields missing from the layout read as ""
    pub fn text(&self, field: StudentField) -> String {
        match self.values.get(&field) {
            Some(FieldValue::Text(s)) => s.clone(),
            Some(FieldValue::Score(v)) => v.as_text(),
            None => String::new(),
        }
    }

    /// Raw score of a field; fields missing from the layout read as 0
    pub fn score(&self, field: StudentField) -> CellValue {
        match self.values.get(&field) {
            Some(FieldValue::Score(v)) => v.clone(),
            Some(FieldValue::Text(s)) if !s.is_empty() => CellValue::Text(s.clone()),
            _ => CellValue::Number(0.0),
        }
    }
}

/// Token after "Result:", or "" when the text has none
pub fn parse_result_status(text: &str) -> String {
    static RESULT_RE: OnceLock<Regex> = OnceLock::new();
    let re = RESULT_RE.get_or_init(|| Regex::new(r"Result: ([A-Za-z]+)").unwrap());

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Text after "Term Grade:" up to the end of its line, trimmed
pub fn parse_term_grade(text: &str) -> String {
    static TERM_GRADE_RE: OnceLock<Regex> = OnceLock::new();
    let re = TERM_GRADE_RE.get_or_init(|| Regex::new(r"Term Grade: ([^\n]+)").unwrap());

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
