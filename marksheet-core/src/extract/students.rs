//! Student record extraction from the result sheet

use super::catalog::SubjectCatalog;
use super::layout::{StudentField, StudentLayout};
use crate::error::{AnalysisError, AnalysisResult};
use crate::reader::{CellValue, Sheet};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Mark and result text of one subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectMark {
    pub mark: f64,
    pub result: String,
}

/// One student's extracted data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    /// 5-digit zero-padded sequence (USL) number
    pub sequence_id: String,
    /// 1-based row of the sequence ID cell
    pub anchor_row: u32,
    pub name: String,
    pub registration_number: String,
    pub sgpa: CellValue,
    pub cgpa: CellValue,
    /// "Pass", "Fail" or whatever token followed "Result:", possibly ""
    pub result_status: String,
    pub term_grade: String,
    /// Keyed by catalog code
    pub subject_marks: BTreeMap<String, SubjectMark>,
    pub total: f64,
}

impl StudentRecord {
    pub fn mark_for(&self, code: &str) -> Option<&SubjectMark> {
        self.subject_marks.get(code)
    }

    /// Result status compared case-insensitively
    pub fn has_status(&self, status: &str) -> bool {
        self.result_status.eq_ignore_ascii_case(status)
    }
}

/// Markers and caps that drive the student scan
#[derive(Debug, Clone, Copy)]
pub struct StudentScan<'a> {
    pub layout: &'a StudentLayout,
    /// Cell text ending the column of sequence IDs
    pub end_of_ids: &'a str,
    /// Cell text ending the subject columns of a block
    pub total_marker: &'a str,
    pub max_subject_columns: u32,
}

/// Zero-pad a sequence number to five digits
pub fn format_sequence_id(number: u32) -> String {
    format!("{:05}", number)
}

/// Check whether a cell's text is a 5-digit sequence ID
pub fn is_sequence_id(text: &str) -> bool {
    static SEQUENCE_RE: OnceLock<Regex> = OnceLock::new();
    SEQUENCE_RE
        .get_or_init(|| Regex::new(r"^[0-9]{5}$").unwrap())
        .is_match(text)
}

/// Walk down `col` from `start_row` collecting sequence IDs until a cell holds
/// exactly `end_marker` or the sheet ends.
pub fn collect_sequence_ids(
    sheet: &Sheet,
    start_row: u32,
    col: u32,
    end_marker: &str,
) -> Vec<String> {
    let mut ids = Vec::new();

    for row in start_row..=sheet.last_row() {
        let value = sheet.value_at(row, col);
        if value.is_text(end_marker) {
            log::debug!("'{}' found at row {}, ending ID scan", end_marker, row);
            break;
        }
        if value.is_blank() {
            continue;
        }
        let text = value.as_text();
        if is_sequence_id(&text) {
            ids.push(text);
        }
    }

    ids
}

/// Scan the anchor row rightward for subject codes and read their marks.
///
/// Returns the marks keyed by code and the total read from the column where
/// the scan stopped.
pub fn read_subject_marks(
    sheet: &Sheet,
    catalog: &SubjectCatalog,
    anchor_row: u32,
    anchor_col: u32,
    scan: &StudentScan<'_>,
) -> (BTreeMap<String, SubjectMark>, f64) {
    let layout = scan.layout;
    let mut marks = BTreeMap::new();
    // Column offset from the anchor; cells past the grid limits read as empty
    let mut col_offset = layout.subject_col;
    let mut visited = 0;

    while visited < scan.max_subject_columns {
        let header = sheet.value_offset(anchor_row, anchor_col, 0, col_offset);
        if header.is_text(scan.total_marker) {
            break;
        }

        if !header.is_blank() {
            let code = header.as_text();
            if catalog.contains(&code) {
                let mark = sheet
                    .value_offset(anchor_row, anchor_col, layout.mark_row, col_offset)
                    .as_number()
                    .unwrap_or(0.0);
                let result =
                    sheet.value_offset(anchor_row, anchor_col, layout.result_row, col_offset);
                let result = if result.is_blank() {
                    String::new()
                } else {
                    result.as_text()
                };
                marks.insert(code, SubjectMark { mark, result });
            } else {
                log::debug!("ignoring unknown subject '{}' at row {}", code, anchor_row);
            }
        }

        col_offset = col_offset.saturating_add(1);
        visited += 1;
    }

    if visited == scan.max_subject_columns {
        log::warn!(
            "no '{}' marker within {} columns of row {}",
            scan.total_marker,
            scan.max_subject_columns,
            anchor_row
        );
    }

    let total = sheet
        .value_offset(anchor_row, anchor_col, layout.mark_row, col_offset)
        .as_number()
        .unwrap_or(0.0);

    (marks, total)
}

/// Build one record for the block anchored at the given 1-based position
pub fn read_student(
    sheet: &Sheet,
    catalog: &SubjectCatalog,
    sequence_id: &str,
    anchor_row: u32,
    anchor_col: u32,
    scan: &StudentScan<'_>,
) -> StudentRecord {
    let fields = scan.layout.read_fields(sheet, anchor_row, anchor_col);
    let (subject_marks, total) = read_subject_marks(sheet, catalog, anchor_row, anchor_col, scan);

    StudentRecord {
        sequence_id: sequence_id.to_string(),
        anchor_row,
        name: fields.text(StudentField::Name),
        registration_number: fields.text(StudentField::RegistrationNumber),
        sgpa: fields.score(StudentField::Sgpa),
        cgpa: fields.score(StudentField::Cgpa),
        result_status: fields.text(StudentField::ResultStatus),
        term_grade: fields.text(StudentField::TermGrade),
        subject_marks,
        total,
    }
}

/// Extract every student from the sequence ID block that starts at `initial`.
pub fn extract_students(
    sheet: &Sheet,
    catalog: &SubjectCatalog,
    initial: u32,
    scan: &StudentScan<'_>,
) -> AnalysisResult<Vec<StudentRecord>> {
    let initial_id = format_sequence_id(initial);
    let (start_row, id_col) =
        sheet
            .find_first(&initial_id)
            .ok_or_else(|| AnalysisError::SequenceNotFound {
                sequence_id: initial_id.clone(),
                sheet: sheet.name.clone(),
            })?;

    let ids = collect_sequence_ids(sheet, start_row, id_col, scan.end_of_ids);
    log::debug!("found {} sequence IDs from row {}", ids.len(), start_row);

    let mut seen = HashSet::new();
    let mut students = Vec::with_capacity(ids.len());

    for id in ids {
        if !seen.insert(id.clone()) {
            log::warn!("sequence ID {} appears more than once, keeping the first", id);
            continue;
        }

        // The block is re-anchored on the first occurrence of the ID
        let Some((anchor_row, _)) = sheet.find_first(&id) else {
            log::warn!("sequence ID {} could not be located, skipping", id);
            continue;
        };

        students.push(read_student(sheet, catalog, &id, anchor_row, id_col, scan));
    }

    if students.is_empty() {
        return Err(AnalysisError::EmptyResultSet { initial });
    }

    Ok(students)
}
