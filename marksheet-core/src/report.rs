//! Rendering of records and statistics into the "Final" and "Report" tables

use crate::extract::{StudentRecord, SubjectCatalog};
use crate::reader::CellValue;
use crate::stats::{CohortStatistics, Statistics};

pub const FINAL_SHEET: &str = "Final";
pub const REPORT_SHEET: &str = "Report";

/// A named, row-major table ready to be encoded as a worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    fn push_blank_rows(&mut self, count: usize) {
        for _ in 0..count {
            self.rows.push(Vec::new());
        }
    }

    /// Cell at a 0-based position; missing cells read as empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }

    /// Value of a summary row: the last cell of the first row holding `label`
    pub fn find_label(&self, label: &str) -> Option<&CellValue> {
        self.rows
            .iter()
            .find(|row| row.iter().any(|c| c.is_text(label)))
            .and_then(|row| row.last())
    }
}

/// Blank strings become absent cells
fn text(s: impl Into<String>) -> CellValue {
    let s = s.into();
    if s.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(s)
    }
}

fn number(n: impl Into<f64>) -> CellValue {
    CellValue::Number(n.into())
}

fn count(n: usize) -> CellValue {
    CellValue::Number(n as f64)
}

/// Two decimals as text, the way percentages and averages are reported
pub fn fixed2(value: f64) -> CellValue {
    CellValue::Text(format!("{:.2}", value))
}

/// Overall pass percentage, or a plain 0 when nobody appeared
fn cohort_percentage(cohort: &CohortStatistics) -> CellValue {
    if cohort.appeared > 0 {
        fixed2(cohort.pass_percentage)
    } else {
        number(0)
    }
}

/// Per-student detail sheet followed by the cohort summary
pub fn render_final(
    records: &[StudentRecord],
    catalog: &SubjectCatalog,
    cohort: &CohortStatistics,
) -> Table {
    let mut table = Table::new(FINAL_SHEET);

    let mut header: Vec<CellValue> = [
        "Ref No",
        "USL no",
        "Name",
        "USN",
        "SGPA",
        "CGPA",
        "Result",
        "Term Grade",
    ]
    .into_iter()
    .map(text)
    .collect();
    header.extend(catalog.iter().map(|s| text(s.name.as_str())));
    header.push(text("Total"));
    table.push(header);

    for record in records {
        let mut row = vec![
            number(record.anchor_row),
            text(record.sequence_id.as_str()),
            text(record.name.as_str()),
            text(record.registration_number.as_str()),
            record.sgpa.clone(),
            record.cgpa.clone(),
            text(record.result_status.as_str()),
            text(record.term_grade.as_str()),
        ];
        row.extend(
            catalog
                .codes()
                .map(|code| number(record.mark_for(code).map(|m| m.mark).unwrap_or(0.0))),
        );
        row.push(number(record.total));
        table.push(row);
    }

    table.push_blank_rows(2);

    let summary = [
        ("Number of students appeared", count(cohort.appeared)),
        ("PASS", count(cohort.pass_count)),
        ("FAIL", count(cohort.fail_count)),
        ("Pass Percentage", cohort_percentage(cohort)),
    ];
    for (label, value) in summary {
        table.push(vec![
            CellValue::Empty,
            CellValue::Empty,
            text(label),
            CellValue::Empty,
            CellValue::Empty,
            value,
        ]);
    }

    table
}

/// Per-subject statistics sheet followed by the "Particulars" block
pub fn render_report(stats: &Statistics) -> Table {
    let mut table = Table::new(REPORT_SHEET);

    table.push(
        [
            "Sl.No",
            "Subject",
            "Faculty Handled",
            "Number of students appeared",
            "PASS",
            "FAIL",
            "Subject Wise %",
            "AVG",
            "MAX",
            "MIN",
        ]
        .into_iter()
        .map(text)
        .collect(),
    );

    for (i, subject) in stats.subjects.iter().enumerate() {
        table.push(vec![
            count(i + 1),
            text(subject.name.as_str()),
            CellValue::Empty,
            count(subject.appeared),
            count(subject.pass_count),
            count(subject.fail_count),
            fixed2(subject.pass_percentage),
            fixed2(subject.average),
            number(subject.max),
            number(subject.min),
        ]);
    }

    table.push_blank_rows(2);
    table.push(vec![CellValue::Empty, text("Particulars"), text("Total")]);

    let cohort = &stats.cohort;
    let mut particulars: Vec<(String, CellValue)> = cohort
        .grade_counts
        .iter()
        .map(|g| (g.label.clone(), count(g.count)))
        .collect();
    particulars.extend([
        ("Total No. of Fail".to_string(), count(cohort.fail_count)),
        ("Total No. of Appeared".to_string(), count(cohort.appeared)),
        ("Total No. of Absentees".to_string(), count(cohort.absentees)),
        ("Total No. of Students".to_string(), count(cohort.total_students)),
        ("Total Passing Percentage".to_string(), cohort_percentage(cohort)),
    ]);

    for (label, value) in particulars {
        table.push(vec![CellValue::Empty, text(label), value]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradeConfig;
    use crate::extract::SubjectMark;
    use crate::stats::compute_statistics;
    use std::collections::BTreeMap;

    fn record(id: &str, status: &str, grade: &str, mark: Option<f64>) -> StudentRecord {
        let mut subject_marks = BTreeMap::new();
        if let Some(mark) = mark {
            subject_marks.insert(
                "CS101".to_string(),
                SubjectMark {
                    mark,
                    result: status.to_string(),
                },
            );
        }
        StudentRecord {
            sequence_id: id.to_string(),
            anchor_row: 3,
            name: "ASHA RAO".to_string(),
            registration_number: "1XX21CS001".to_string(),
            sgpa: CellValue::Number(8.2),
            cgpa: CellValue::Text("7.9".to_string()),
            result_status: status.to_string(),
            term_grade: grade.to_string(),
            subject_marks,
            total: mark.unwrap_or(0.0),
        }
    }

    fn catalog() -> SubjectCatalog {
        SubjectCatalog::from_pairs([("CS101", "Data Structures"), ("CS102", "Operating Systems")])
    }

    #[test]
    fn test_final_sheet_layout() {
        let catalog = catalog();
        let records = vec![record("00001", "Pass", "A+", Some(85.0))];
        let stats = compute_statistics(&records, &catalog, &GradeConfig::default().tracked);

        let table = render_final(&records, &catalog, &stats.cohort);
        assert_eq!(table.name, "Final");

        let header: Vec<String> = table.rows[0].iter().map(|c| c.as_text()).collect();
        assert_eq!(
            header,
            vec![
                "Ref No",
                "USL no",
                "Name",
                "USN",
                "SGPA",
                "CGPA",
                "Result",
                "Term Grade",
                "Data Structures",
                "Operating Systems",
                "Total"
            ]
        );

        assert_eq!(table.cell(1, 0), &CellValue::Number(3.0));
        assert_eq!(table.cell(1, 1), &CellValue::Text("00001".to_string()));
        assert_eq!(table.cell(1, 5), &CellValue::Text("7.9".to_string()));
        assert_eq!(table.cell(1, 8), &CellValue::Number(85.0));
        // Subject not taken renders as 0
        assert_eq!(table.cell(1, 9), &CellValue::Number(0.0));
        assert_eq!(table.cell(1, 10), &CellValue::Number(85.0));

        assert!(table.rows[2].is_empty());
        assert!(table.rows[3].is_empty());
        assert_eq!(table.cell(4, 2).as_text(), "Number of students appeared");
        assert_eq!(table.cell(4, 5), &CellValue::Number(1.0));
        assert_eq!(table.cell(7, 2).as_text(), "Pass Percentage");
        assert_eq!(table.cell(7, 5), &CellValue::Text("100.00".to_string()));
        assert!(table.cell(7, 0).is_empty());
    }

    #[test]
    fn test_report_sheet_layout() {
        let catalog = catalog();
        let records = vec![
            record("00001", "Pass", "O", Some(85.0)),
            record("00002", "Fail", "", Some(0.0)),
            record("00003", "", "", None),
        ];
        let stats = compute_statistics(&records, &catalog, &GradeConfig::default().tracked);

        let table = render_report(&stats);
        assert_eq!(table.name, "Report");
        assert_eq!(table.cell(0, 6).as_text(), "Subject Wise %");

        // CS101
        assert_eq!(table.cell(1, 0), &CellValue::Number(1.0));
        assert_eq!(table.cell(1, 1).as_text(), "Data Structures");
        assert!(table.cell(1, 2).is_empty());
        assert_eq!(table.cell(1, 3), &CellValue::Number(2.0));
        assert_eq!(table.cell(1, 6), &CellValue::Text("50.00".to_string()));
        assert_eq!(table.cell(1, 7), &CellValue::Text("85.00".to_string()));
        assert_eq!(table.cell(1, 8), &CellValue::Number(85.0));
        assert_eq!(table.cell(1, 9), &CellValue::Number(0.0));

        // CS102 nobody took
        assert_eq!(table.cell(2, 6), &CellValue::Text("0.00".to_string()));
        assert_eq!(table.cell(2, 9), &CellValue::Number(0.0));

        assert!(table.rows[3].is_empty());
        assert!(table.rows[4].is_empty());
        assert_eq!(table.cell(5, 1).as_text(), "Particulars");

        let particulars: Vec<(String, String)> = table.rows[6..]
            .iter()
            .map(|r| (r[1].as_text(), r[2].as_text()))
            .collect();
        let expected = [
            ("Total No. of Outstanding - O", "1"),
            ("Total No. of A+", "0"),
            ("Total No. of A", "0"),
            ("Total No. of B+", "0"),
            ("Total No. of Fail", "1"),
            ("Total No. of Appeared", "2"),
            ("Total No. of Absentees", "1"),
            ("Total No. of Students", "3"),
            ("Total Passing Percentage", "50.00"),
        ];
        assert_eq!(
            particulars,
            expected
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_no_appearances_gives_plain_zero() {
        let catalog = catalog();
        let records = vec![record("00001", "", "", None)];
        let stats = compute_statistics(&records, &catalog, &[]);

        let final_table = render_final(&records, &catalog, &stats.cohort);
        let last = final_table.rows.len() - 1;
        assert_eq!(final_table.cell(last, 5), &CellValue::Number(0.0));
    }
}
