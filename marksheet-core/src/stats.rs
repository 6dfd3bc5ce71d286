//! Per-subject and cohort statistics over extracted records

use crate::config::TrackedGrade;
use crate::extract::{StudentRecord, SubjectCatalog};
use serde::Serialize;

/// Statistics of one catalog subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectStatistics {
    pub code: String,
    pub name: String,
    /// Records carrying this subject, whatever their mark
    pub appeared: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub pass_percentage: f64,
    /// Mean over marks strictly greater than zero
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

/// Count of one tracked term grade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeCount {
    pub token: String,
    pub label: String,
    pub count: usize,
}

/// Whole-cohort figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortStatistics {
    pub total_students: usize,
    /// Records whose result status is pass or fail
    pub appeared: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub absentees: usize,
    pub pass_percentage: f64,
    pub grade_counts: Vec<GradeCount>,
}

/// Everything the report needs, subjects in catalog order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub subjects: Vec<SubjectStatistics>,
    pub cohort: CohortStatistics,
}

impl Statistics {
    pub fn subject(&self, code: &str) -> Option<&SubjectStatistics> {
        self.subjects.iter().find(|s| s.code == code)
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Compute statistics for one subject
pub fn subject_statistics(
    records: &[StudentRecord],
    code: &str,
    name: &str,
) -> SubjectStatistics {
    let mut appeared = 0;
    let mut pass_count = 0;
    let mut fail_count = 0;
    let mut max = 0.0_f64;
    let mut min = f64::INFINITY;
    let mut sum = 0.0;
    let mut counted = 0;

    for mark in records.iter().filter_map(|r| r.mark_for(code)) {
        appeared += 1;
        if mark.result.eq_ignore_ascii_case("pass") {
            pass_count += 1;
        } else if mark.result.eq_ignore_ascii_case("fail") {
            fail_count += 1;
        }

        max = max.max(mark.mark);
        min = min.min(mark.mark);

        // Zero marks are absentees and stay out of the average
        if mark.mark > 0.0 {
            sum += mark.mark;
            counted += 1;
        }
    }

    if min == f64::INFINITY {
        min = 0.0;
    }

    SubjectStatistics {
        code: code.to_string(),
        name: name.to_string(),
        appeared,
        pass_count,
        fail_count,
        pass_percentage: percentage(pass_count, appeared),
        average: if counted > 0 { sum / counted as f64 } else { 0.0 },
        max,
        min,
    }
}

/// Compute cohort statistics
pub fn cohort_statistics(records: &[StudentRecord], grades: &[TrackedGrade]) -> CohortStatistics {
    let pass_count = records.iter().filter(|r| r.has_status("pass")).count();
    let fail_count = records.iter().filter(|r| r.has_status("fail")).count();
    let appeared = pass_count + fail_count;

    let grade_counts = grades
        .iter()
        .map(|grade| GradeCount {
            token: grade.token.clone(),
            label: grade.label.clone(),
            count: records
                .iter()
                .filter(|r| r.term_grade == grade.token)
                .count(),
        })
        .collect();

    CohortStatistics {
        total_students: records.len(),
        appeared,
        pass_count,
        fail_count,
        absentees: records.len() - appeared,
        pass_percentage: percentage(pass_count, appeared),
        grade_counts,
    }
}

/// Compute all statistics for a run
pub fn compute_statistics(
    records: &[StudentRecord],
    catalog: &SubjectCatalog,
    grades: &[TrackedGrade],
) -> Statistics {
    let subjects = catalog
        .iter()
        .map(|subject| subject_statistics(records, &subject.code, &subject.name))
        .collect();

    Statistics {
        subjects,
        cohort: cohort_statistics(records, grades),
    }
}
