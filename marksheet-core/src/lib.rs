//! marksheet-core: result sheet extraction and analysis
//!
//! Locates anchor cells in a loosely formatted result workbook, walks fixed
//! offsets from them to recover the subject catalog and student records,
//! computes pass/fail statistics and renders them into a two-sheet workbook.

pub mod config;
pub mod error;
pub mod extract;
pub mod reader;
pub mod report;
pub mod stats;
pub mod writer;

use anyhow::{Context, Result};
use std::path::Path;

pub use config::AnalyzerConfig;
pub use error::AnalysisError;
pub use extract::{StudentRecord, SubjectCatalog, SubjectMark};
pub use reader::{CellValue, Sheet, Workbook};
pub use report::Table;
pub use stats::{CohortStatistics, Statistics, SubjectStatistics};

/// Inputs of a single run. Each run starts from a fresh context and shares
/// nothing with earlier runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Sequence number of the first student to extract
    pub initial_sequence: u32,
}

impl RunContext {
    pub fn new(initial_sequence: u32) -> Self {
        Self { initial_sequence }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct Analysis {
    pub catalog: SubjectCatalog,
    pub students: Vec<StudentRecord>,
    pub statistics: Statistics,
    /// "Final" and "Report", in that order
    pub tables: Vec<Table>,
}

impl Analysis {
    /// Encode the rendered tables as XLSX bytes
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        writer::encode_workbook(&self.tables)
    }
}

/// Main analyzer interface
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create a new analyzer with default configuration
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create a new analyzer with custom configuration
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run extraction, statistics and rendering over a decoded workbook
    pub fn analyze_workbook(
        &self,
        workbook: &Workbook,
        run: &RunContext,
    ) -> std::result::Result<Analysis, AnalysisError> {
        let config = &self.config;
        let catalog_sheet = required_sheet(workbook, &config.sheets.catalog)?;
        let student_sheet = required_sheet(workbook, &config.sheets.students)?;

        let catalog = extract::extract_catalog(
            catalog_sheet,
            &config.anchors.course_code,
            config.limits.max_catalog_rows,
        )?;

        let scan = extract::StudentScan {
            layout: &config.layout,
            end_of_ids: &config.anchors.end_of_ids,
            total_marker: &config.anchors.total,
            max_subject_columns: config.limits.max_subject_columns,
        };
        let students =
            extract::extract_students(student_sheet, &catalog, run.initial_sequence, &scan)?;
        log::info!(
            "extracted {} students over {} subjects",
            students.len(),
            catalog.len()
        );

        let statistics = stats::compute_statistics(&students, &catalog, &config.grades.tracked);
        let tables = vec![
            report::render_final(&students, &catalog, &statistics.cohort),
            report::render_report(&statistics),
        ];

        Ok(Analysis {
            catalog,
            students,
            statistics,
            tables,
        })
    }

    /// Decode workbook bytes and analyze them
    pub fn analyze_bytes(&self, bytes: Vec<u8>, run: &RunContext) -> Result<Analysis> {
        let workbook = reader::read_workbook_bytes(bytes)?;
        Ok(self.analyze_workbook(&workbook, run)?)
    }

    /// Read a workbook file and analyze it
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P, initial_sequence: u32) -> Result<Analysis> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        self.analyze_bytes(bytes, &RunContext::new(initial_sequence))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn required_sheet<'a>(
    workbook: &'a Workbook,
    name: &str,
) -> std::result::Result<&'a Sheet, AnalysisError> {
    workbook
        .get_sheet(name)
        .ok_or_else(|| AnalysisError::MissingSheet {
            sheet: name.to_string(),
            available: workbook.sheet_names().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Cell;

    #[test]
    fn test_missing_sheet() {
        let workbook = Workbook {
            sheets: vec![Sheet::from_cells(
                "Sheet1",
                vec![Cell::new(0, 0, CellValue::Text("Course Code".to_string()))],
            )],
        };

        let err = Analyzer::new()
            .analyze_workbook(&workbook, &RunContext::new(1))
            .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MissingSheet {
                sheet: "Sheet2".to_string(),
                available: "Sheet1".to_string()
            }
        );
    }
}
