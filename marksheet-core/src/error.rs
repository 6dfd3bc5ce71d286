//! Run-level failures

use thiserror::Error;

/// Errors that terminate an analysis run. Per-record problems never show up
/// here; they are skipped or defaulted during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Required sheet '{sheet}' not found in the workbook (found: {available})")]
    MissingSheet { sheet: String, available: String },

    #[error("'{header}' header not found in {sheet}. Please check the format.")]
    MissingHeader { header: String, sheet: String },

    #[error("No subject codes found in {sheet}. Please check the format.")]
    EmptyCatalog { sheet: String },

    #[error("Initial USL number {sequence_id} not found in {sheet}")]
    SequenceNotFound { sequence_id: String, sheet: String },

    #[error("No students found starting from USL number {initial}")]
    EmptyResultSet { initial: u32 },
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
