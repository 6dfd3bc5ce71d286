//! Configuration for sheet names, anchors, scan limits and the record layout

use crate::extract::layout::StudentLayout;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Main analyzer configuration. Every section is optional in TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub sheets: SheetNames,
    #[serde(default)]
    pub anchors: Anchors,
    #[serde(default)]
    pub limits: ScanLimits,
    #[serde(default)]
    pub layout: StudentLayout,
    #[serde(default)]
    pub grades: GradeConfig,
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AnalyzerConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Reject values that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.sheets.catalog.trim().is_empty() || self.sheets.students.trim().is_empty() {
            anyhow::bail!("Configuration error: sheet names must not be empty");
        }

        for (key, value) in [
            ("course_code", &self.anchors.course_code),
            ("end_of_ids", &self.anchors.end_of_ids),
            ("total", &self.anchors.total),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("Configuration error: anchor '{}' must not be empty", key);
            }
        }

        if self.limits.max_catalog_rows == 0 {
            anyhow::bail!("Configuration error: max_catalog_rows must be at least 1");
        }
        if self.limits.max_subject_columns == 0 {
            anyhow::bail!("Configuration error: max_subject_columns must be at least 1");
        }

        self.layout.validate()?;

        let mut seen = HashSet::new();
        for grade in &self.grades.tracked {
            if !seen.insert(grade.token.as_str()) {
                anyhow::bail!(
                    "Configuration error: grade token '{}' is listed more than once",
                    grade.token
                );
            }
        }

        Ok(())
    }
}

/// Names of the sheets the analyzer reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub catalog: String,
    pub students: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            catalog: "Sheet1".to_string(),
            students: "Sheet2".to_string(),
        }
    }
}

/// Literal cell contents used as anchors and terminators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchors {
    /// Header above the subject code column
    pub course_code: String,
    /// Ends the column of sequence IDs
    pub end_of_ids: String,
    /// Ends the subject columns of a student block
    pub total: String,
}

impl Default for Anchors {
    fn default() -> Self {
        Self {
            course_code: "Course Code".to_string(),
            end_of_ids: "USN".to_string(),
            total: "Total".to_string(),
        }
    }
}

/// Iteration caps for the bounded scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    pub max_catalog_rows: u32,
    pub max_subject_columns: u32,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_catalog_rows: 100,
            max_subject_columns: 50,
        }
    }
}

/// Term grades counted in the cohort summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeConfig {
    pub tracked: Vec<TrackedGrade>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedGrade {
    /// Exact, case-sensitive term grade token
    pub token: String,
    /// Row label in the report summary
    pub label: String,
}

impl TrackedGrade {
    pub fn new(token: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            label: label.into(),
        }
    }
}

impl Default for GradeConfig {
    fn default() -> Self {
        Self {
            tracked: vec![
                TrackedGrade::new("O", "Total No. of Outstanding - O"),
                TrackedGrade::new("A+", "Total No. of A+"),
                TrackedGrade::new("A", "Total No. of A"),
                TrackedGrade::new("B+", "Total No. of B+"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.sheets.catalog, "Sheet1");
        assert_eq!(config.sheets.students, "Sheet2");
        assert_eq!(config.anchors.course_code, "Course Code");
        assert_eq!(config.limits.max_catalog_rows, 100);
        assert_eq!(config.limits.max_subject_columns, 50);
        assert_eq!(config.grades.tracked.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalyzerConfig::from_toml(
            r#"
            [sheets]
            students = "Results"

            [limits]
            max_subject_columns = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.sheets.catalog, "Sheet1");
        assert_eq!(config.sheets.students, "Results");
        assert_eq!(config.limits.max_catalog_rows, 100);
        assert_eq!(config.limits.max_subject_columns, 20);
        assert_eq!(config.layout, StudentLayout::default());
    }

    #[test]
    fn test_grades_from_toml() {
        let config = AnalyzerConfig::from_toml(
            r#"
            [[grades.tracked]]
            token = "S"
            label = "Total No. of S"
            "#,
        )
        .unwrap();

        assert_eq!(config.grades.tracked, vec![TrackedGrade::new("S", "Total No. of S")]);
    }

    #[test]
    fn test_validation() {
        let mut bad = AnalyzerConfig::default();
        bad.limits.max_catalog_rows = 0;
        assert!(bad.validate().is_err());

        let mut bad = AnalyzerConfig::default();
        bad.anchors.total = "  ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = AnalyzerConfig::default();
        bad.grades.tracked.push(TrackedGrade::new("O", "again"));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_out_of_sheet_layout_offset_fails_validation() {
        let config = AnalyzerConfig::from_toml("[layout]\nmark_row = 4294967295").unwrap();
        assert_eq!(config.layout.mark_row, u32::MAX);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_toml_is_an_error() {
        assert!(AnalyzerConfig::from_toml("[limits]\nmax_catalog_rows = \"many\"").is_err());
    }
}
