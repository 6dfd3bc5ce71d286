//! Subject catalog: subject codes and names listed under the "Course Code" header

use crate::error::{AnalysisError, AnalysisResult};
use crate::reader::Sheet;
use serde::Serialize;
use std::collections::HashMap;

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
}

/// Ordered mapping from subject code to name, in sheet row order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubjectCatalog {
    subjects: Vec<Subject>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SubjectCatalog {
    /// Build a catalog from (code, name) pairs. Codes and names are trimmed;
    /// a repeated code keeps its first position and takes the latest name.
    pub fn from_pairs<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: AsRef<str>,
        N: AsRef<str>,
    {
        let mut catalog = Self::default();
        for (code, name) in pairs {
            catalog.insert(code.as_ref(), name.as_ref());
        }
        catalog
    }

    fn insert(&mut self, code: &str, name: &str) {
        let code = code.trim().to_string();
        let name = name.trim().to_string();
        match self.index.get(&code) {
            Some(&i) => self.subjects[i].name = name,
            None => {
                self.index.insert(code.clone(), self.subjects.len());
                self.subjects.push(Subject { code, name });
            }
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.index.get(code).map(|&i| self.subjects[i].name.as_str())
    }

    /// Subjects in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(|s| s.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// Extract the subject catalog from a sheet.
///
/// Rows below `header` are read until the code cell is empty or `max_rows`
/// rows have been visited. Rows with a code but no name are skipped.
pub fn extract_catalog(
    sheet: &Sheet,
    header: &str,
    max_rows: u32,
) -> AnalysisResult<SubjectCatalog> {
    let (header_row, code_col) =
        sheet
            .find_first(header)
            .ok_or_else(|| AnalysisError::MissingHeader {
                header: header.to_string(),
                sheet: sheet.name.clone(),
            })?;

    let mut catalog = SubjectCatalog::default();
    let mut row = header_row + 1;
    let mut visited = 0;

    while visited < max_rows {
        let code = sheet.value_at(row, code_col);
        if code.is_blank() {
            break;
        }

        let name = sheet.value_at(row, code_col + 1);
        if name.is_blank() {
            log::debug!("row {} has code '{}' but no name, skipping", row, code.as_text());
        } else {
            catalog.insert(&code.as_text(), &name.as_text());
        }

        row += 1;
        visited += 1;
    }

    if visited == max_rows {
        log::warn!(
            "catalog scan in '{}' stopped at the {}-row limit",
            sheet.name,
            max_rows
        );
    }

    if catalog.is_empty() {
        return Err(AnalysisError::EmptyCatalog {
            sheet: sheet.name.clone(),
        });
    }

    log::debug!("catalog has {} subjects", catalog.len());
    Ok(catalog)
}
