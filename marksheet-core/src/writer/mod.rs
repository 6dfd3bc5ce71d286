//! Writer module for producing the analysis workbook

mod xlsx_writer;

pub use xlsx_writer::{cell_ref, write_workbook_xlsx};

use crate::report::Table;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Encode tables as XLSX bytes
pub fn encode_workbook(tables: &[Table]) -> Result<Vec<u8>> {
    write_workbook_xlsx(tables)
}

/// Encode tables and write them to a file
pub fn write_workbook<P: AsRef<Path>>(path: P, tables: &[Table]) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_workbook(tables)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write workbook: {}", path.display()))
}

/// Default output location: `Analysis_<file name>` next to the input
pub fn output_path_for(input: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook.xlsx".to_string());
    input.with_file_name(format!("Analysis_{}", file_name))
}
