//! # rotaplan-tables
//!
//! Tabular ingestion for the rotaplan rotation engine.
//!
//! This crate provides:
//! - CSV and XLSX readers into a uniform `RawTable`
//! - The class-table normalizer (one row per atomic session)
//! - The teacher-table reader (tri-state availability, capability map)
//! - The integrity audit (human-readable findings, never errors)
//! - Merge-back of solved assignments onto the session rows
//!
//! ## Example
//!
//! ```rust,ignore
//! use rotaplan_tables::{normalize_classes, read_table, read_teacher_table};
//!
//! let classes = read_table("ROTA.xlsx".as_ref())?;
//! let teachers = read_table("PROFESSORES.csv".as_ref())?;
//! let normalized = normalize_classes(&classes)?;
//! let teacher_table = read_teacher_table(&teachers)?;
//! ```

use std::path::Path;
use thiserror::Error;

pub mod audit;
pub mod columns;
pub mod merge;
pub mod normalize;
pub mod teachers;
pub mod write;

pub use audit::audit_roster;
pub use merge::{apply_assignments, MergeOutcome};
pub use normalize::{normalize_classes, NormalizedClasses};
pub use teachers::{read_teacher_table, TeacherTable};
pub use write::{
    write_assignments_csv, write_assignments_csv_file, write_sessions_csv,
    write_sessions_csv_file,
};

// ============================================================================
// Errors
// ============================================================================

/// Ingestion error.
///
/// Only structural problems end up here; cell-level defects become findings.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Xlsx(String),

    #[error("unsupported file format '{0}' (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    #[error("file has no data rows")]
    EmptyTable,

    #[error("required column '{0}' is missing")]
    MissingColumn(String),
}

// ============================================================================
// File formats
// ============================================================================

/// Supported tabular file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

/// Detect the file format from the extension
pub fn detect_format(path: &Path) -> Result<FileFormat, TableError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" => Ok(FileFormat::Csv),
        "xlsx" => Ok(FileFormat::Xlsx),
        other => Err(TableError::UnsupportedFormat(other.to_string())),
    }
}

// ============================================================================
// RawTable
// ============================================================================

/// A header-indexed table of string cells, the uniform shape both readers
/// produce before any domain interpretation happens.
#[derive(Clone, Debug)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by exact header match
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column that must exist
    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Cell text; short rows read as empty cells
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Read a tabular file, choosing the reader by extension
pub fn read_table(path: &Path) -> Result<RawTable, TableError> {
    match detect_format(path)? {
        FileFormat::Csv => read_csv(path),
        FileFormat::Xlsx => read_xlsx(path),
    }
}

fn read_csv(path: &Path) -> Result<RawTable, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "read CSV table");
    Ok(RawTable::new(headers, rows))
}

fn read_xlsx(path: &Path) -> Result<RawTable, TableError> {
    use calamine::{open_workbook, Reader, Xlsx};

    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e: calamine::XlsxError| TableError::Xlsx(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| TableError::Xlsx("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TableError::Xlsx(e.to_string()))?;

    let mut cells = range.rows();
    let header_row = cells.next().ok_or(TableError::EmptyTable)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for data_row in cells {
        let row: Vec<String> = data_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    tracing::debug!(path = %path.display(), sheet = %sheet_name, rows = rows.len(), "read XLSX table");
    Ok(RawTable::new(headers, rows))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("rota.csv")).unwrap(), FileFormat::Csv);
        assert_eq!(detect_format(Path::new("ROTA.XLSX")).unwrap(), FileFormat::Xlsx);
        assert!(detect_format(Path::new("rota.ods")).is_err());
        assert!(detect_format(Path::new("rota")).is_err());
    }

    #[test]
    fn raw_table_lookup_and_short_rows() {
        let table = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        );
        assert_eq!(table.column("b"), Some(1));
        assert_eq!(table.column("z"), None);
        assert!(table.require_column("z").is_err());
        assert_eq!(table.cell(0, 1), "2");
        assert_eq!(table.cell(1, 1), "");
        assert_eq!(table.cell(9, 0), "");
    }

    #[test]
    fn read_csv_skips_blank_rows_and_trims() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "nome grupo,horario").unwrap();
        writeln!(file, " CONV A1 ,08:00:00").unwrap();
        writeln!(file, ",").unwrap();
        writeln!(file, "VIP B2,19:00:00").unwrap();

        let table = read_table(file.path()).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), "CONV A1");
        assert_eq!(table.headers(), ["nome grupo", "horario"]);
    }
}
