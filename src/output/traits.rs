//! Exporter trait and associated types
//!
//! An exporter persists the record set of a run. The engine invokes it once
//! per run on every termination path; a session may invoke it again later.

use crate::state::ProductRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during export
///
/// An export failure never touches the in-memory crawl state, so the same
/// records can be exported again later.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write export {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode workbook: {0}")]
    Encode(#[from] rust_xlsxwriter::XlsxError),

    #[error("Export task failed: {0}")]
    Task(String),
}

/// Result type for export operations
pub type OutputResult<T> = Result<T, ExportError>;

/// Description of a written export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Location of the written file
    pub path: PathBuf,

    /// Number of data rows (header excluded)
    pub rows: usize,

    /// Hex SHA-256 digest of the file contents
    pub sha256: String,
}

/// Persists a run's records to a spreadsheet file
pub trait Exporter: Send + Sync {
    /// Writes `records`, replacing any previous export
    fn export(&self, records: &[ProductRecord]) -> OutputResult<ExportSummary>;

    /// Where exports are written
    fn destination(&self) -> PathBuf;
}
