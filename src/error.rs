use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReconError>;

/// Error type covering the failure cases that can occur while the tool
/// ingests the two inputs, reconciles them, or emits the report.
#[derive(Debug, Error)]
pub enum ReconError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization of the report fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a required key or measurement column is absent from an
    /// input. Carries the offending source and its actual column list so the
    /// caller can show a precise fix-it message.
    #[error("required column(s) {missing:?} not found in {label}; columns present: {present:?}")]
    MissingColumns {
        label: String,
        missing: Vec<String>,
        present: Vec<String>,
    },

    /// Raised when a workbook does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Raised when the output extension maps to no known report format.
    #[error("unsupported output format for '{}': expected .xlsx or .json", .0.display())]
    UnsupportedOutput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
