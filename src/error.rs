use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Error type covering the different failure cases that can occur while a
/// workbook is read, renamed, and written into a database.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors bubbled up from the workbook readers (xlsx, xls, xlsb, ods).
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Errors bubbled up from SQLite while creating or filling a table.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Raised when the workbook discovery pattern cannot be compiled.
    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Raised when a sheet listed by the workbook cannot be located.
    #[error("missing sheet '{0}'")]
    MissingSheet(String),

    /// Raised when a sheet has no header row to derive columns from.
    #[error("sheet '{0}' has no header row")]
    EmptySheet(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when discovery finds nothing to convert.
    #[error("no Excel files found in {0}")]
    NoWorkbooks(PathBuf),

    /// Raised when the derived database path would overwrite the workbook.
    #[error("destination {0} is the source workbook")]
    DestinationIsSource(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
