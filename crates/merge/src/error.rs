//! Error types for the merge pipeline.

use rollbook_sheet::SheetError;
use thiserror::Error;

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;

/// Errors that end a consolidation run.
///
/// Problems with a single file or sheet are not errors; they are collected
/// as skipped items in the run report.
#[derive(Debug, Error)]
pub enum MergeError {
    /// No spreadsheet files were handed to the pipeline.
    #[error("No input spreadsheet files found")]
    NoInputFiles,

    /// Every file and sheet was skipped.
    #[error("No valid sheets to write ({skipped} item(s) skipped)")]
    NoValidSheets { skipped: usize },

    /// The output file exists but cannot be opened for writing.
    #[error("Output file is in use: {path}")]
    OutputInUse { path: String },

    /// Input directory could not be listed.
    #[error("Cannot read input directory {path}: {source}")]
    InputDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Sheet-level failure while reading or writing a workbook.
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
