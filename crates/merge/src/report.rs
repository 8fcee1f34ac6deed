use serde::Serialize;
use std::fmt;

/// Why a file or sheet was left out of the consolidated workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File could not be opened for reading.
    Unreadable,
    /// Every read strategy failed.
    ReadFailed(String),
    /// Another file with the same base name and version was selected instead.
    DuplicateBaseName { kept: String },
    /// The first row carried no recognizable title.
    NoTitle,
    /// Fewer than three rows, so no header could be found.
    TooFewRows,
    /// Nothing left after dropping banner, header and blank rows.
    NoData,
    /// Every data row was cancelled.
    NoActiveRows,
    /// A derived column could not be added.
    EnrichFailed(String),
    /// The spreadsheet writer rejected the sheet.
    WriteRejected(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable => write!(f, "file is locked or unreadable"),
            SkipReason::ReadFailed(e) => write!(f, "read failed: {e}"),
            SkipReason::DuplicateBaseName { kept } => {
                write!(f, "duplicate base name (kept {kept})")
            }
            SkipReason::NoTitle => write!(f, "no title found in first row"),
            SkipReason::TooFewRows => write!(f, "fewer than 3 rows"),
            SkipReason::NoData => write!(f, "no data rows"),
            SkipReason::NoActiveRows => write!(f, "no active rows"),
            SkipReason::EnrichFailed(e) => write!(f, "enrichment failed: {e}"),
            SkipReason::WriteRejected(e) => write!(f, "rejected by writer: {e}"),
        }
    }
}

/// One entry of the skip report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    /// `file.xlsx` for whole files, `file.xlsx:Sheet` for single sheets
    pub name: String,
    pub reason: String,
}

impl SkippedItem {
    #[must_use]
    pub fn new(name: impl Into<String>, reason: &SkipReason) -> Self {
        Self {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Structured outcome of a consolidation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationReport {
    pub success: bool,
    pub sheets_written: usize,
    pub files_processed: usize,
    pub skipped: Vec<SkippedItem>,
    pub excluded_versions: Vec<String>,
    pub error: Option<String>,
}

impl ConsolidationReport {
    /// Record a skipped file or sheet
    pub fn skip(&mut self, name: impl Into<String>, reason: &SkipReason) {
        let item = SkippedItem::new(name, reason);
        tracing::warn!("Skipped {}: {}", item.name, item.reason);
        self.skipped.push(item);
    }

    /// Mark the run failed with a fatal error
    pub fn fail(&mut self, error: impl fmt::Display) {
        self.success = false;
        self.error = Some(error.to_string());
    }
}
