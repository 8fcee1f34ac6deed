use serde::{Deserialize, Serialize};

/// Default name of the consolidated workbook.
pub const DEFAULT_OUTPUT_NAME: &str = "통합파일_고급.xlsx";

/// Tunables for a consolidation run.
///
/// Every field has a default, so a config file only needs the fields it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// File name of the consolidated workbook (directory mode)
    pub output_name: String,
    /// Substring identifying the class-info lookup workbook
    pub lookup_marker: String,
    /// Token marking a roster row as cancelled
    pub cancel_marker: String,
    /// Token preceding a waiting-list number in the status column
    pub waiting_marker: String,
    /// Label applied to waiting-list rows by the status rewrite
    pub applied_label: String,
    /// Spreadsheet extensions picked up in directory mode
    pub extensions: Vec<String>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            lookup_marker: "수업정보".to_string(),
            cancel_marker: "취소".to_string(),
            waiting_marker: "대기".to_string(),
            applied_label: "Applied".to_string(),
            extensions: vec!["xlsx".to_string(), "xls".to_string()],
        }
    }
}

impl MergeOptions {
    /// Set the output workbook name
    #[must_use]
    pub fn with_output_name(mut self, name: &str) -> Self {
        self.output_name = name.to_string();
        self
    }

    /// Set the lookup file marker
    #[must_use]
    pub fn with_lookup_marker(mut self, marker: &str) -> Self {
        self.lookup_marker = marker.to_string();
        self
    }

    /// Set the cancellation marker
    #[must_use]
    pub fn with_cancel_marker(mut self, marker: &str) -> Self {
        self.cancel_marker = marker.to_string();
        self
    }

    /// Set the waiting-list marker
    #[must_use]
    pub fn with_waiting_marker(mut self, marker: &str) -> Self {
        self.waiting_marker = marker.to_string();
        self
    }

    /// Whether a file extension is one of the configured spreadsheet types
    #[must_use]
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MergeOptions::default();
        assert_eq!(options.output_name, "통합파일_고급.xlsx");
        assert_eq!(options.cancel_marker, "취소");
        assert!(options.accepts_extension("XLSX"));
        assert!(!options.accepts_extension("csv"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let options: MergeOptions =
            serde_json::from_str(r#"{"cancel_marker": "cancelled"}"#).unwrap();
        assert_eq!(options.cancel_marker, "cancelled");
        assert_eq!(options.waiting_marker, "대기");
    }

    #[test]
    fn test_builders() {
        let options = MergeOptions::default()
            .with_output_name("out.xlsx")
            .with_lookup_marker("info")
            .with_cancel_marker("X")
            .with_waiting_marker("W");
        assert_eq!(options.output_name, "out.xlsx");
        assert_eq!(options.lookup_marker, "info");
        assert_eq!(options.cancel_marker, "X");
        assert_eq!(options.waiting_marker, "W");
    }
}
