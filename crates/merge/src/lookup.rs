use crate::columns::LOOKUP_TARGETS;
use crate::error::MergeResult;
use rollbook_sheet::{Book, CellValue, Sheet};
use std::path::Path;

/// Class-info table joined into each roster by title.
#[derive(Debug, Clone)]
pub struct LookupTable {
    sheet: Sheet,
}

impl LookupTable {
    /// Load the first sheet of a workbook, using its first row as the header.
    ///
    /// Returns `Ok(None)` when the sheet has no data rows.
    ///
    /// # Errors
    ///
    /// Returns error if the workbook cannot be read.
    pub fn load<P: AsRef<Path>>(path: P) -> MergeResult<Option<Self>> {
        let book = Book::from_xlsx(path.as_ref())?;
        let sheet = book.get_sheet_by_index(0)?.clone();
        Ok(Self::from_sheet(sheet))
    }

    /// Build a table from a raw sheet whose first row is the header
    #[must_use]
    pub fn from_sheet(mut sheet: Sheet) -> Option<Self> {
        sheet.promote_row_to_header(0).ok()?;
        sheet.remove_empty_rows();
        if sheet.is_empty() {
            return None;
        }
        Some(Self { sheet })
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.sheet.row_count()
    }

    /// First row with a cell containing `title`
    #[must_use]
    pub fn find_row(&self, title: &str) -> Option<&Vec<CellValue>> {
        self.sheet.rows().find(|row| {
            row.iter()
                .any(|cell| !cell.is_null() && cell.as_str().contains(title))
        })
    }

    /// Value of every lookup target for `title`, empty where nothing matches
    #[must_use]
    pub fn values_for(&self, title: &str) -> Vec<(&'static str, String)> {
        let Some(row) = self.find_row(title) else {
            tracing::debug!("No lookup row for '{}'", title);
            return Self::empty_values();
        };
        let names: Vec<String> = self
            .sheet
            .column_names()
            .map(|names| names.iter().map(|n| n.to_lowercase()).collect())
            .unwrap_or_default();

        LOOKUP_TARGETS
            .iter()
            .map(|&(target, aliases)| {
                let value = aliases
                    .iter()
                    .filter_map(|alias| names.iter().position(|n| n.contains(alias)))
                    .map(|col| row.get(col).map(CellValue::as_str).unwrap_or_default())
                    .map(|v| v.trim().to_string())
                    .find(|v| !v.is_empty())
                    .unwrap_or_default();
                (target, value)
            })
            .collect()
    }

    /// Every lookup target paired with an empty value
    #[must_use]
    pub fn empty_values() -> Vec<(&'static str, String)> {
        LOOKUP_TARGETS
            .iter()
            .map(|&(target, _)| (target, String::new()))
            .collect()
    }
}
