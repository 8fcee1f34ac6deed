use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::IndexMap;

/// Longest sheet name a workbook accepts, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// A book containing multiple sheets (preserves insertion order)
///
/// Sheet names are unique ignoring case, the same rule spreadsheet
/// applications enforce.
#[derive(Debug, Clone, Default)]
pub struct Book {
    name: String,
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Book1")
    }

    /// Create a new empty book with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Book {
            name: name.to_string(),
            sheets: IndexMap::new(),
        }
    }

    /// Get the book name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the book name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Check if a sheet exists (case-insensitive)
    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.sheets.keys().any(|k| k.to_lowercase() == wanted)
    }

    // ===== Sheet Access =====

    /// Get a sheet by name
    pub fn get_sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Get a sheet by index (0-based)
    pub fn get_sheet_by_index(&self, index: usize) -> Result<&Sheet> {
        self.sheets
            .get_index(index)
            .map(|(_, sheet)| sheet)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: format!("index {index}"),
            })
    }

    // ===== Sheet Management =====

    /// Add a sheet to the book
    pub fn add_sheet(&mut self, name: &str, sheet: Sheet) -> Result<()> {
        if self.has_sheet(name) {
            return Err(SheetError::SheetAlreadyExists {
                name: name.to_string(),
            });
        }

        let mut sheet = sheet;
        sheet.set_name(name);
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    /// Generate a sheet name not yet used in this book.
    ///
    /// Returns `base_name` when free, otherwise appends `_1`, `_2`, ... and
    /// shortens the base so the result stays within [`MAX_SHEET_NAME_LEN`].
    #[must_use]
    pub fn unique_sheet_name(&self, base_name: &str) -> String {
        if !self.has_sheet(base_name) {
            return base_name.to_string();
        }
        let mut suffix = 1;
        loop {
            let tail = format!("_{suffix}");
            let keep = MAX_SHEET_NAME_LEN.saturating_sub(tail.chars().count());
            let head: String = base_name.chars().take(keep).collect();
            let new_name = format!("{head}{tail}");
            if !self.has_sheet(&new_name) {
                return new_name;
            }
            suffix += 1;
        }
    }

    // ===== Iteration =====

    /// Iterate over sheets
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(k, v)| (k.as_str(), v))
    }
}
