use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A sheet representing a 2D grid of cells (row-major storage)
///
/// When column names are set they act as the header row: `data` then holds
/// data rows only, and the header is written above them on export.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
    column_names: Option<Vec<String>>,
    struck_rows: BTreeSet<usize>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
            column_names: None,
            struck_rows: BTreeSet::new(),
        }
    }

    /// Create a sheet from a 2D vector of values
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let converted: Vec<Vec<CellValue>> = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();

        let mut sheet = Sheet::new();
        sheet.data = converted;
        sheet
    }

    /// Create an empty table that carries the given column names
    #[must_use]
    pub fn with_columns(name: &str, columns: Vec<String>) -> Self {
        let mut sheet = Sheet::with_name(name);
        sheet.column_names = Some(columns);
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows (data rows only when columns are named)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    ///
    /// Named sheets report the header width, unnamed ones the widest row.
    #[must_use]
    pub fn col_count(&self) -> usize {
        match &self.column_names {
            Some(names) => names.len(),
            None => self.data.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    // ===== Row Operations =====

    /// Get a row by index
    pub fn row(&self, index: usize) -> Result<&Vec<CellValue>> {
        self.data.get(index).ok_or(SheetError::RowIndexOutOfBounds {
            index,
            count: self.row_count(),
        })
    }

    /// Append a row, padding or truncating it to the header width when named
    pub fn row_append<T: Into<CellValue>>(&mut self, data: Vec<T>) {
        let mut row: Vec<CellValue> = data.into_iter().map(Into::into).collect();
        if let Some(names) = &self.column_names {
            row.resize(names.len(), CellValue::Null);
        }
        self.data.push(row);
    }

    /// Remove the first `count` rows, returning them
    pub fn drain_leading_rows(&mut self, count: usize) -> Vec<Vec<CellValue>> {
        let count = count.min(self.data.len());
        let drained: Vec<Vec<CellValue>> = self.data.drain(..count).collect();
        self.shift_struck_rows(count);
        drained
    }

    /// Remove empty rows (rows where every cell is blank).
    /// Returns the number of rows removed.
    pub fn remove_empty_rows(&mut self) -> usize {
        let original_len = self.data.len();
        self.data
            .retain(|row| !row.iter().all(CellValue::is_blank));
        self.struck_rows.clear();
        original_len - self.data.len()
    }

    /// Split rows into two sheets: rows matching the predicate, and the rest.
    ///
    /// Both halves keep the column names and the original relative row order.
    #[must_use]
    pub fn partition_rows<F>(&self, predicate: F) -> (Sheet, Sheet)
    where
        F: Fn(&[CellValue]) -> bool,
    {
        let mut matched = self.empty_like();
        let mut rest = self.empty_like();
        for row in &self.data {
            if predicate(row) {
                matched.data.push(row.clone());
            } else {
                rest.data.push(row.clone());
            }
        }
        (matched, rest)
    }

    /// Stable-sort data rows with the given comparator
    pub fn sort_rows_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Vec<CellValue>, &Vec<CellValue>) -> Ordering,
    {
        self.data.sort_by(compare);
        self.struck_rows.clear();
    }

    /// Append the rows of another sheet below this one.
    ///
    /// Rows are aligned by position; short rows are padded with nulls up to
    /// this sheet's width. Returns the index of the first appended row.
    pub fn append_rows(&mut self, other: &Sheet) -> usize {
        let start = self.data.len();
        let width = self.col_count();
        for row in &other.data {
            let mut row = row.clone();
            if row.len() < width {
                row.resize(width, CellValue::Null);
            }
            self.data.push(row);
        }
        start
    }

    // ===== Column Operations =====

    /// Get an entire column by index (0-based)
    pub fn column(&self, index: usize) -> Result<Vec<CellValue>> {
        if index >= self.col_count() {
            return Err(SheetError::IndexOutOfBounds {
                row: 0,
                col: index,
                rows: self.row_count(),
                cols: self.col_count(),
            });
        }

        Ok(self
            .data
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect())
    }

    /// Get an entire column by name
    pub fn column_by_name(&self, name: &str) -> Result<Vec<CellValue>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })?;
        self.column(index)
    }

    /// Replace the values of a named column, or append it if missing.
    /// Returns the column index.
    pub fn upsert_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<usize> {
        if values.len() != self.row_count() {
            return Err(SheetError::LengthMismatch {
                expected: self.row_count(),
                actual: values.len(),
            });
        }

        let index = match self.column_index(name) {
            Some(index) => index,
            None => {
                let index = self.col_count();
                self.column_names
                    .get_or_insert_with(Vec::new)
                    .push(name.to_string());
                index
            }
        };

        for (row, value) in self.data.iter_mut().zip(values) {
            if row.len() <= index {
                row.resize(index + 1, CellValue::Null);
            }
            row[index] = value;
        }

        Ok(index)
    }

    /// Apply a function to every cell of a column
    pub fn column_map<F>(&mut self, col_index: usize, f: F) -> Result<()>
    where
        F: Fn(&CellValue) -> CellValue,
    {
        if col_index >= self.col_count() {
            return Err(SheetError::IndexOutOfBounds {
                row: 0,
                col: col_index,
                rows: self.row_count(),
                cols: self.col_count(),
            });
        }

        for row in &mut self.data {
            if let Some(cell) = row.get_mut(col_index) {
                *cell = f(cell);
            }
        }
        Ok(())
    }

    // ===== Named Access =====

    /// Promote a row to column headers and remove it from the data.
    ///
    /// Header cells use their string form (blank cells become `""`), and every
    /// remaining row is padded or truncated to the header width.
    pub fn promote_row_to_header(&mut self, row_index: usize) -> Result<()> {
        if row_index >= self.data.len() {
            return Err(SheetError::RowIndexOutOfBounds {
                index: row_index,
                count: self.row_count(),
            });
        }

        let header = self.data.remove(row_index);
        let names: Vec<String> = header.iter().map(|c| c.as_str().trim().to_string()).collect();
        let width = names.len();
        for row in &mut self.data {
            row.resize(width, CellValue::Null);
        }

        self.column_names = Some(names);
        self.struck_rows.clear();
        Ok(())
    }

    /// Get column names (if set)
    #[must_use]
    pub fn column_names(&self) -> Option<&Vec<String>> {
        self.column_names.as_ref()
    }

    /// Index of the first column whose name equals `name`
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names
            .as_ref()?
            .iter()
            .position(|n| n == name)
    }

    // ===== Row Styling =====

    /// Mark a data row to be rendered with a strikethrough font
    pub fn strike_row(&mut self, index: usize) -> Result<()> {
        if index >= self.data.len() {
            return Err(SheetError::RowIndexOutOfBounds {
                index,
                count: self.row_count(),
            });
        }
        self.struck_rows.insert(index);
        Ok(())
    }

    /// Check whether a data row is marked struck through
    #[must_use]
    pub fn is_struck(&self, index: usize) -> bool {
        self.struck_rows.contains(&index)
    }

    /// Data rows marked struck through, ascending
    #[must_use]
    pub fn struck_rows(&self) -> &BTreeSet<usize> {
        &self.struck_rows
    }

    // ===== Conversion =====

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get reference to underlying data
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable reference to underlying data
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        self.struck_rows.clear();
        &mut self.data
    }

    fn empty_like(&self) -> Sheet {
        Sheet {
            name: self.name.clone(),
            data: Vec::new(),
            column_names: self.column_names.clone(),
            struck_rows: BTreeSet::new(),
        }
    }

    fn shift_struck_rows(&mut self, removed: usize) {
        self.struck_rows = self
            .struck_rows
            .iter()
            .filter_map(|&i| i.checked_sub(removed))
            .collect();
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Sheet {
        Sheet::from_data(vec![
            vec!["banner", "", ""],
            vec!["이름", "학년", "비고"],
            vec!["김", "1", ""],
            vec!["", "", ""],
            vec!["이", "2", "취소"],
        ])
    }

    #[test]
    fn test_promote_row_to_header() {
        let mut sheet = roster();
        sheet.drain_leading_rows(1);
        sheet.promote_row_to_header(0).unwrap();

        assert_eq!(
            sheet.column_names().unwrap(),
            &vec!["이름".to_string(), "학년".to_string(), "비고".to_string()]
        );
        assert_eq!(sheet.row_count(), 3);
        let grade = sheet.column_index("학년").unwrap();
        assert_eq!(sheet.get(0, grade).unwrap().as_str(), "1");
    }

    #[test]
    fn test_promote_pads_short_rows() {
        let mut sheet = Sheet::from_data(vec![
            vec![CellValue::from("a"), CellValue::from("b"), CellValue::from("c")],
            vec![CellValue::from("1")],
        ]);
        sheet.promote_row_to_header(0).unwrap();
        assert_eq!(sheet.row(0).unwrap().len(), 3);
        assert!(sheet.get(0, 2).unwrap().is_null());
    }

    #[test]
    fn test_remove_empty_rows() {
        let mut sheet = roster();
        let removed = sheet.remove_empty_rows();
        assert_eq!(removed, 1);
        assert_eq!(sheet.row_count(), 4);
    }

    #[test]
    fn test_partition_rows_keeps_order_and_names() {
        let mut sheet = roster();
        sheet.drain_leading_rows(1);
        sheet.promote_row_to_header(0).unwrap();
        sheet.remove_empty_rows();

        let (cancelled, active) =
            sheet.partition_rows(|row| row.iter().any(|c| c.as_str().contains("취소")));
        assert_eq!(cancelled.row_count(), 1);
        assert_eq!(active.row_count(), 1);
        assert_eq!(cancelled.column_names(), sheet.column_names());
        assert_eq!(active.get(0, 0).unwrap().as_str(), "김");
    }

    #[test]
    fn test_upsert_column_appends_then_overwrites() {
        let mut sheet = Sheet::with_columns("t", vec!["a".to_string()]);
        sheet.row_append(vec![1]);
        sheet.row_append(vec![2]);

        let idx = sheet
            .upsert_column("b", vec![CellValue::from("x"), CellValue::from("y")])
            .unwrap();
        assert_eq!(idx, 1);
        assert_eq!(sheet.col_count(), 2);

        let idx = sheet
            .upsert_column("a", vec![CellValue::Int(9), CellValue::Int(8)])
            .unwrap();
        assert_eq!(idx, 0);
        assert_eq!(sheet.get(1, 0).unwrap(), &CellValue::Int(8));

        let err = sheet.upsert_column("c", vec![CellValue::Null]);
        assert!(matches!(err, Err(SheetError::LengthMismatch { .. })));
    }

    #[test]
    fn test_sort_rows_by_is_stable() {
        let mut sheet = Sheet::from_data(vec![vec![1, 1], vec![0, 2], vec![1, 3], vec![0, 4]]);
        sheet.sort_rows_by(|a, b| a[0].as_str().cmp(&b[0].as_str()));
        let order: Vec<String> = sheet.rows().map(|r| r[1].as_str()).collect();
        assert_eq!(order, vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn test_append_rows_pads_and_strikes() {
        let mut sheet = Sheet::with_columns("t", vec!["a".into(), "b".into(), "c".into()]);
        sheet.row_append(vec!["x", "y", "z"]);
        let other = Sheet::from_data(vec![vec!["p"]]);

        let start = sheet.append_rows(&other);
        assert_eq!(start, 1);
        assert_eq!(sheet.row(1).unwrap().len(), 3);

        sheet.strike_row(1).unwrap();
        assert!(sheet.is_struck(1));
        assert!(!sheet.is_struck(0));
        assert!(sheet.strike_row(5).is_err());
    }

    #[test]
    fn test_drain_leading_rows_shifts_struck_rows() {
        let mut sheet = Sheet::from_data(vec![vec![1], vec![2], vec![3]]);
        sheet.strike_row(2).unwrap();
        let drained = sheet.drain_leading_rows(2);
        assert_eq!(drained.len(), 2);
        assert!(sheet.is_struck(0));
    }
}
