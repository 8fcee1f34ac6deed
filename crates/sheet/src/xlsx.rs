use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{
    open_workbook, open_workbook_auto, open_workbook_auto_from_rs, Data, ExcelDateTime, Range,
    Reader, Xlsx, XlsxError,
};
use chrono::{NaiveTime, Timelike};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Outcome of writing a book: sheets that made it into the file, and sheets
/// the writer refused (for example because of an invalid name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XlsxWriteReport {
    pub written: Vec<String>,
    pub rejected: Vec<(String, String)>,
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => datetime_to_cell_value(dt),
        Data::DateTimeIso(s) => CellValue::String(s.clone()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Render a date or time cell as ISO text: `HH:MM` for a bare time,
/// `YYYY-MM-DD` for a bare date, both for a timestamp. Durations and
/// serials outside chrono's range stay numeric.
fn datetime_to_cell_value(dt: &ExcelDateTime) -> CellValue {
    let serial = dt.as_f64();
    if dt.is_duration() {
        return CellValue::Float(serial);
    }
    let Some(when) = dt.as_datetime() else {
        return CellValue::Float(serial);
    };

    let time_format = if when.second() == 0 { "%H:%M" } else { "%H:%M:%S" };
    let text = if serial < 1.0 {
        when.format(time_format).to_string()
    } else if when.time() == NaiveTime::MIN {
        when.format("%Y-%m-%d").to_string()
    } else {
        format!("{} {}", when.format("%Y-%m-%d"), when.format(time_format))
    };
    CellValue::String(text)
}

/// Convert a calamine range into a sheet, keeping leading blank rows and
/// columns so row positions match what a spreadsheet user sees.
fn range_to_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    let width = col_offset as usize + range.width();

    let mut data: Vec<Vec<CellValue>> = Vec::with_capacity(row_offset as usize + range.height());
    for _ in 0..row_offset {
        data.push(vec![CellValue::Null; width]);
    }
    for row in range.rows() {
        let mut row_data = vec![CellValue::Null; col_offset as usize];
        row_data.extend(row.iter().map(data_to_cell_value));
        data.push(row_data);
    }

    let mut sheet = Sheet::with_name(name);
    *sheet.data_mut() = data;
    sheet
}

/// Read every sheet of an already-opened workbook
fn collect_sheets<RS, R>(workbook: &mut R) -> std::result::Result<Book, String>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut book = Book::new();

    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| format!("sheet '{sheet_name}': {e}"))?;
        let sheet = range_to_sheet(&sheet_name, &range);
        book.add_sheet(&sheet_name, sheet).map_err(|e| e.to_string())?;
    }

    Ok(book)
}

fn read_typed_xlsx(path: &Path) -> std::result::Result<Book, String> {
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e: XlsxError| e.to_string())?;
    collect_sheets(&mut workbook)
}

fn read_auto(path: &Path) -> std::result::Result<Book, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| e.to_string())?;
    collect_sheets(&mut workbook)
}

/// Last resort: copy the bytes into memory and open them from a cursor.
/// Only raw cell values are read.
fn read_from_memory(path: &Path) -> std::result::Result<Book, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    collect_sheets(&mut workbook)
}

impl Book {
    /// Load a book from an Excel file (all sheets, no headers applied).
    ///
    /// Tries the XLSX reader first, then format auto-detection (which also
    /// covers legacy `.xls`), then an in-memory read. Each fallback is logged.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::Read`] with the last failure if every attempt
    /// fails, and [`SheetError::EmptyWorkbook`] if the file has no sheets.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));

        type Attempt = fn(&Path) -> std::result::Result<Book, String>;
        let mut attempts: Vec<(&str, Attempt)> = Vec::with_capacity(3);
        if is_xlsx {
            attempts.push(("xlsx", read_typed_xlsx));
        }
        attempts.push(("auto", read_auto));
        attempts.push(("in-memory", read_from_memory));

        let mut last_error = String::new();
        for (label, attempt) in attempts {
            match attempt(path) {
                Ok(mut book) => {
                    if book.is_empty() {
                        return Err(SheetError::EmptyWorkbook { path: shown });
                    }
                    let file_name = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or_default();
                    book.set_name(file_name);
                    return Ok(book);
                }
                Err(e) => {
                    tracing::warn!("{} reader failed for {}: {}", label, shown, e);
                    last_error = e;
                }
            }
        }

        Err(SheetError::Read {
            path: shown,
            message: last_error,
        })
    }

    /// Save the book to an Excel file.
    ///
    /// Named sheets get their column names as a bold header row. Rows marked
    /// with [`Sheet::strike_row`] are written with a strikethrough font across
    /// the full sheet width. A sheet the writer rejects is reported and left
    /// out; the rest of the book is still written.
    ///
    /// # Errors
    ///
    /// Returns error if no sheet could be written or the file cannot be saved.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<XlsxWriteReport> {
        let mut workbook = Workbook::new();
        let mut report = XlsxWriteReport::default();

        for (name, sheet) in self.sheets() {
            let mut worksheet = Worksheet::new();
            if let Err(e) = worksheet.set_name(name) {
                tracing::warn!("Sheet '{}' rejected by writer: {}", name, e);
                report.rejected.push((name.to_string(), e.to_string()));
                continue;
            }

            match write_to_worksheet(sheet, &mut worksheet) {
                Ok(()) => {
                    workbook.push_worksheet(worksheet);
                    report.written.push(name.to_string());
                }
                Err(e) => {
                    tracing::warn!("Sheet '{}' could not be written: {}", name, e);
                    report.rejected.push((name.to_string(), e.to_string()));
                }
            }
        }

        if report.written.is_empty() {
            return Err(SheetError::Write("no sheet could be written".to_string()));
        }

        workbook.save(path.as_ref())?;

        Ok(report)
    }
}

/// Write sheet data to a worksheet
fn write_to_worksheet(sheet: &Sheet, worksheet: &mut Worksheet) -> Result<()> {
    let header_format = Format::new().set_bold();
    let struck_format = Format::new().set_font_strikethrough();

    let mut row_offset: u32 = 0;
    if let Some(names) = sheet.column_names() {
        for (col_idx, name) in names.iter().enumerate() {
            worksheet.write_string_with_format(0, column_number(col_idx)?, name, &header_format)?;
        }
        row_offset = 1;
    }

    let width = sheet.col_count();
    for (row_idx, row) in sheet.data().iter().enumerate() {
        let row_num = u32::try_from(row_idx)
            .ok()
            .and_then(|r| r.checked_add(row_offset))
            .ok_or_else(|| SheetError::Write("Row index overflow".to_string()))?;

        if sheet.is_struck(row_idx) {
            for col_idx in 0..width.max(row.len()) {
                let cell = row.get(col_idx).unwrap_or(&CellValue::Null);
                write_cell(worksheet, row_num, column_number(col_idx)?, cell, Some(&struck_format))?;
            }
        } else {
            for (col_idx, cell) in row.iter().enumerate() {
                write_cell(worksheet, row_num, column_number(col_idx)?, cell, None)?;
            }
        }
    }

    Ok(())
}

fn column_number(col_idx: usize) -> Result<u16> {
    u16::try_from(col_idx).map_err(|_| SheetError::Write("Column index overflow".to_string()))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: Option<&Format>,
) -> Result<()> {
    match (cell, format) {
        (CellValue::Null, None) => {}
        (CellValue::Null, Some(fmt)) => {
            worksheet.write_blank(row, col, fmt)?;
        }
        (CellValue::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        (CellValue::Bool(b), Some(fmt)) => {
            worksheet.write_boolean_with_format(row, col, *b, fmt)?;
        }
        // Note: Excel stores all numbers as f64, so integers > 2^53 may lose precision
        (CellValue::Int(i), None) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        (CellValue::Int(i), Some(fmt)) => {
            worksheet.write_number_with_format(row, col, *i as f64, fmt)?;
        }
        (CellValue::Float(f), None) => {
            worksheet.write_number(row, col, *f)?;
        }
        (CellValue::Float(f), Some(fmt)) => {
            worksheet.write_number_with_format(row, col, *f, fmt)?;
        }
        (CellValue::String(s), None) => {
            worksheet.write_string(row, col, s)?;
        }
        (CellValue::String(s), Some(fmt)) => {
            worksheet.write_string_with_format(row, col, s, fmt)?;
        }
    }
    Ok(())
}
