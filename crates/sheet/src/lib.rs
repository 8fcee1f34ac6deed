//! Sheet/Book module for rollbook
//!
//! Provides the in-memory grid types the merge pipeline works on, plus XLSX
//! reading (via calamine, with fallbacks for legacy and damaged files) and
//! writing (via rust_xlsxwriter, with per-row strikethrough styling).
//!
//! # Examples
//!
//! ## Promoting a header row
//!
//! ```
//! use rollbook_sheet::Sheet;
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["이름", "학년"],
//!     vec!["김민수", "1"],
//! ]);
//!
//! sheet.promote_row_to_header(0).unwrap();
//! assert_eq!(sheet.row_count(), 1);
//! assert_eq!(sheet.column_by_name("학년").unwrap()[0].as_str(), "1");
//! ```
//!
//! ## Marking rows struck through
//!
//! ```
//! use rollbook_sheet::{Book, Sheet};
//!
//! let mut sheet = Sheet::with_columns("roster", vec!["이름".to_string()]);
//! sheet.row_append(vec!["김민수"]);
//! sheet.row_append(vec!["이서연 (취소)"]);
//! sheet.strike_row(1).unwrap();
//!
//! let mut book = Book::new();
//! book.add_sheet("roster", sheet).unwrap();
//! assert!(book.get_sheet("roster").unwrap().is_struck(1));
//! ```

mod book;
mod cell;
mod error;
mod sheet;
mod xlsx;

/// Re-export book types.
pub use book::{Book, MAX_SHEET_NAME_LEN};
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
/// Re-export XLSX write report.
pub use xlsx::XlsxWriteReport;
