use crate::report::SkipReason;
use rollbook_sheet::{CellValue, Sheet};

/// Banner and spacer rows above the header.
const LEADING_ROWS: usize = 2;

/// A roster split into live and cancelled rows.
#[derive(Debug, Clone)]
pub struct NormalizedSheet {
    pub active: Sheet,
    pub cancelled: Sheet,
}

/// Whether any cell of the row mentions the cancellation marker
#[must_use]
pub fn is_cancelled(row: &[CellValue], marker: &str) -> bool {
    row.iter()
        .any(|cell| !cell.is_null() && cell.as_str().contains(marker))
}

/// Strip the banner rows, promote the header and split cancelled rows out.
///
/// # Errors
///
/// Returns [`SkipReason::TooFewRows`] when the sheet cannot hold a header and
/// [`SkipReason::NoData`] when no data rows remain.
pub fn normalize(raw: &Sheet, cancel_marker: &str) -> Result<NormalizedSheet, SkipReason> {
    if raw.row_count() <= LEADING_ROWS {
        return Err(SkipReason::TooFewRows);
    }

    let mut sheet = raw.clone();
    sheet.drain_leading_rows(LEADING_ROWS);
    sheet
        .promote_row_to_header(0)
        .map_err(|_| SkipReason::TooFewRows)?;
    sheet.remove_empty_rows();
    if sheet.is_empty() {
        return Err(SkipReason::NoData);
    }

    let (cancelled, active) = sheet.partition_rows(|row| is_cancelled(row, cancel_marker));
    Ok(NormalizedSheet { active, cancelled })
}
