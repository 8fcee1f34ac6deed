//! Enrichment of active roster rows: status rewrite, ordering, composite
//! student id and the lookup join.

use crate::columns::{
    resolve_column, ColumnAlias, CLASS, COMPOSITE_ID, GRADE, NUMBER, REGION, SCHOOL_CATEGORY,
    SCHOOL_NAME, STATUS,
};
use crate::lookup::LookupTable;
use crate::options::MergeOptions;
use regex::Regex;
use rollbook_sheet::{CellValue, Sheet};
use std::cmp::Ordering;

/// Sort keys in priority order; `true` means descending.
const SORT_KEYS: &[(ColumnAlias, bool)] = &[
    (STATUS, true),
    (REGION, false),
    (SCHOOL_CATEGORY, true),
    (SCHOOL_NAME, false),
    (GRADE, false),
    (CLASS, false),
    (NUMBER, false),
];

/// Run every enrichment step over the active rows of a roster.
///
/// # Errors
///
/// Returns error if a derived column cannot be written.
pub fn enrich(
    active: &mut Sheet,
    title: &str,
    lookup: Option<&LookupTable>,
    options: &MergeOptions,
) -> rollbook_sheet::Result<()> {
    rewrite_status(active, options)?;
    sort_rows(active);
    add_composite_id(active)?;
    join_lookup(active, title, lookup)?;
    Ok(())
}

/// Rewrite waiting-list statuses such as `대기3` to `Applied (대기3)`.
///
/// # Errors
///
/// Returns error if the status column cannot be rewritten.
pub fn rewrite_status(sheet: &mut Sheet, options: &MergeOptions) -> rollbook_sheet::Result<()> {
    let Some(col) = resolve_column(sheet, &STATUS) else {
        return Ok(());
    };
    let marker = options.waiting_marker.as_str();
    let Ok(waiting) = Regex::new(&format!(r"{}(\d+)", regex::escape(marker))) else {
        return Ok(());
    };
    let applied = options.applied_label.as_str();

    sheet.column_map(col, |cell| {
        if cell.is_null() {
            return cell.clone();
        }
        match waiting.captures(&cell.as_str()) {
            Some(caps) => CellValue::String(format!("{applied} ({marker}{})", &caps[1])),
            None => cell.clone(),
        }
    })
}

/// Compare two cells for sorting. Blanks always sort last.
fn compare_cells(a: &CellValue, b: &CellValue, descending: bool) -> Ordering {
    match (a.is_blank(), b.is_blank()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ordering = match (a.is_number(), b.is_number()) {
        (true, true) => {
            let (x, y) = (a.as_float().unwrap_or(0.0), b.as_float().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.as_str().cmp(&b.as_str()),
    };

    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Stable multi-key sort over whichever key columns are present
pub fn sort_rows(sheet: &mut Sheet) {
    let keys: Vec<(usize, bool)> = SORT_KEYS
        .iter()
        .filter_map(|(alias, desc)| resolve_column(sheet, alias).map(|col| (col, *desc)))
        .collect();
    if keys.is_empty() {
        return;
    }

    let null = CellValue::Null;
    sheet.sort_rows_by(|a, b| {
        keys.iter()
            .map(|&(col, desc)| {
                compare_cells(
                    a.get(col).unwrap_or(&null),
                    b.get(col).unwrap_or(&null),
                    desc,
                )
            })
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Add or overwrite the `학년-반-번호` column.
///
/// # Errors
///
/// Returns error if the column cannot be written.
pub fn add_composite_id(sheet: &mut Sheet) -> rollbook_sheet::Result<()> {
    let (Some(grade), Some(class), Some(number)) = (
        resolve_column(sheet, &GRADE),
        resolve_column(sheet, &CLASS),
        resolve_column(sheet, &NUMBER),
    ) else {
        return Ok(());
    };

    let null = CellValue::Null;
    let values: Vec<CellValue> = sheet
        .rows()
        .map(|row| {
            let parts: Vec<&CellValue> = [grade, class, number]
                .iter()
                .map(|&c| row.get(c).unwrap_or(&null))
                .collect();
            if parts.iter().any(|c| c.is_blank()) {
                CellValue::String(String::new())
            } else {
                let parts: Vec<String> = parts.iter().map(|c| c.as_str().trim().to_string()).collect();
                CellValue::String(parts.join("-"))
            }
        })
        .collect();

    sheet.upsert_column(COMPOSITE_ID, values)?;
    Ok(())
}

/// Append the lookup columns, filled from the lookup row matching `title`.
///
/// # Errors
///
/// Returns error if a column cannot be written.
pub fn join_lookup(
    sheet: &mut Sheet,
    title: &str,
    lookup: Option<&LookupTable>,
) -> rollbook_sheet::Result<()> {
    let values = match lookup {
        Some(table) => table.values_for(title),
        None => LookupTable::empty_values(),
    };

    let rows = sheet.row_count();
    for (target, value) in values {
        sheet.upsert_column(target, vec![CellValue::String(value); rows])?;
    }
    Ok(())
}
