use crate::metadata::SheetMetadata;
use rollbook_sheet::MAX_SHEET_NAME_LEN;

const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const ELLIPSIS: &str = "...";

/// Make a string safe to use as a worksheet name.
///
/// Forbidden characters become `_`, overlong names are cut to 28 characters
/// plus `...`, and blank names become `Sheet`.
///
/// ```
/// use rollbook_merge::clean_sheet_name;
///
/// assert_eq!(clean_sheet_name("A[B]:C"), "A_B__C");
/// assert_eq!(clean_sheet_name("  "), "Sheet");
/// ```
#[must_use]
pub fn clean_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();

    if cleaned.trim().is_empty() {
        return "Sheet".to_string();
    }
    if cleaned.chars().count() > MAX_SHEET_NAME_LEN {
        let keep = MAX_SHEET_NAME_LEN - ELLIPSIS.len();
        let head: String = cleaned.chars().take(keep).collect();
        return format!("{head}{ELLIPSIS}");
    }
    cleaned
}

/// `title[_date[_time]]`, cleaned
#[must_use]
pub fn base_sheet_name(meta: &SheetMetadata) -> String {
    let mut name = meta.title.clone();
    if let Some(date) = &meta.date_token {
        name.push('_');
        name.push_str(date);
        if let Some(time) = &meta.time_token {
            name.push('_');
            name.push_str(time);
        }
    }
    clean_sheet_name(&name)
}
