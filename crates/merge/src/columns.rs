//! Column discovery by name alias.
//!
//! Roster and lookup workbooks are hand-made, so column names drift between
//! files ("강사", "주강사", "Instructor"). Every place that needs a column
//! goes through [`resolve_column`] with one of the alias constants below.

use rollbook_sheet::Sheet;

/// Substring rules identifying a column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnAlias {
    /// Any of these substrings qualifies a column
    pub needles: &'static [&'static str],
    /// Any of these substrings disqualifies it
    pub excludes: &'static [&'static str],
    /// Compare lower-cased
    pub case_insensitive: bool,
}

impl ColumnAlias {
    const fn plain(needles: &'static [&'static str]) -> Self {
        Self {
            needles,
            excludes: &[],
            case_insensitive: false,
        }
    }

    /// Whether a column name satisfies this alias
    #[must_use]
    pub fn matches(&self, column_name: &str) -> bool {
        let name = if self.case_insensitive {
            column_name.to_lowercase()
        } else {
            column_name.to_string()
        };
        self.needles.iter().any(|n| name.contains(n))
            && !self.excludes.iter().any(|x| name.contains(x))
    }
}

pub const STATUS: ColumnAlias = ColumnAlias {
    needles: &["상태", "status"],
    excludes: &[],
    case_insensitive: true,
};
pub const REGION: ColumnAlias = ColumnAlias::plain(&["지역"]);
pub const SCHOOL_CATEGORY: ColumnAlias = ColumnAlias::plain(&["학교분류"]);
pub const SCHOOL_NAME: ColumnAlias = ColumnAlias::plain(&["학교명"]);
pub const GRADE: ColumnAlias = ColumnAlias {
    needles: &["학년"],
    excludes: &[COMPOSITE_ID],
    case_insensitive: false,
};
pub const CLASS: ColumnAlias = ColumnAlias {
    needles: &["반"],
    excludes: &["학년"],
    case_insensitive: false,
};
pub const NUMBER: ColumnAlias = ColumnAlias {
    needles: &["번호"],
    excludes: &[COMPOSITE_ID],
    case_insensitive: false,
};

/// Name of the composite grade-class-number column.
pub const COMPOSITE_ID: &str = "학년-반-번호";

/// Columns joined in from the lookup table, with the lookup-side names each
/// one may appear under. Aliases are matched against lower-cased names.
pub const LOOKUP_TARGETS: &[(&str, &[&str])] = &[
    ("수업일", &["수업일", "날짜", "date", "일자"]),
    ("시작", &["시작", "시작시간", "start"]),
    ("종료", &["종료", "종료시간", "end", "끝"]),
    ("주강사", &["주강사", "강사", "instructor", "선생님"]),
    ("보조강사", &["보조강사", "보조", "assistant"]),
    ("장소", &["장소", "위치", "location", "교실"]),
    ("모니터", &["모니터", "monitor", "관리자"]),
];

/// Index of the first column whose name matches `alias`
#[must_use]
pub fn resolve_column(sheet: &Sheet, alias: &ColumnAlias) -> Option<usize> {
    sheet
        .column_names()?
        .iter()
        .position(|name| alias.matches(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with(columns: &[&str]) -> Sheet {
        Sheet::with_columns("t", columns.iter().map(|c| (*c).to_string()).collect())
    }

    #[test]
    fn test_class_excludes_grade() {
        let sheet = sheet_with(&["학년반", "학년", "반", "번호"]);
        assert_eq!(resolve_column(&sheet, &CLASS), Some(2));
        assert_eq!(resolve_column(&sheet, &GRADE), Some(0));
    }

    #[test]
    fn test_composite_column_is_not_a_source() {
        let sheet = sheet_with(&["학년-반-번호", "학년", "반", "번호"]);
        assert_eq!(resolve_column(&sheet, &GRADE), Some(1));
        assert_eq!(resolve_column(&sheet, &CLASS), Some(2));
        assert_eq!(resolve_column(&sheet, &NUMBER), Some(3));
    }

    #[test]
    fn test_status_is_case_insensitive() {
        let sheet = sheet_with(&["이름", "Status"]);
        assert_eq!(resolve_column(&sheet, &STATUS), Some(1));
    }

    #[test]
    fn test_unnamed_sheet_resolves_nothing() {
        let sheet = Sheet::from_data(vec![vec!["상태"]]);
        assert_eq!(resolve_column(&sheet, &STATUS), None);
    }
}
