use regex::Regex;
use rollbook_sheet::{CellValue, Sheet};

/// Session descriptors read from a roster's banner row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetMetadata {
    pub title: String,
    /// `MM-DD`
    pub date_token: Option<String>,
    /// `HH-MM`
    pub time_token: Option<String>,
}

impl SheetMetadata {
    /// Grouping key for the date level of the consolidator
    #[must_use]
    pub fn date_key(&self) -> &str {
        self.date_token.as_deref().unwrap_or("no_date")
    }
}

fn hangul_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[가-힣]").expect("valid regex"))
}

fn iso_date_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}-(\d{1,2})-(\d{1,2})").expect("valid regex"))
}

fn numeric_date_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})[-/.](\d{1,2})").expect("valid regex"))
}

fn korean_date_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})월\s*(\d{1,2})일").expect("valid regex"))
}

fn time_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("valid regex"))
}

fn is_title(text: &str) -> bool {
    text.chars().count() > 2 && hangul_regex().is_match(text)
}

fn pad2(digits: &str) -> String {
    format!("{digits:0>2}")
}

fn date_token(text: &str) -> Option<String> {
    // Date cells arrive as `YYYY-MM-DD`; the year is dropped.
    let caps = iso_date_regex()
        .captures(text)
        .or_else(|| numeric_date_regex().captures(text))
        .or_else(|| korean_date_regex().captures(text))?;
    Some(format!("{}-{}", pad2(&caps[1]), pad2(&caps[2])))
}

fn time_token(text: &str) -> Option<String> {
    let caps = time_regex().captures(text)?;
    Some(format!("{}-{}", pad2(&caps[1]), &caps[2]))
}

/// Read title, date and time from row 0 of a raw sheet.
///
/// Returns `None` when no cell qualifies as a title.
#[must_use]
pub fn extract_metadata(raw: &Sheet) -> Option<SheetMetadata> {
    let first_row = raw.data().first()?;

    let mut title = None;
    let mut date = None;
    let mut time = None;
    for text in first_row
        .iter()
        .filter(|c| !c.is_blank())
        .map(CellValue::as_str)
    {
        let text = text.trim();
        if title.is_none() && is_title(text) {
            title = Some(text.to_string());
        }
        if date.is_none() {
            date = date_token(text);
        }
        if time.is_none() {
            time = time_token(text);
        }
    }

    Some(SheetMetadata {
        title: title?,
        date_token: date,
        time_token: time,
    })
}
