use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Builds the default output file name for a run:
/// `<query>_<location>_Raporu_<YYYY-MM-DD>.<extension>`.
///
/// Punctuation is dropped and whitespace runs become `_`. An empty location
/// is written as `Genel`.
#[must_use]
pub fn report_filename(query: &str, location: &str, date: NaiveDate, extension: &str) -> String {
    let query = slug_part(query);
    let location = match slug_part(location) {
        s if s.is_empty() => "Genel".to_string(),
        s => s,
    };
    let query = if query.is_empty() {
        "Isletme".to_string()
    } else {
        query
    };
    format!(
        "{query}_{location}_Raporu_{}.{extension}",
        date.format("%Y-%m-%d")
    )
}

fn slug_part(raw: &str) -> String {
    let cleaned = NON_WORD_RE.replace_all(raw, "");
    WHITESPACE_RE
        .replace_all(cleaned.trim(), "_")
        .into_owned()
}
