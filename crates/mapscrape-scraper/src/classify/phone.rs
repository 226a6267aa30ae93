use std::sync::LazyLock;

use regex::{Regex, RegexSet};

use super::count_digits;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 11;

/// Accepted phone shapes: area code in parentheses, trunk `0`, mobile
/// `5xx`/`05xx`, `+90`/`90` prefixes, dash and dot separators, bare groups.
pub(super) const PHONE_SHAPES: &[&str] = &[
    r"\(\d{3,4}\)\s*\d{3,4}\s*\d{2,4}",
    r"0\d{3,4}\s*\d{3,4}\s*\d{2,4}",
    r"05\d{2}\s*\d{3}\s*\d{2}\s*\d{2}",
    r"5\d{2}\s*\d{3}\s*\d{2}\s*\d{2}",
    r"\+90\s*\d{3,4}\s*\d{3,4}\s*\d{2,4}",
    r"90\s*\d{3,4}\s*\d{3,4}\s*\d{2,4}",
    r"\d{3,4}-\d{3,4}-\d{2,4}",
    r"\d{3,4}\.\d{3,4}\.\d{2,4}",
    r"\d{3,4}\s*\d{3,4}\s*\d{2,4}",
    r"\d{3,4}\s*\d{3,4}",
];

static PHONE_SET: LazyLock<RegexSet> =
    LazyLock::new(|| RegexSet::new(PHONE_SHAPES).expect("valid regex"));

static PHONE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:telefon|phone):\s*([0-9\s()+\-.]+)").expect("valid regex")
});

/// `true` when `text` has 7 to 11 digits and matches a known phone shape.
#[must_use]
pub fn is_phone(text: &str) -> bool {
    let digits = count_digits(text);
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) && PHONE_SET.is_match(text)
}

/// The trimmed input when it is a phone number.
#[must_use]
pub fn classify_phone(text: &str) -> Option<String> {
    let trimmed = text.trim();
    is_phone(trimmed).then(|| trimmed.to_owned())
}

/// Number portion of an accessible label such as `Telefon: 0212 123 45 67`.
#[must_use]
pub fn phone_from_label(label: &str) -> Option<String> {
    let captured = PHONE_LABEL.captures(label)?.get(1)?.as_str().trim();
    (!captured.is_empty()).then(|| captured.to_owned())
}

/// Number portion of a `tel:` link.
#[must_use]
pub fn phone_from_href(href: &str) -> Option<String> {
    let number = href.trim().strip_prefix("tel:")?.trim();
    (!number.is_empty()).then(|| number.to_owned())
}
