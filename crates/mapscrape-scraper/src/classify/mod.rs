//! Heuristic field classification.
//!
//! Pure functions that decide whether loosely-typed card text is a phone
//! number, an address, a rating, or a price. No browser access happens here.

mod address;
mod lines;
mod phone;
mod rating;

use std::sync::LazyLock;

use regex::Regex;

pub use address::{address_from_label, classify_address, is_address, AddressVariant};
pub use lines::{scan_lines, LineScan};
pub use phone::{classify_phone, is_phone, phone_from_href, phone_from_label};
pub use rating::classify_rating;

/// Display form of a rating with its review count, e.g. `4,8(142)`.
static RATING_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+[,.]\d+\(\d+\)").expect("valid regex"));

fn count_digits(text: &str) -> usize {
    text.chars().filter(char::is_ascii_digit).count()
}

/// `true` when `text` carries a currency sign or a price word.
#[must_use]
pub fn looks_like_price(text: &str) -> bool {
    let lower = text.to_lowercase();
    ['₺', '$', '€', '£'].iter().any(|sign| text.contains(*sign))
        || text.contains("TL")
        || lower.contains("price")
}
