//! Last-resort parsing of a card's full text, line by line.

use std::sync::LazyLock;

use regex::{Regex, RegexSet};

use super::address::{is_address, AddressVariant};
use super::phone::{is_phone, PHONE_SHAPES};
use super::{count_digits, RATING_SHAPE};

const MIN_SCANNED_PHONE_DIGITS: usize = 9;
const MARKER_LINE_MIN_CHARS: usize = 15;
const LONGEST_LINE_MIN_CHARS: usize = 20;

const STREET_MARKERS: &[&str] = &[
    "Mah", "Cad", "Sok", "No:", "Blok", "Kat", "Daire", "Sk.", "Cd.", "Apt.", "Sitesi", "Street",
    "St.", "Ave", "Road", "Rd.", "Blvd", "Suite", "Floor",
];

static PHONE_SCANNERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PHONE_SHAPES
        .iter()
        .copied()
        .chain([r"\b\d{10}\b", r"\b\d{9}\b"])
        .map(|pattern| Regex::new(pattern).expect("valid regex"))
        .collect()
});

static PHONE_LINE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"\(\d{3,4}\)\s*\d{3,4}\s*\d{2,4}",
        r"\d{3,4}\s*\d{3,4}\s*\d{2,4}",
        r"\+90\s*\d{3,4}\s*\d{3,4}\s*\d{2,4}",
    ])
    .expect("valid regex")
});

/// Fields recovered from a card's combined text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineScan {
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: Option<String>,
}

/// Scans `text` for a phone number, a rating and an address.
///
/// Lines equal to `name` never count as an address.
#[must_use]
pub fn scan_lines(text: &str, name: &str) -> LineScan {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != name.trim())
        .collect();

    LineScan {
        phone: best_phone(text),
        address: marker_line(&lines).or_else(|| longest_line(&lines)),
        rating: RATING_SHAPE.find(text).map(|m| m.as_str().to_owned()),
    }
}

fn best_phone(text: &str) -> Option<String> {
    let mut best: Option<&str> = None;
    for scanner in PHONE_SCANNERS.iter() {
        for found in scanner.find_iter(text) {
            let candidate = found.as_str().trim();
            if count_digits(candidate) < MIN_SCANNED_PHONE_DIGITS || !is_phone(candidate) {
                continue;
            }
            if best.is_none_or(|current| candidate.len() > current.len()) {
                best = Some(candidate);
            }
        }
    }
    best.map(str::to_owned)
}

fn marker_line(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .find(|line| {
            !RATING_SHAPE.is_match(line)
                && line.chars().count() > MARKER_LINE_MIN_CHARS
                && STREET_MARKERS.iter().any(|marker| line.contains(marker))
                && is_address(line, AddressVariant::Loose)
        })
        .map(|line| (*line).to_owned())
}

fn longest_line(lines: &[&str]) -> Option<String> {
    let longest = lines
        .iter()
        .filter(|line| !RATING_SHAPE.is_match(line))
        .max_by_key(|line| line.chars().count())?;
    let accepted = longest.chars().count() > LONGEST_LINE_MIN_CHARS
        && !PHONE_LINE.is_match(longest)
        && is_address(longest, AddressVariant::Loose);
    accepted.then(|| (*longest).to_owned())
}
