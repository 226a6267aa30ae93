use std::sync::LazyLock;

use regex::{Regex, RegexSet};

/// How strict the address check is.
///
/// `Loose` is used for free text scanned out of a whole card. `Strict` is used
/// for text read from dedicated address elements and detail labels, which
/// routinely carry review snippets and button captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressVariant {
    Loose,
    Strict,
}

const BASE_KEYWORDS: &[&str] = &[
    "sokak", "sk", "cadde", "cd", "bulvar", "blv", "mahalle", "mah", "no:", "no ", "apt", "daire",
    "kat", "sok", "cad", "street", "st.", "avenue", "ave", "road", "rd.", "boulevard", "blvd",
    "floor", "suite", "block", "blok",
];

const LOOSE_KEYWORDS: &[&str] = &["taksi", "durak", "durağı", "merkez", "plaza", "avm", "center"];

const STRICT_KEYWORDS: &[&str] = &[
    "profesör",
    "doktor",
    "caddesi",
    "mimoza",
    "meşrutiyet",
    "paşa",
    "atif",
    "yılmaz",
    "yüzyıl",
    "galericiler",
];

const NOISE_PHRASES: &[&str] = &[
    "Web sitesi",
    "Website",
    "Yol tarifi",
    "Directions",
    "Şoförleri",
    "Deneyimli",
    "Günün",
    "Taksi durağı",
];

static COMMON_REJECTS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([r"^\d+[,.]\d+\(\d+\)", r"^\d+$"]).expect("valid regex")
});

static SHORT_ALPHA_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]{1,10}$").expect("valid regex"));

static SHORT_ALPHA_STRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]{1,20}$").expect("valid regex"));

static PHONE_LIKE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([r"\(0\d{3,4}\)", r"0\d{3,4}\s*\d{3,4}"]).expect("valid regex")
});

static ADDRESS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:adres|address):\s*(.+)").expect("valid regex"));

impl AddressVariant {
    fn min_length(self) -> usize {
        match self {
            Self::Loose => 10,
            Self::Strict => 20,
        }
    }

    fn extra_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Loose => LOOSE_KEYWORDS,
            Self::Strict => STRICT_KEYWORDS,
        }
    }

    fn is_short_fragment(self, text: &str) -> bool {
        match self {
            Self::Loose => SHORT_ALPHA_LOOSE.is_match(text),
            Self::Strict => SHORT_ALPHA_STRICT.is_match(text),
        }
    }
}

/// `true` when `text` plausibly is a street address.
#[must_use]
pub fn is_address(text: &str, variant: AddressVariant) -> bool {
    let text = text.trim();
    if text.is_empty() || COMMON_REJECTS.is_match(text) || variant.is_short_fragment(text) {
        return false;
    }
    if variant == AddressVariant::Strict
        && (PHONE_LIKE.is_match(text) || NOISE_PHRASES.iter().any(|p| text.contains(p)))
    {
        return false;
    }

    let lower = text.to_lowercase();
    let has_keyword = BASE_KEYWORDS
        .iter()
        .chain(variant.extra_keywords())
        .any(|keyword| lower.contains(keyword));

    has_keyword || text.chars().count() > variant.min_length()
}

/// The trimmed input when it is an address.
#[must_use]
pub fn classify_address(text: &str, variant: AddressVariant) -> Option<String> {
    let trimmed = text.trim();
    is_address(trimmed, variant).then(|| trimmed.to_owned())
}

/// Address portion of an accessible label such as `Adres: Bağdat Cd. No:5`.
#[must_use]
pub fn address_from_label(label: &str) -> Option<String> {
    let captured = ADDRESS_LABEL.captures(label)?.get(1)?.as_str().trim();
    (!captured.is_empty()).then(|| captured.to_owned())
}
