use super::RATING_SHAPE;

const STAR_WORDS: &[&str] = &["star", "yıldız", "yildiz"];

/// Rating display text from an element's text and accessible label.
///
/// A label naming stars wins over the text. Otherwise the text must carry a
/// `4,8(142)`-style rating with review count.
#[must_use]
pub fn classify_rating(text: &str, aria_label: Option<&str>) -> Option<String> {
    if let Some(label) = aria_label.map(str::trim).filter(|l| !l.is_empty()) {
        let lower = label.to_lowercase();
        if STAR_WORDS.iter().any(|word| lower.contains(word)) {
            return Some(label.to_owned());
        }
    }

    let text = text.trim();
    RATING_SHAPE.is_match(text).then(|| text.to_owned())
}
