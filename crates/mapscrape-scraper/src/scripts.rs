//! In-page scripts used by the pagination controller.
//!
//! Selector patterns are embedded as JSON string literals so quoting inside
//! patterns like `[role='feed']` cannot break the generated code.

fn js_list(patterns: &[String]) -> String {
    serde_json::to_string(patterns).unwrap_or_else(|_| "[]".to_owned())
}

/// Scrolls the first element matching any of `patterns` to its bottom.
/// Evaluates to `true` when an element was found.
#[must_use]
pub fn scroll_first_match_to_end(patterns: &[String]) -> String {
    format!(
        "(() => {{ for (const sel of {list}) {{ const el = document.querySelector(sel); \
         if (el) {{ el.scrollTop = el.scrollHeight; return true; }} }} return false; }})()",
        list = js_list(patterns)
    )
}

/// Scrolls the window `extra_px` past the current document height.
#[must_use]
pub fn scroll_window_past_end(extra_px: u32) -> String {
    format!("(() => {{ window.scrollTo(0, document.body.scrollHeight + {extra_px}); return true; }})()")
}

/// Reads the height proxy: the feed container's `scrollHeight` when present,
/// otherwise the document body's.
#[must_use]
pub fn height_probe(feed_patterns: &[String]) -> String {
    format!(
        "(() => {{ for (const sel of {list}) {{ const el = document.querySelector(sel); \
         if (el) {{ return el.scrollHeight; }} }} return document.body.scrollHeight; }})()",
        list = js_list(feed_patterns)
    )
}
