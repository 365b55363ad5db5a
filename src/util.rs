//! Shared utility functions

use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Truncate a string to a maximum length, appending "..." if truncated.
/// Handles multi-byte characters by finding a valid char boundary.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let suffix = "...";
    let target = max_len.saturating_sub(suffix.len());
    // Find a valid char boundary at or before target
    let mut end = target;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{}", &s[..end], suffix)
}

/// Collapse all whitespace runs (including newlines and the `<br />` tags
/// common in scraped reviews) to single spaces, then truncate
pub fn truncate_for_display(s: &str, max_len: usize) -> String {
    let flattened = s.replace("<br />", " ").replace("<br/>", " ");
    let collapsed = flattened.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_str(&collapsed, max_len)
}

/// Delay requested by a `Retry-After: <seconds>` header, in milliseconds
pub(crate) fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| secs.saturating_mul(1000))
}
