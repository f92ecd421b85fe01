//! `Link` header pagination

use once_cell::sync::Lazy;
use regex::Regex;

static LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel="([^"]+)""#).expect("valid link regex")
});

/// Extracts the `rel="next"` URL from a `Link` header value
pub fn next_link(header: &str) -> Option<String> {
    LINK_RE
        .captures_iter(header)
        .find(|caps| caps[2].split_whitespace().any(|rel| rel == "next"))
        .map(|caps| caps[1].to_string())
}
