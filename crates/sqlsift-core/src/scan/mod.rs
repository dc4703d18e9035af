//! Paren-depth-aware clause scanning.

mod scanner;

pub use scanner::{ClauseScanner, KeywordMatch};

/// The leading (possibly dotted) identifier of a fragment, if any.
pub(crate) fn leading_identifier(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let end = s
        .find(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
        .unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some(&s[..end])
    }
}
