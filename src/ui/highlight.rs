//! Query highlighting.
//!
//! The query is user input, so it is escaped before it becomes a pattern:
//! `a+b` matches the literal text `a+b`, and an unbalanced `(` cannot make
//! the matcher fail to build.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

fn matcher(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(err) => {
            // Only reachable through size limits on very long queries.
            tracing::warn!(error = %err, "highlight_pattern_rejected");
            None
        }
    }
}

/// Byte ranges of every case-insensitive, non-overlapping occurrence of
/// `query` in `text`.
pub fn highlight_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    match matcher(query) {
        Some(re) => re
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| m.range())
            .collect(),
        None => Vec::new(),
    }
}

/// Wrap every case-insensitive occurrence of `query` in `<mark>` markers.
///
/// An empty query returns `text` unchanged.
pub fn highlight(text: &str, query: &str) -> String {
    let ranges = highlight_ranges(text, query);
    if ranges.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + ranges.len() * 13);
    let mut idx = 0;
    for r in ranges {
        out.push_str(&text[idx..r.start]);
        out.push_str(MARK_OPEN);
        out.push_str(&text[r.clone()]);
        out.push_str(MARK_CLOSE);
        idx = r.end;
    }
    out.push_str(&text[idx..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_identity() {
        assert_eq!(highlight("Hello World", ""), "Hello World");
        assert!(highlight_ranges("Hello", "").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive_and_keeps_original_case() {
        assert_eq!(
            highlight("Hello World", "hello"),
            "<mark>Hello</mark> World"
        );
        assert_eq!(
            highlight("fix: BTRFS and btrfs", "Btrfs"),
            "fix: <mark>BTRFS</mark> and <mark>btrfs</mark>"
        );
    }

    #[test]
    fn metacharacters_match_literally() {
        assert_eq!(highlight("a+b = c", "a+b"), "<mark>a+b</mark> = c");
        assert_eq!(highlight("aab", "a+b"), "aab");
        assert_eq!(highlight("call foo(", "foo("), "call <mark>foo(</mark>");
        assert_eq!(highlight("[PATCH] x", "[patch]"), "<mark>[PATCH]</mark> x");
        assert_eq!(highlight("anything", ".*"), "anything");
    }

    #[test]
    fn no_match_returns_text() {
        assert_eq!(highlight("kernel", "xfs"), "kernel");
    }

    #[test]
    fn ranges_are_byte_offsets_for_multibyte_text() {
        let text = "Größe und GRÖSSE";
        let ranges = highlight_ranges(text, "größe");
        assert_eq!(ranges.len(), 1);
        assert_eq!(&text[ranges[0].clone()], "Größe");
    }
}
