//! Server text sanitizing.
//!
//! Result text arrives with inline markup from the search backend (`<em>`
//! around backend highlights). It is untrusted: the only tags that survive
//! are `em` and `mark`, which become emphasis. Every other tag is dropped,
//! the handful of entities the backend emits are decoded, and terminal
//! control characters are removed.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b[^<>]*>").expect("static tag pattern")
});

/// A run of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub emphasis: bool,
}

fn is_emphasis_tag(name: &str) -> bool {
    name.eq_ignore_ascii_case("em") || name.eq_ignore_ascii_case("mark")
}

/// Split `raw` into sanitized segments. Adjacent runs with equal emphasis
/// are merged.
pub fn parse(raw: &str) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::new();
    let mut depth: usize = 0;
    let mut idx = 0;

    for caps in TAG.captures_iter(raw) {
        let Some(whole) = caps.get(0) else { continue };
        push(&mut out, &raw[idx..whole.start()], depth > 0);
        idx = whole.end();

        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = caps.get(2).map_or("", |m| m.as_str());
        if is_emphasis_tag(name) {
            if closing {
                depth = depth.saturating_sub(1);
            } else {
                depth += 1;
            }
        }
    }
    push(&mut out, &raw[idx..], depth > 0);
    out
}

fn push(out: &mut Vec<Segment>, text: &str, emphasis: bool) {
    if text.is_empty() {
        return;
    }
    let text = strip_controls(&decode_entities(text));
    if text.is_empty() {
        return;
    }
    match out.last_mut() {
        Some(last) if last.emphasis == emphasis => last.text.push_str(&text),
        _ => out.push(Segment { text, emphasis }),
    }
}

/// Sanitized text with all markup removed.
pub fn plain_text(raw: &str) -> String {
    parse(raw).into_iter().map(|s| s.text).collect()
}

/// Remove control characters (ESC, BEL, C1 and friends) so server text
/// cannot drive the terminal. Newlines and tabs are kept.
pub fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
