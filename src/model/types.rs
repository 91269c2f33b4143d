//! Result entities as returned by the search API.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single search hit.
///
/// `text` may carry inline markup (`<em>` from the search backend); it is
/// treated as untrusted and sanitized at render time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    pub text: String,
    pub url: String,
}

/// The ordered collection of results currently shown for the active query.
///
/// Replaced wholesale on every successful search. `generation` identifies the
/// replacement, so consumers can tell "same set" from "new set" without
/// comparing contents.
#[derive(Debug, Clone)]
pub struct ResultSet {
    generation: u64,
    items: Arc<[SearchResult]>,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self {
            generation: 0,
            items: Arc::from(Vec::new()),
        }
    }

    pub fn new(generation: u64, items: Vec<SearchResult>) -> Self {
        Self {
            generation,
            items: Arc::from(items),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn items(&self) -> &[SearchResult] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&SearchResult> {
        self.items.get(idx)
    }

    pub fn find(&self, id: &str) -> Option<&SearchResult> {
        self.items.iter().find(|r| r.id == id)
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str) -> SearchResult {
        SearchResult {
            id: id.into(),
            text: format!("text {id}"),
            url: format!("https://lore.example/{id}"),
        }
    }

    #[test]
    fn result_deserializes_from_api_shape() {
        let raw = r#"{"id":"42","text":"a <em>patch</em>","url":"https://lore.kernel.org/x"}"#;
        let parsed: SearchResult = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.id, "42");
        assert_eq!(parsed.text, "a <em>patch</em>");
        assert_eq!(parsed.url, "https://lore.kernel.org/x");
    }

    #[test]
    fn result_set_keeps_order_and_finds_by_id() {
        let set = ResultSet::new(3, vec![hit("b"), hit("a"), hit("c")]);
        let ids: Vec<&str> = set.items().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(set.generation(), 3);
        assert_eq!(set.find("a").map(|r| r.text.as_str()), Some("text a"));
        assert!(set.find("zzz").is_none());
    }

    #[test]
    fn empty_set_has_generation_zero() {
        let set = ResultSet::default();
        assert!(set.is_empty());
        assert_eq!(set.generation(), 0);
        assert!(set.get(0).is_none());
    }
}
