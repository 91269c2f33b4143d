//! Result list view state: selection and per-item expansion.

use std::collections::HashSet;

use crate::model::{ResultSet, SearchResult};
use crate::ui::markup;

/// Lines of body text shown while an item is collapsed.
pub const COLLAPSED_LINES: usize = 3;

#[derive(Debug, Default, Clone)]
pub struct ResultList {
    selected: usize,
    expanded: HashSet<String>,
    generation: u64,
}

impl ResultList {
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_result<'a>(&self, results: &'a ResultSet) -> Option<&'a SearchResult> {
        results.get(self.selected)
    }

    /// Reconcile with a new result set: clamp the selection and forget
    /// expansion for ids that are gone.
    pub fn sync(&mut self, results: &ResultSet) {
        if results.generation() == self.generation {
            return;
        }
        self.generation = results.generation();
        self.selected = 0;
        self.expanded
            .retain(|id| results.items().iter().any(|r| &r.id == id));
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select(&mut self, idx: usize, len: usize) {
        if idx < len {
            self.selected = idx;
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }
}

/// Body lines for one item, after sanitizing, honoring expansion.
///
/// Returns the visible lines and whether more remain hidden.
pub fn body_lines(result: &SearchResult, expanded: bool) -> (Vec<String>, bool) {
    let plain = markup::plain_text(&result.text);
    let lines: Vec<String> = plain.lines().map(str::to_string).collect();
    if expanded || lines.len() <= COLLAPSED_LINES {
        return (lines, false);
    }
    (lines.into_iter().take(COLLAPSED_LINES).collect(), true)
}

/// Label of the expand affordance, if the item has anything to expand.
pub fn toggle_label(result: &SearchResult, expanded: bool) -> Option<&'static str> {
    if expanded {
        return Some("Show less");
    }
    let (_, truncated) = body_lines(result, false);
    truncated.then_some("Show more")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: &str, text: &str) -> SearchResult {
        SearchResult {
            id: id.into(),
            text: text.into(),
            url: String::new(),
        }
    }

    #[test]
    fn selection_is_clamped() {
        let mut list = ResultList::default();
        list.select_next(2);
        list.select_next(2);
        list.select_next(2);
        assert_eq!(list.selected(), 1);
        list.select_prev();
        list.select_prev();
        assert_eq!(list.selected(), 0);
        list.select(5, 2);
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn new_result_set_resets_selection_and_prunes_expansion() {
        let mut list = ResultList::default();
        let first = ResultSet::new(1, vec![hit("a", "x"), hit("b", "y")]);
        list.sync(&first);
        list.select_next(first.len());
        list.toggle("a");
        list.toggle("b");

        let second = ResultSet::new(2, vec![hit("b", "y")]);
        list.sync(&second);
        assert_eq!(list.selected(), 0);
        assert!(list.is_expanded("b"));
        assert!(!list.is_expanded("a"));
    }

    #[test]
    fn same_generation_keeps_selection() {
        let mut list = ResultList::default();
        let set = ResultSet::new(4, vec![hit("a", "x"), hit("b", "y")]);
        list.sync(&set);
        list.select_next(set.len());
        list.sync(&set);
        assert_eq!(list.selected(), 1);
    }

    #[test]
    fn collapsed_body_is_truncated() {
        let long = hit("1", "l1\nl2\n<em>l3</em>\nl4\nl5");
        let (lines, more) = body_lines(&long, false);
        assert_eq!(lines, vec!["l1", "l2", "l3"]);
        assert!(more);
        assert_eq!(toggle_label(&long, false), Some("Show more"));

        let (lines, more) = body_lines(&long, true);
        assert_eq!(lines.len(), 5);
        assert!(!more);
        assert_eq!(toggle_label(&long, true), Some("Show less"));

        let short = hit("2", "one line");
        assert_eq!(toggle_label(&short, false), None);
    }
}
