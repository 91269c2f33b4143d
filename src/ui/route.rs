//! Routes and navigation history.
//!
//! Routes mirror the shareable locations of the web client:
//!
//! - `/` and `/?q=<query>`: search view
//! - `/result/<id>`: detail overlay on top of the search view

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Search { query: Option<String> },
    Result { id: String },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown route: {0}")]
    Unknown(String),
    #[error("result route is missing an id")]
    MissingId,
    #[error("invalid percent-encoding in {0}")]
    BadEncoding(String),
}

impl Route {
    pub fn home() -> Self {
        Route::Search { query: None }
    }

    pub fn search(query: impl Into<String>) -> Self {
        let query = query.into();
        if query.is_empty() {
            Route::home()
        } else {
            Route::Search { query: Some(query) }
        }
    }

    pub fn result(id: impl Into<String>) -> Self {
        Route::Result { id: id.into() }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            Route::Search { query } => query.as_deref(),
            Route::Result { .. } => None,
        }
    }

    pub fn result_id(&self) -> Option<&str> {
        match self {
            Route::Result { id } => Some(id),
            Route::Search { .. } => None,
        }
    }
}

fn decode(raw: &str) -> Result<String, RouteError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|_| RouteError::BadEncoding(raw.to_string()))
}

fn parse_query_string(qs: &str) -> Result<Option<String>, RouteError> {
    for pair in qs.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == "q" {
            let value = decode(&value.replace('+', " "))?;
            return Ok((!value.is_empty()).then_some(value));
        }
    }
    Ok(None)
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (path, qs) = match s.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (s, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        if path == "/" {
            let query = match qs {
                Some(qs) => parse_query_string(qs)?,
                None => None,
            };
            return Ok(Route::Search { query });
        }

        if let Some(rest) = path.strip_prefix("/result/") {
            let raw = rest.trim_end_matches('/');
            if raw.is_empty() || raw.contains('/') {
                return Err(if raw.is_empty() {
                    RouteError::MissingId
                } else {
                    RouteError::Unknown(s.to_string())
                });
            }
            return Ok(Route::Result { id: decode(raw)? });
        }
        if path == "/result" || path == "/result/" {
            return Err(RouteError::MissingId);
        }

        Err(RouteError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Search { query: None } => f.write_str("/"),
            Route::Search { query: Some(q) } => write!(f, "/?q={}", urlencoding::encode(q)),
            Route::Result { id } => write!(f, "/result/{}", urlencoding::encode(id)),
        }
    }
}

/// In-memory navigation history with a cursor, like a browser tab.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Route>,
    cursor: usize,
}

impl History {
    pub fn new(start: Route) -> Self {
        Self {
            entries: vec![start],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Route {
        &self.entries[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    /// Navigate forward to `route`, dropping any forward entries.
    pub fn push(&mut self, route: Route) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(route);
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry. Returns `false` at the start of history.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Rewrite the query of the search view currently in effect: the current
    /// entry when it is a search route, otherwise the nearest search entry
    /// beneath the overlay. A detail deep link with no search entry below it
    /// gets one inserted, so closing the overlay lands on that search.
    pub fn set_search_query(&mut self, query: Option<String>) {
        let replacement = Route::Search { query };
        if let Some(idx) = (0..=self.cursor)
            .rev()
            .find(|&i| matches!(self.entries[i], Route::Search { .. }))
        {
            self.entries[idx] = replacement;
        } else {
            self.entries.insert(0, replacement);
            self.cursor += 1;
        }
    }

    /// Query of the search view currently in effect.
    pub fn search_query(&self) -> Option<&str> {
        (0..=self.cursor)
            .rev()
            .find_map(|i| match &self.entries[i] {
                Route::Search { query } => Some(query.as_deref()),
                Route::Result { .. } => None,
            })
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_routes() {
        assert_eq!("/".parse::<Route>().unwrap(), Route::home());
        assert_eq!("".parse::<Route>().unwrap(), Route::home());
        assert_eq!(
            "/?q=memory%20leak".parse::<Route>().unwrap(),
            Route::search("memory leak")
        );
        assert_eq!(
            "/?page=2&q=a+b".parse::<Route>().unwrap(),
            Route::search("a b")
        );
        assert_eq!("/?q=".parse::<Route>().unwrap(), Route::home());
    }

    #[test]
    fn parses_result_routes() {
        assert_eq!("/result/42".parse::<Route>().unwrap(), Route::result("42"));
        assert_eq!(
            "/result/a%2Fb".parse::<Route>().unwrap(),
            Route::result("a/b")
        );
        assert_eq!("/result/".parse::<Route>(), Err(RouteError::MissingId));
        assert!(matches!(
            "/elsewhere".parse::<Route>(),
            Err(RouteError::Unknown(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        for route in [
            Route::home(),
            Route::search("btrfs & xfs?"),
            Route::result("173706974044.1927324@frogs"),
        ] {
            assert_eq!(route.to_string().parse::<Route>().unwrap(), route);
        }
        assert_eq!(Route::search("a b").to_string(), "/?q=a%20b");
    }

    #[test]
    fn push_and_back() {
        let mut h = History::new(Route::search("xfs"));
        assert!(!h.back());
        h.push(Route::result("1"));
        assert_eq!(h.current(), &Route::result("1"));
        assert!(h.back());
        assert_eq!(h.current(), &Route::search("xfs"));
        h.push(Route::result("2"));
        assert_eq!(h.len(), 2, "forward entry dropped");
    }

    #[test]
    fn set_search_query_replaces_instead_of_pushing() {
        let mut h = History::new(Route::home());
        h.set_search_query(Some("ab".into()));
        h.set_search_query(Some("abc".into()));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current(), &Route::search("abc"));
        h.set_search_query(None);
        assert_eq!(h.current(), &Route::home());
    }

    #[test]
    fn set_search_query_under_overlay_targets_search_entry() {
        let mut h = History::new(Route::search("old"));
        h.push(Route::result("7"));
        h.set_search_query(Some("new".into()));
        assert_eq!(h.current(), &Route::result("7"));
        assert_eq!(h.search_query(), Some("new"));
        assert!(h.back());
        assert_eq!(h.current(), &Route::search("new"));
    }

    #[test]
    fn deep_link_gets_search_entry_beneath() {
        let mut h = History::new(Route::result("7"));
        assert!(!h.can_go_back());
        h.set_search_query(None);
        assert!(h.can_go_back());
        assert_eq!(h.current(), &Route::result("7"));
        h.back();
        assert_eq!(h.current(), &Route::home());
    }
}
