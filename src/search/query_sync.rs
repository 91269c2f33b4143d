//! Query synchronization: live input, debounced search, debounced route.
//!
//! The live query changes on every keystroke. Two independent debouncers
//! follow it: a short one that decides when a search is issued and a longer
//! one that decides when the shareable route is rewritten, so typing stays
//! instant while neither the network nor the history churns per key.

use std::time::{Duration, Instant};

/// Trimmed length a query needs before it reaches the network.
pub const MIN_QUERY_CHARS: usize = 3;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DEFAULT_ROUTE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Whether `query` is long enough to be searched.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_CHARS
}

/// Deadline-based debounce over a value.
///
/// Each `schedule` replaces the pending value and restarts the delay. The
/// owner polls `fire` from its event loop; nothing runs on a timer thread, so
/// dropping or cancelling the debouncer is all the teardown there is.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value once its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if now >= *due => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Take the pending value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }

}

/// How the route's `q` parameter should change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteWrite {
    Set(String),
    /// Empty query: drop the parameter instead of writing `q=`.
    Clear,
}

impl RouteWrite {
    pub fn into_query(self) -> Option<String> {
        match self {
            RouteWrite::Set(q) => Some(q),
            RouteWrite::Clear => None,
        }
    }
}

/// What a poll produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncEffects {
    pub search: Option<String>,
    pub route: Option<RouteWrite>,
}

impl SyncEffects {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.route.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct QuerySync {
    query: String,
    search_timer: Debouncer<String>,
    route_timer: Debouncer<String>,
    /// Last value that came out of the search debouncer.
    debounced: String,
    /// Last value written to the route.
    written: String,
}

impl QuerySync {
    /// Start from the query carried by the start route.
    ///
    /// The debounced value starts equal to it, so the start query does not
    /// re-fire after the first delay; see [`QuerySync::initial_search`].
    pub fn new(initial: &str, search_delay: Duration, route_delay: Duration) -> Self {
        Self {
            query: initial.to_string(),
            search_timer: Debouncer::new(search_delay),
            route_timer: Debouncer::new(route_delay),
            debounced: initial.to_string(),
            written: initial.to_string(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Search to issue on mount for the start query, if it is searchable.
    pub fn initial_search(&self) -> Option<String> {
        is_searchable(&self.debounced).then(|| self.debounced.clone())
    }

    /// Every keystroke lands here.
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        self.query = query.into();
        self.search_timer.schedule(self.query.clone(), now);
        self.route_timer.schedule(self.query.clone(), now);
    }

    pub fn poll(&mut self, now: Instant) -> SyncEffects {
        let search = self
            .search_timer
            .fire(now)
            .and_then(|q| self.accept_debounced(q));
        let route = self
            .route_timer
            .fire(now)
            .and_then(|q| self.accept_route(q));
        SyncEffects { search, route }
    }

    /// Submit: skip the remaining search delay.
    pub fn flush_search(&mut self) -> Option<String> {
        self.search_timer
            .flush()
            .and_then(|q| self.accept_debounced(q))
    }

    /// The last debounced query, when it is searchable. Used to run the
    /// same search again on an explicit submit.
    pub fn current_search(&self) -> Option<String> {
        is_searchable(&self.debounced).then(|| self.debounced.clone())
    }

    /// Earliest pending deadline across both debouncers.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.search_timer.deadline(), self.route_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Teardown: nothing may fire after the owning view is gone.
    pub fn cancel_pending(&mut self) {
        self.search_timer.cancel();
        self.route_timer.cancel();
    }

    fn accept_debounced(&mut self, q: String) -> Option<String> {
        if q == self.debounced {
            return None;
        }
        self.debounced = q;
        is_searchable(&self.debounced).then(|| self.debounced.clone())
    }

    fn accept_route(&mut self, q: String) -> Option<RouteWrite> {
        if q == self.written {
            return None;
        }
        self.written = q;
        if self.written.is_empty() {
            Some(RouteWrite::Clear)
        } else {
            Some(RouteWrite::Set(self.written.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn sync(initial: &str) -> QuerySync {
        QuerySync::new(initial, DEFAULT_SEARCH_DEBOUNCE, DEFAULT_ROUTE_DEBOUNCE)
    }

    #[test]
    fn debouncer_restarts_on_schedule() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(100));
        d.schedule("a", t0);
        d.schedule("ab", t0 + ms(80));
        assert_eq!(d.fire(t0 + ms(120)), None, "restarted at 80ms");
        assert_eq!(d.fire(t0 + ms(180)), Some("ab"));
        assert_eq!(d.fire(t0 + ms(500)), None, "fires once");
    }

    #[test]
    fn debouncer_cancel_clears_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(10));
        d.schedule(1, t0);
        assert_eq!(d.deadline(), Some(t0 + ms(10)));
        d.cancel();
        assert!(d.deadline().is_none());
        assert_eq!(d.fire(t0 + ms(50)), None);
    }

    #[test]
    fn searchable_uses_trimmed_char_count() {
        assert!(!is_searchable(""));
        assert!(!is_searchable("  ab  "));
        assert!(is_searchable(" abc "));
        assert!(is_searchable("äöü"));
    }

    #[test]
    fn search_fires_after_short_delay_and_route_after_long_delay() {
        let t0 = Instant::now();
        let mut s = sync("");
        s.set_query("btrfs", t0);
        assert_eq!(s.query(), "btrfs", "live query updates immediately");

        let fx = s.poll(t0 + ms(199));
        assert!(fx.is_empty());

        let fx = s.poll(t0 + ms(200));
        assert_eq!(fx.search.as_deref(), Some("btrfs"));
        assert_eq!(fx.route, None);

        let fx = s.poll(t0 + ms(300));
        assert_eq!(fx.search, None);
        assert_eq!(fx.route, Some(RouteWrite::Set("btrfs".into())));
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn short_query_updates_route_but_never_searches() {
        let t0 = Instant::now();
        let mut s = sync("");
        s.set_query("ab", t0);
        let fx = s.poll(t0 + ms(400));
        assert_eq!(fx.search, None);
        assert_eq!(fx.route, Some(RouteWrite::Set("ab".into())));
        assert_eq!(s.query(), "ab");
    }

    #[test]
    fn clearing_removes_route_parameter() {
        let t0 = Instant::now();
        let mut s = sync("xfs");
        s.set_query("", t0);
        let fx = s.poll(t0 + ms(400));
        assert_eq!(fx.search, None);
        assert_eq!(fx.route, Some(RouteWrite::Clear));
    }

    #[test]
    fn unchanged_debounced_value_does_not_search_again() {
        let t0 = Instant::now();
        let mut s = sync("");
        s.set_query("ext4", t0);
        assert_eq!(s.poll(t0 + ms(200)).search.as_deref(), Some("ext4"));

        // Typing and undoing within one delay window settles on the same value.
        s.set_query("ext4x", t0 + ms(250));
        s.set_query("ext4", t0 + ms(260));
        let fx = s.poll(t0 + ms(600));
        assert_eq!(fx.search, None);
        assert_eq!(fx.route, Some(RouteWrite::Set("ext4".into())));

        s.set_query("ext4", t0 + ms(700));
        assert!(s.poll(t0 + ms(1100)).is_empty(), "route already holds ext4");
    }

    #[test]
    fn initial_query_searches_on_mount_only() {
        let t0 = Instant::now();
        let s = sync("memory leak");
        assert_eq!(s.initial_search().as_deref(), Some("memory leak"));
        assert!(sync("ab").initial_search().is_none());

        let mut s = s;
        assert!(s.poll(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn flush_skips_remaining_delay() {
        let t0 = Instant::now();
        let mut s = sync("");
        s.set_query("rcu stall", t0);
        assert_eq!(s.flush_search().as_deref(), Some("rcu stall"));
        assert_eq!(s.poll(t0 + ms(250)).search, None);
        assert_eq!(s.flush_search(), None, "nothing left to flush");
        assert_eq!(s.current_search().as_deref(), Some("rcu stall"));

        s.set_query("rc", t0);
        assert_eq!(s.flush_search(), None);
        assert_eq!(s.current_search(), None);
    }

    #[test]
    fn next_deadline_is_earliest_and_cancel_clears_everything() {
        let t0 = Instant::now();
        let mut s = sync("");
        s.set_query("kvm", t0);
        assert_eq!(s.next_deadline(), Some(t0 + ms(200)));
        s.cancel_pending();
        assert!(s.next_deadline().is_none());
        assert!(s.poll(t0 + ms(1000)).is_empty());
    }
}
