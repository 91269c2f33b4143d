//! Search lifecycle: `Idle -> Searching -> {Success, Failure}`.
//!
//! Overlapping searches are sequenced by request identity. Only the most
//! recently issued request may write state; anything older is discarded when
//! it lands, whichever order the network delivers them in.

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::model::{ResultSet, SearchResult};
use crate::search::query_sync::is_searchable;

/// Identity of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic source of [`RequestId`]s.
#[derive(Debug, Default)]
pub struct RequestSequence {
    last: u64,
}

impl RequestSequence {
    pub fn next_id(&mut self) -> RequestId {
        self.last += 1;
        RequestId(self.last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    Success,
    Failure,
}

/// A search that has been issued and must be reported back via
/// [`SearchOrchestrator::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub id: RequestId,
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Superseded,
}

#[derive(Debug)]
pub struct SearchOrchestrator {
    phase: SearchPhase,
    results: ResultSet,
    error: Option<String>,
    active_query: Option<String>,
    latest: Option<RequestId>,
    requests: RequestSequence,
    generations: u64,
}

impl Default for SearchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchOrchestrator {
    pub fn new() -> Self {
        Self {
            phase: SearchPhase::Idle,
            results: ResultSet::empty(),
            error: None,
            active_query: None,
            latest: None,
            requests: RequestSequence::default(),
            generations: 0,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Query of the request currently allowed to write state.
    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    /// Issue a search. Returns `None` for queries below the length threshold,
    /// which leave every piece of state untouched.
    pub fn begin(&mut self, query: &str) -> Option<SearchTicket> {
        if !is_searchable(query) {
            debug!(query = query, "search_skipped_short_query");
            return None;
        }
        let id = self.requests.next_id();
        self.latest = Some(id);
        self.active_query = Some(query.to_string());
        self.phase = SearchPhase::Searching;
        self.error = None;
        info!(request = id.get(), query = query, "search_start");
        Some(SearchTicket {
            id,
            query: query.to_string(),
        })
    }

    pub fn finish(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<Vec<SearchResult>, ApiError>,
    ) -> Completion {
        if self.latest != Some(ticket.id) {
            debug!(
                request = ticket.id.get(),
                query = %ticket.query,
                "search_superseded"
            );
            return Completion::Superseded;
        }

        match outcome {
            Ok(hits) => {
                self.generations += 1;
                info!(
                    request = ticket.id.get(),
                    hits = hits.len(),
                    generation = self.generations,
                    "search_applied"
                );
                self.results = ResultSet::new(self.generations, hits);
                self.phase = SearchPhase::Success;
            }
            Err(err) => {
                warn!(request = ticket.id.get(), error = %err, "search_failed");
                // Previous results stay on screen.
                self.error = Some(err.user_message().to_string());
                self.phase = SearchPhase::Failure;
            }
        }
        Completion::Applied
    }
}
