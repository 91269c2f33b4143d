//! Single-result resolution for the detail view.
//!
//! Lookup order: the current result set first, a dedicated fetch only on a
//! miss. A fetched result stays in the resolver; it is never merged back into
//! the list's result set, so the two may legitimately disagree.

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::model::{ResultSet, SearchResult};
use crate::search::orchestrator::{RequestId, RequestSequence};

/// Where a ready result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    Local,
    Fetched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    /// Nothing resolved yet.
    Empty,
    Loading,
    Ready {
        result: SearchResult,
        source: DetailSource,
    },
    Failed(String),
}

/// A single-result fetch that must be reported back via
/// [`DetailResolver::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: RequestId,
    pub result_id: String,
}

#[derive(Debug)]
pub struct DetailResolver {
    state: DetailState,
    /// `(result id, result set generation)` of the last resolution.
    key: Option<(String, u64)>,
    pending: Option<RequestId>,
}

impl Default for DetailResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailResolver {
    pub fn new() -> Self {
        Self {
            state: DetailState::Empty,
            key: None,
            pending: None,
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn result(&self) -> Option<&SearchResult> {
        match &self.state {
            DetailState::Ready { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Re-run resolution for `id` against `results`.
    ///
    /// A no-op when neither the id nor the result set changed since the last
    /// call. Returns a ticket when a network fetch is required.
    pub fn resolve(
        &mut self,
        id: &str,
        results: &ResultSet,
        requests: &mut RequestSequence,
    ) -> Option<FetchTicket> {
        let key = (id.to_string(), results.generation());
        if self.key.as_ref() == Some(&key) {
            return None;
        }
        self.key = Some(key);

        if let Some(hit) = results.find(id) {
            debug!(id = id, generation = results.generation(), "detail_local_hit");
            self.pending = None;
            self.state = DetailState::Ready {
                result: hit.clone(),
                source: DetailSource::Local,
            };
            return None;
        }

        let ticket = FetchTicket {
            id: requests.next_id(),
            result_id: id.to_string(),
        };
        info!(id = id, request = ticket.id.get(), "detail_fetch");
        self.pending = Some(ticket.id);
        self.state = DetailState::Loading;
        Some(ticket)
    }

    /// Apply a fetch outcome. Returns `false` for stale tickets.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<SearchResult, ApiError>,
    ) -> bool {
        if self.pending != Some(ticket.id) {
            debug!(request = ticket.id.get(), "detail_fetch_stale");
            return false;
        }
        self.pending = None;
        self.state = match outcome {
            Ok(result) => DetailState::Ready {
                result,
                source: DetailSource::Fetched,
            },
            Err(err) if err.is_not_found() => {
                info!(id = %ticket.result_id, "detail_not_found");
                DetailState::Failed(err.user_message().to_string())
            }
            Err(err) => {
                warn!(id = %ticket.result_id, error = %err, "detail_fetch_failed");
                DetailState::Failed(err.user_message().to_string())
            }
        };
        true
    }
}
