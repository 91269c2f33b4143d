//! Runs API calls as tokio tasks and reports them back as [`ApiEvent`]s.
//!
//! The UI state stays on the event-loop thread; tasks only carry a ticket and
//! an `Arc` of the API, and send their outcome over an unbounded channel. A
//! newer search aborts the task of the one it supersedes (likewise for detail
//! fetches). The orchestrator still checks request identity, so an outcome
//! that was already in the channel when the abort happened is dropped there.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::AbortHandle;
use tracing::debug;

use crate::api::{ApiError, SearchApi};
use crate::model::SearchResult;
use crate::search::detail::FetchTicket;
use crate::search::orchestrator::SearchTicket;

#[derive(Debug)]
pub enum ApiEvent {
    Search {
        ticket: SearchTicket,
        outcome: Result<Vec<SearchResult>, ApiError>,
    },
    Detail {
        ticket: FetchTicket,
        outcome: Result<SearchResult, ApiError>,
    },
}

pub struct ApiDispatcher<A: SearchApi> {
    api: Arc<A>,
    runtime: Handle,
    tx: UnboundedSender<ApiEvent>,
    search_task: Option<AbortHandle>,
    fetch_task: Option<AbortHandle>,
}

impl<A: SearchApi> ApiDispatcher<A> {
    pub fn new(api: Arc<A>, runtime: Handle) -> (Self, UnboundedReceiver<ApiEvent>) {
        let (tx, rx) = unbounded_channel();
        (
            Self {
                api,
                runtime,
                tx,
                search_task: None,
                fetch_task: None,
            },
            rx,
        )
    }

    pub fn search(&mut self, ticket: SearchTicket) {
        if let Some(prev) = self.search_task.take() {
            debug!(request = ticket.id.get(), "abort_superseded_search");
            prev.abort();
        }
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            let outcome = api.search(&ticket.query).await;
            let _ = tx.send(ApiEvent::Search { ticket, outcome });
        });
        self.search_task = Some(task.abort_handle());
    }

    pub fn fetch(&mut self, ticket: FetchTicket) {
        if let Some(prev) = self.fetch_task.take() {
            prev.abort();
        }
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let task = self.runtime.spawn(async move {
            let outcome = api.get_result(&ticket.result_id).await;
            let _ = tx.send(ApiEvent::Detail { ticket, outcome });
        });
        self.fetch_task = Some(task.abort_handle());
    }

    /// Drop the in-flight detail fetch, e.g. when the overlay closes.
    pub fn cancel_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
        self.cancel_fetch();
    }
}

impl<A: SearchApi> Drop for ApiDispatcher<A> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
