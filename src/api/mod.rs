//! Remote search API access.
//!
//! - **[`http`]**: reqwest-backed client for the `/search` and `/result/{id}`
//!   endpoints.
//!
//! The [`SearchApi`] trait is the seam between the orchestration layer and the
//! network, so the dispatcher can be driven by an in-memory fake in tests.

pub mod http;

use std::fmt;
use std::future::Future;

use crate::model::SearchResult;

pub use http::HttpSearchApi;

/// Default API base, matching the backend's development listener.
pub const DEFAULT_API_BASE: &str = "http://localhost:7788/api";

/// Which call failed; used in messages and to pick the user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOp {
    Search,
    Fetch,
}

impl fmt::Display for ApiOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiOp::Search => f.write_str("search"),
            ApiOp::Fetch => f.write_str("result"),
        }
    }
}

/// Errors from the search API.
///
/// `Status` and `Transport` are network failures; `NotFound` is only produced
/// by the single-result endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{op} request failed with status {status}")]
    Status { op: ApiOp, status: u16 },

    #[error("{op} request failed: {source}")]
    Transport {
        op: ApiOp,
        #[source]
        source: reqwest::Error,
    },

    #[error("result {id} not found")]
    NotFound { id: String },
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status attached to the failure, when there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
        }
    }

    /// Generic text shown to the user; no codes leak into the view.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "Result not found",
            ApiError::Status { op: ApiOp::Search, .. }
            | ApiError::Transport {
                op: ApiOp::Search, ..
            } => "Failed to fetch search results",
            ApiError::Status { op: ApiOp::Fetch, .. }
            | ApiError::Transport { op: ApiOp::Fetch, .. } => "Failed to load result",
        }
    }
}

/// The two calls the client makes. One attempt per call, no retries.
pub trait SearchApi: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, ApiError>> + Send;

    fn get_result(&self, id: &str) -> impl Future<Output = Result<SearchResult, ApiError>> + Send;
}
