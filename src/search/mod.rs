//! Search layer facade.
//!
//! This module holds the client-side search lifecycle for patchy:
//!
//! - **[`query_sync`]**: Live query plus the two debouncers (search, route).
//! - **[`orchestrator`]**: Search state machine with request sequencing.
//! - **[`detail`]**: Result-set-first, fetch-on-miss resolution for one result.
//! - **[`dispatch`]**: tokio task runner that feeds API outcomes back as events.

pub mod detail;
pub mod dispatch;
pub mod orchestrator;
pub mod query_sync;
