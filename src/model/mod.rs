//! Data model shared by the API client, the orchestration layer and the UI.

pub mod types;

pub use types::{ResultSet, SearchResult};
