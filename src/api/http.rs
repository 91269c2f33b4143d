//! HTTP client for the search backend.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{ApiError, ApiOp, SearchApi};
use crate::model::SearchResult;

/// reqwest-backed [`SearchApi`].
#[derive(Debug, Clone)]
pub struct HttpSearchApi {
    client: Client,
    base: String,
}

impl HttpSearchApi {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("patchy/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")?;
        Ok(Self {
            client,
            base: normalize_base(base),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl SearchApi for HttpSearchApi {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let url = search_url(&self.base, query);
        debug!(url = %url, "search_request");
        let op = ApiOp::Search;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Transport { op, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), query = query, "search_failed");
            return Err(ApiError::Status {
                op,
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<SearchResult>>()
            .await
            .map_err(|source| ApiError::Transport { op, source })
    }

    async fn get_result(&self, id: &str) -> Result<SearchResult, ApiError> {
        let url = result_url(&self.base, id);
        debug!(url = %url, "result_request");
        let op = ApiOp::Fetch;

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Transport { op, source })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { id: id.to_string() });
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), id = id, "result_failed");
            return Err(ApiError::Status {
                op,
                status: status.as_u16(),
            });
        }

        response
            .json::<SearchResult>()
            .await
            .map_err(|source| ApiError::Transport { op, source })
    }
}

fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

/// `GET {base}/search?q=<encoded>`
pub fn search_url(base: &str, query: &str) -> String {
    format!(
        "{}/search?q={}",
        normalize_base(base),
        urlencoding::encode(query)
    )
}

/// `GET {base}/result/{id}`
pub fn result_url(base: &str, id: &str) -> String {
    format!("{}/result/{}", normalize_base(base), urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_encodes_query() {
        assert_eq!(
            search_url("http://localhost:7788/api", "btrfs & xfs"),
            "http://localhost:7788/api/search?q=btrfs%20%26%20xfs"
        );
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        assert_eq!(
            result_url("http://host/api///", "42"),
            "http://host/api/result/42"
        );
        let api = HttpSearchApi::new(" http://host/api/ ", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base(), "http://host/api");
    }

    #[test]
    fn result_url_encodes_id() {
        assert_eq!(
            result_url("http://host/api", "a/b c"),
            "http://host/api/result/a%2Fb%20c"
        );
    }
}
