//! Search trait: the abstraction over the web-search backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::SearchError;

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// A web-search backend. An empty result list is valid (no results);
/// an unreachable backend is a recoverable `SearchError`.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Run a query and return results in backend rank order.
    async fn query(&self, text: &str) -> std::result::Result<Vec<SearchHit>, SearchError>;
}
