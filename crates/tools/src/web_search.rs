//! `search`: web search through a pluggable [`SearchBackend`].
//!
//! Results are filtered and formatted as plain text for the model. A
//! failing or slow backend never fails the turn: the tool reports a
//! sentinel observation with `success = false`.

use async_trait::async_trait;
use openclaw_core::error::{SearchError, ToolError};
use openclaw_core::search::{SearchBackend, SearchHit};
use openclaw_core::tool::{Tool, ToolResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const SEARCH_UNAVAILABLE: &str = "search unavailable";
pub const NO_RESULTS: &str = "No relevant results found.";

pub struct SearchTool {
    backend: Arc<dyn SearchBackend>,
    max_results: usize,
    min_snippet_chars: usize,
    timeout: Duration,
}

impl SearchTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            max_results: 3,
            min_snippet_chars: 40,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_limits(mut self, max_results: usize, min_snippet_chars: usize) -> Self {
        self.max_results = max_results;
        self.min_snippet_chars = min_snippet_chars;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn query(&self, text: &str) -> Result<Vec<SearchHit>, SearchError> {
        match tokio::time::timeout(self.timeout, self.backend.query(text)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(self.timeout.as_secs())),
        }
    }

    fn format(&self, hits: Vec<SearchHit>) -> Option<String> {
        let kept: Vec<String> = hits
            .into_iter()
            .filter(|h| h.snippet.trim().chars().count() >= self.min_snippet_chars)
            .take(self.max_results)
            .map(|h| {
                let mut block = format!("{}\n{}", h.title.trim(), h.snippet.trim());
                if !h.url.is_empty() {
                    block.push('\n');
                    block.push_str(&h.url);
                }
                block
            })
            .collect();

        (!kept.is_empty()).then(|| kept.join("\n\n---\n\n"))
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the internet for current or factual information the conversation does not contain."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        match self.query(query).await {
            Ok(hits) => {
                let count = hits.len();
                Ok(match self.format(hits) {
                    Some(text) => ToolResult::ok(text).with_data(serde_json::json!({ "results": count })),
                    None => ToolResult::ok(NO_RESULTS),
                })
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Search failed");
                Ok(ToolResult::degraded(SEARCH_UNAVAILABLE))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Result<Vec<SearchHit>, SearchError>);

    #[async_trait]
    impl SearchBackend for Canned {
        fn name(&self) -> &str {
            "canned"
        }
        async fn query(&self, _text: &str) -> Result<Vec<SearchHit>, SearchError> {
            self.0.clone()
        }
    }

    struct Stalled;

    #[async_trait]
    impl SearchBackend for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }
        async fn query(&self, _text: &str) -> Result<Vec<SearchHit>, SearchError> {
            std::future::pending().await
        }
    }

    fn hit(title: &str, snippet: &str) -> SearchHit {
        SearchHit {
            title: title.into(),
            snippet: snippet.into(),
            url: format!("https://example.org/{}", title.to_lowercase()),
        }
    }

    const LONG: &str = "Rust is a general-purpose programming language emphasizing performance.";

    #[tokio::test]
    async fn formats_and_filters_results() {
        let tool = SearchTool::new(Arc::new(Canned(Ok(vec![
            hit("Short", "too short"),
            hit("Rust", LONG),
            hit("Ferris", LONG),
            hit("Cargo", LONG),
            hit("Crates", LONG),
        ]))));

        let result = tool.execute(serde_json::json!({"query": "rust"})).await.unwrap();
        assert!(result.success);
        assert!(!result.output.contains("too short"));
        assert_eq!(result.output.matches("---").count(), 2);
        assert!(result.output.starts_with("Rust\n"));
        assert!(result.output.contains("https://example.org/rust"));
        assert!(!result.output.contains("Crates"));
    }

    #[tokio::test]
    async fn empty_results_are_reported() {
        let tool = SearchTool::new(Arc::new(Canned(Ok(vec![hit("Tiny", "short")]))));
        let result = tool.execute(serde_json::json!({"query": "x"})).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, NO_RESULTS);
    }

    #[tokio::test]
    async fn backend_error_yields_sentinel() {
        let tool = SearchTool::new(Arc::new(Canned(Err(SearchError::Unavailable("offline".into())))));
        let result = tool.execute(serde_json::json!({"query": "x"})).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.output, SEARCH_UNAVAILABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_yields_sentinel() {
        let tool = SearchTool::new(Arc::new(Stalled)).with_timeout(Duration::from_secs(2));
        let result = tool.execute(serde_json::json!({"query": "x"})).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.output, SEARCH_UNAVAILABLE);
    }

    #[tokio::test]
    async fn missing_query_is_invalid() {
        let tool = SearchTool::new(Arc::new(Canned(Ok(vec![]))));
        assert!(matches!(
            tool.execute(serde_json::json!({})).await,
            Err(ToolError::InvalidArguments(_))
        ));
    }
}
