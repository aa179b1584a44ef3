//! DuckDuckGo instant-answer search backend (no API key required).

use async_trait::async_trait;
use openclaw_core::error::SearchError;
use openclaw_core::search::{SearchBackend, SearchHit};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const ENDPOINT: &str = "https://api.duckduckgo.com/";

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(timeout_secs: u64) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("openclaw/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SearchError::Unavailable(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: ENDPOINT.into(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn query(&self, text: &str) -> Result<Vec<SearchHit>, SearchError> {
        debug!(query = text, "DuckDuckGo query");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", text),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Unavailable(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: InstantAnswer = response
            .json()
            .await
            .map_err(|e| SearchError::Unavailable(format!("bad response: {e}")))?;
        Ok(body.into_hits())
    }
}

// --- Instant-answer API types (internal) ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
    Entry {
        #[serde(rename = "Text", default)]
        text: String,
        #[serde(rename = "FirstURL", default)]
        first_url: String,
    },
}

impl InstantAnswer {
    fn into_hits(self) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        if !self.abstract_text.is_empty() {
            hits.push(SearchHit {
                title: self.heading,
                snippet: self.abstract_text,
                url: self.abstract_url,
            });
        }
        flatten(self.related_topics, &mut hits);
        hits
    }
}

fn flatten(topics: Vec<RelatedTopic>, out: &mut Vec<SearchHit>) {
    for topic in topics {
        match topic {
            RelatedTopic::Group { topics } => flatten(topics, out),
            RelatedTopic::Entry { text, first_url } if !text.is_empty() => {
                let title = text
                    .split(" - ")
                    .next()
                    .unwrap_or(&text)
                    .to_string();
                out.push(SearchHit {
                    title,
                    snippet: text,
                    url: first_url,
                });
            }
            RelatedTopic::Entry { .. } => {}
        }
    }
}
