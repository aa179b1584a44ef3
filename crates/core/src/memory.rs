//! Long-term memory traits: semantically indexed facts.
//!
//! The memory subsystem stores facts the model explicitly asks to keep and
//! recalls the most similar ones before each turn. Two collaborators sit
//! behind traits here:
//! - [`Embedder`] turns text into a vector
//! - [`VectorBackend`] stores vectors with payloads and answers nearest-neighbour queries

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::MemoryError;

/// Metadata attached to every stored fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMetadata {
    /// Where the fact came from (session ID, "routed", etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// When the fact was stored
    pub created_at: DateTime<Utc>,

    /// Relevance tags for categorization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl MemoryMetadata {
    pub fn new(source: Option<String>, tags: Vec<String>) -> Self {
        Self {
            source,
            created_at: Utc::now(),
            tags,
        }
    }
}

impl Default for MemoryMetadata {
    fn default() -> Self {
        Self::new(None, Vec::new())
    }
}

/// The payload stored next to a vector: the original text and its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryPayload {
    pub text: String,
    pub metadata: MemoryMetadata,
}

/// A single nearest-neighbour match returned by a vector backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub payload: MemoryPayload,
}

/// A stored fact. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique ID for this record
    pub id: String,

    /// The fact text
    pub text: String,

    /// Embedding vector
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,

    /// Source, timestamp, tags
    pub metadata: MemoryMetadata,

    /// Relevance score (set by retrieval only)
    #[serde(default)]
    pub score: f32,
}

impl From<VectorMatch> for MemoryRecord {
    fn from(m: VectorMatch) -> Self {
        Self {
            id: m.id,
            text: m.payload.text,
            embedding: Vec::new(),
            metadata: m.payload.metadata,
            score: m.score,
        }
    }
}

/// Turns text into an embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The embedder name (e.g., "hash", "provider:all-minilm").
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, MemoryError>;
}

/// The vector-storage backend.
///
/// Implementations: in-memory (testing), JSONL file, none (no-op).
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// The backend name (e.g., "file", "in_memory", "none").
    fn name(&self) -> &str;

    /// Insert or replace the vector and payload stored under `id`.
    async fn upsert(
        &self,
        id: &str,
        vector: Vec<f32>,
        payload: MemoryPayload,
    ) -> std::result::Result<(), MemoryError>;

    /// Return the `k` stored entries most similar to `vector`, best first.
    async fn query(&self, vector: &[f32], k: usize) -> std::result::Result<Vec<VectorMatch>, MemoryError>;

    /// Total number of stored entries.
    async fn count(&self) -> std::result::Result<usize, MemoryError>;

    /// Every stored record, oldest first (inspection only).
    async fn list(&self) -> std::result::Result<Vec<MemoryRecord>, MemoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_match_converts_to_record() {
        let m = VectorMatch {
            id: "mem_001".into(),
            score: 0.82,
            payload: MemoryPayload {
                text: "User preference: I like green tea".into(),
                metadata: MemoryMetadata::new(Some("session-1".into()), vec!["routed".into()]),
            },
        };
        let record = MemoryRecord::from(m);
        assert_eq!(record.id, "mem_001");
        assert!((record.score - 0.82).abs() < f32::EPSILON);
        assert_eq!(record.metadata.tags, vec!["routed".to_string()]);
        assert!(record.embedding.is_empty());
    }

    #[test]
    fn payload_serialization_keeps_text_and_metadata() {
        let payload = MemoryPayload {
            text: "The user's cat is called Miso".into(),
            metadata: MemoryMetadata::new(None, vec!["model".into()]),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("Miso"));
        assert!(json.contains("model"));
        assert!(!json.contains("source"));
    }
}
