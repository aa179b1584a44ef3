//! In-memory vector store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use openclaw_core::error::MemoryError;
use openclaw_core::memory::{MemoryPayload, MemoryRecord, VectorBackend, VectorMatch};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::vector::rank_records;

/// A vector store that keeps records in a Vec.
/// Useful for testing and sessions where persistence isn't needed.
#[derive(Clone)]
pub struct InMemoryVectorStore {
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert or replace `id` in an ordered record list.
pub(crate) fn upsert_record(
    records: &mut Vec<MemoryRecord>,
    id: &str,
    vector: Vec<f32>,
    payload: MemoryPayload,
) {
    let record = MemoryRecord {
        id: id.to_string(),
        text: payload.text,
        embedding: vector,
        metadata: payload.metadata,
        score: 0.0,
    };
    match records.iter_mut().find(|r| r.id == id) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

#[async_trait]
impl VectorBackend for InMemoryVectorStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn upsert(&self, id: &str, vector: Vec<f32>, payload: MemoryPayload) -> Result<(), MemoryError> {
        upsert_record(&mut *self.records.write().await, id, vector, payload);
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<VectorMatch>, MemoryError> {
        let records = self.records.read().await;
        Ok(rank_records(&records, vector, k))
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.records.read().await.len())
    }

    async fn list(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openclaw_core::memory::MemoryMetadata;

    fn payload(text: &str) -> MemoryPayload {
        MemoryPayload {
            text: text.into(),
            metadata: MemoryMetadata::default(),
        }
    }

    #[tokio::test]
    async fn upsert_and_query() {
        let store = InMemoryVectorStore::new();
        store.upsert("a", vec![1.0, 0.0], payload("Rust is a systems language")).await.unwrap();
        store.upsert("b", vec![0.0, 1.0], payload("Tea is a drink")).await.unwrap();

        let results = store.query(&[0.9, 0.1], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].payload.text, "Rust is a systems language");
    }

    #[tokio::test]
    async fn upsert_replaces_same_id() {
        let store = InMemoryVectorStore::new();
        store.upsert("a", vec![1.0], payload("old")).await.unwrap();
        store.upsert("a", vec![1.0], payload("new")).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.list().await.unwrap()[0].text, "new");
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = InMemoryVectorStore::new();
        assert!(store.query(&[1.0, 0.0], 2).await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
