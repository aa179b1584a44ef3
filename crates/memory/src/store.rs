//! The memory store: embedding plus vector backend behind one facade.
//!
//! Retrieval never fails: an unreachable backend or embedder is logged and
//! treated as "nothing recalled". Persistence errors are returned so the
//! caller can report them.

use openclaw_core::error::MemoryError;
use openclaw_core::memory::{Embedder, MemoryMetadata, MemoryPayload, MemoryRecord, VectorBackend};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct MemoryStore {
    backend: Arc<dyn VectorBackend>,
    embedder: Arc<dyn Embedder>,
    timeout: Duration,
}

impl MemoryStore {
    pub fn new(backend: Arc<dyn VectorBackend>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            backend,
            embedder,
            timeout: Duration::from_secs(10),
        }
    }

    /// Bound every backend and embedder call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// The `k` stored facts most similar to `query`, best first, with scores.
    pub async fn retrieve(&self, query: &str, k: usize) -> Vec<MemoryRecord> {
        if k == 0 {
            return Vec::new();
        }
        match self.try_retrieve(query, k).await {
            Ok(records) => {
                debug!(count = records.len(), "Memories recalled");
                records
            }
            Err(e) => {
                warn!(error = %e, backend = self.backend.name(), "Memory recall failed, continuing without it");
                Vec::new()
            }
        }
    }

    async fn try_retrieve(&self, query: &str, k: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
        let vector = self.bounded(self.embedder.embed(query)).await?;
        let matches = self.bounded(self.backend.query(&vector, k)).await?;
        Ok(matches.into_iter().map(MemoryRecord::from).collect())
    }

    /// Store a new fact under a fresh id and return that id.
    ///
    /// Identical text stored twice yields two records.
    pub async fn persist(&self, text: &str, metadata: MemoryMetadata) -> Result<String, MemoryError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MemoryError::InvalidFact("fact is empty".into()));
        }

        let vector = self.bounded(self.embedder.embed(text)).await?;
        let id = Uuid::new_v4().to_string();
        let payload = MemoryPayload {
            text: text.to_string(),
            metadata,
        };
        self.bounded(self.backend.upsert(&id, vector, payload)).await?;
        debug!(memory_id = %id, "Fact persisted");
        Ok(id)
    }

    /// Every stored fact, oldest first.
    pub async fn list(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.bounded(self.backend.list()).await
    }

    pub async fn count(&self) -> Result<usize, MemoryError> {
        self.bounded(self.backend.count()).await
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, MemoryError>>,
    ) -> Result<T, MemoryError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(MemoryError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashEmbedder, InMemoryVectorStore, NoopVectorStore};
    use async_trait::async_trait;
    use openclaw_core::memory::VectorMatch;

    fn store() -> MemoryStore {
        MemoryStore::new(
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(HashEmbedder::default()),
        )
    }

    #[tokio::test]
    async fn persist_then_retrieve() {
        let store = store();
        store
            .persist("User preference: I like green tea", MemoryMetadata::new(None, vec!["routed".into()]))
            .await
            .unwrap();
        store
            .persist("The rocket launch is on Friday", MemoryMetadata::default())
            .await
            .unwrap();

        let recalled = store.retrieve("what tea do I like?", 2).await;
        assert_eq!(recalled.len(), 2);
        assert!(recalled[0].text.contains("green tea"));
        assert!(recalled[0].score >= recalled[1].score);
    }

    #[tokio::test]
    async fn identical_text_gets_distinct_ids() {
        let store = store();
        let a = store.persist("same fact", MemoryMetadata::default()).await.unwrap();
        let b = store.persist("same fact", MemoryMetadata::default()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_store_recalls_nothing() {
        assert!(store().retrieve("anything", 2).await.is_empty());
    }

    #[tokio::test]
    async fn blank_fact_is_rejected() {
        let err = store().persist("   ", MemoryMetadata::default()).await;
        assert!(matches!(err, Err(MemoryError::InvalidFact(_))));
    }

    #[tokio::test]
    async fn noop_backend_stores_nothing() {
        let store = MemoryStore::new(Arc::new(NoopVectorStore), Arc::new(HashEmbedder::default()));
        store.persist("ignored", MemoryMetadata::default()).await.unwrap();
        assert!(store.retrieve("ignored", 2).await.is_empty());
    }

    struct BrokenBackend;

    #[async_trait]
    impl VectorBackend for BrokenBackend {
        fn name(&self) -> &str {
            "broken"
        }
        async fn upsert(&self, _id: &str, _v: Vec<f32>, _p: MemoryPayload) -> Result<(), MemoryError> {
            Err(MemoryError::Storage("disk on fire".into()))
        }
        async fn query(&self, _v: &[f32], _k: usize) -> Result<Vec<VectorMatch>, MemoryError> {
            Err(MemoryError::QueryFailed("connection refused".into()))
        }
        async fn count(&self) -> Result<usize, MemoryError> {
            Ok(0)
        }
        async fn list(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn broken_backend_degrades_to_empty_recall() {
        let store = MemoryStore::new(Arc::new(BrokenBackend), Arc::new(HashEmbedder::default()));
        assert!(store.retrieve("hello", 2).await.is_empty());
        assert!(matches!(
            store.persist("fact", MemoryMetadata::default()).await,
            Err(MemoryError::Storage(_))
        ));
    }

    struct StalledBackend;

    #[async_trait]
    impl VectorBackend for StalledBackend {
        fn name(&self) -> &str {
            "stalled"
        }
        async fn upsert(&self, _id: &str, _v: Vec<f32>, _p: MemoryPayload) -> Result<(), MemoryError> {
            std::future::pending().await
        }
        async fn query(&self, _v: &[f32], _k: usize) -> Result<Vec<VectorMatch>, MemoryError> {
            std::future::pending().await
        }
        async fn count(&self) -> Result<usize, MemoryError> {
            Ok(0)
        }
        async fn list(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_backend_times_out() {
        let store = MemoryStore::new(Arc::new(StalledBackend), Arc::new(HashEmbedder::default()))
            .with_timeout(Duration::from_secs(1));
        assert!(store.retrieve("hello", 2).await.is_empty());
        assert!(matches!(
            store.persist("fact", MemoryMetadata::default()).await,
            Err(MemoryError::Timeout(1))
        ));
    }
}
