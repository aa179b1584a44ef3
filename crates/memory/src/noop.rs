//! No-op vector store: disables long-term memory entirely.

use async_trait::async_trait;
use openclaw_core::error::MemoryError;
use openclaw_core::memory::{MemoryPayload, MemoryRecord, VectorBackend, VectorMatch};

/// A vector store that stores nothing and recalls nothing.
pub struct NoopVectorStore;

#[async_trait]
impl VectorBackend for NoopVectorStore {
    fn name(&self) -> &str {
        "none"
    }

    async fn upsert(&self, _id: &str, _vector: Vec<f32>, _payload: MemoryPayload) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn query(&self, _vector: &[f32], _k: usize) -> Result<Vec<VectorMatch>, MemoryError> {
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(0)
    }

    async fn list(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(Vec::new())
    }
}
