//! File-based vector store: persistent JSON-lines storage.
//!
//! Each line is a JSON-encoded `MemoryRecord` including its embedding.
//!
//! Storage location: `~/.openclaw/memory/vectors.jsonl`
//!
//! Simple, portable, human-inspectable, and free of external services.

use async_trait::async_trait;
use openclaw_core::error::MemoryError;
use openclaw_core::memory::{MemoryPayload, MemoryRecord, VectorBackend, VectorMatch};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use crate::in_memory::upsert_record;
use crate::vector::rank_records;

/// A file-backed vector store using JSONL (one JSON object per line).
///
/// Records are loaded on creation and flushed to disk on every upsert.
/// This gives fast reads with durable writes.
pub struct FileVectorStore {
    path: PathBuf,
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl FileVectorStore {
    /// Open the store at `path`.
    ///
    /// If the file does not exist, starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = records.len(), "File vector store loaded");
        Self {
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<MemoryRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<MemoryRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted memory record");
                    None
                }
            })
            .collect()
    }

    async fn flush(&self, records: &[MemoryRecord]) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MemoryError::Storage(format!("Failed to create memory directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for record in records {
            let line = serde_json::to_string(record).map_err(|e| {
                MemoryError::Storage(format!("Failed to serialize memory record: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))
    }
}

#[async_trait]
impl VectorBackend for FileVectorStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn upsert(&self, id: &str, vector: Vec<f32>, payload: MemoryPayload) -> Result<(), MemoryError> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        upsert_record(&mut next, id, vector, payload);
        // Disk first, so a failed write leaves memory and file in agreement
        self.flush(&next).await?;
        *records = next;
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
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn payload(text: &str) -> MemoryPayload {
        MemoryPayload {
            text: text.into(),
            metadata: MemoryMetadata::new(Some("session-1".into()), vec!["model".into()]),
        }
    }

    #[tokio::test]
    async fn upsert_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory").join("vectors.jsonl");

        let store = FileVectorStore::new(path.clone());
        store.upsert("m1", vec![1.0, 0.0], payload("The user's cat is Miso")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Miso"));

        let reloaded = FileVectorStore::new(path);
        assert_eq!(reloaded.count().await.unwrap(), 1);
        let hits = reloaded.query(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].id, "m1");
        assert_eq!(hits[0].payload.metadata.source.as_deref(), Some("session-1"));
    }

    #[tokio::test]
    async fn handles_missing_file_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileVectorStore::new(dir.path().join("absent.jsonl"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn skips_corrupted_lines() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, r#"{{"id":"1","text":"valid","embedding":[1.0],"metadata":{{"created_at":"2026-01-01T00:00:00Z"}}}}"#).unwrap();
        writeln!(tmp, "this is not json").unwrap();
        writeln!(tmp, r#"{{"id":"2","text":"also valid","embedding":[0.5],"metadata":{{"created_at":"2026-01-01T00:00:00Z"}}}}"#).unwrap();

        let store = FileVectorStore::new(tmp.path().to_path_buf());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every write fail
        let path = dir.path().join("vectors.jsonl");
        std::fs::create_dir_all(&path).unwrap();

        let store = FileVectorStore::new(path);
        let err = store.upsert("m1", vec![1.0], payload("lost")).await;
        assert!(matches!(err, Err(MemoryError::Storage(_))));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
