//! The to-do list: a small persistent task store.
//!
//! Stored as a pretty-printed JSON array (default `~/.openclaw/todo.json`).
//! Items are only ever appended or moved from pending to complete.
//! Completion is resolved by fuzzy description match, never by position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;
use crate::fuzzy::{self, DEFAULT_MATCH_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    Pending,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub description: String,
    pub status: TodoStatus,
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    fn new(description: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.to_string(),
            status: TodoStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TodoStatus::Pending
    }
}

/// Result of a completion attempt.
#[derive(Debug, Clone)]
pub enum CompleteOutcome {
    /// The best-matching pending item, now complete
    Completed(TodoItem),
    /// Pending items exist but none scored above the threshold
    NotFound,
    /// Nothing is pending
    NothingPending,
}

/// Shared handle to the to-do list. Cheap to clone.
#[derive(Clone)]
pub struct TodoList {
    path: Option<PathBuf>,
    items: Arc<RwLock<Vec<TodoItem>>>,
    threshold: f32,
}

impl TodoList {
    /// Open the list persisted at `path`.
    ///
    /// A missing file starts empty. An unreadable or malformed file also
    /// starts empty, with a warning.
    pub fn open(path: PathBuf) -> Self {
        let items = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = items.len(), "To-do list loaded");
        Self {
            path: Some(path),
            items: Arc::new(RwLock::new(items)),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    /// A list that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Arc::new(RwLock::new(Vec::new())),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn load_from_disk(path: &Path) -> Vec<TodoItem> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable to-do file, starting empty");
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Malformed to-do file, starting empty");
            Vec::new()
        })
    }

    async fn save(&self, items: &[TodoItem]) {
        let Some(path) = &self.path else { return };

        let json = match serde_json::to_string_pretty(items) {
            Ok(j) => j,
            Err(e) => {
                warn!(error = %e, "Failed to serialize to-do list");
                return;
            }
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(path = %path.display(), error = %e, "Failed to create to-do directory");
                return;
            }
        }

        if let Err(e) = tokio::fs::write(path, json).await {
            warn!(path = %path.display(), error = %e, "Failed to write to-do file, keeping in-memory state");
        }
    }

    /// Append a pending item.
    pub async fn add(&self, description: &str) -> TodoItem {
        let item = TodoItem::new(description.trim());
        let mut items = self.items.write().await;
        items.push(item.clone());
        self.save(&items).await;
        debug!(id = %item.id, description = %item.description, "To-do added");
        item
    }

    /// Mark the pending item best matching `query` as complete.
    ///
    /// The highest similarity wins; ties go to the earliest-created item,
    /// then to list order.
    pub async fn complete(&self, query: &str) -> CompleteOutcome {
        let mut items = self.items.write().await;

        let mut best: Option<(usize, f32)> = None;
        let mut any_pending = false;
        for (idx, item) in items.iter().enumerate().filter(|(_, i)| i.is_pending()) {
            any_pending = true;
            let score = fuzzy::similarity(query, &item.description);
            if score < self.threshold {
                continue;
            }
            let better = match best {
                None => true,
                Some((b, s)) => score > s || (score == s && item.created_at < items[b].created_at),
            };
            if better {
                best = Some((idx, score));
            }
        }

        if !any_pending {
            return CompleteOutcome::NothingPending;
        }
        let Some((idx, score)) = best else {
            debug!(query, "No to-do matched");
            return CompleteOutcome::NotFound;
        };

        items[idx].status = TodoStatus::Complete;
        let done = items[idx].clone();
        self.save(&items).await;
        debug!(id = %done.id, score, "To-do completed");
        CompleteOutcome::Completed(done)
    }

    /// Pending items in creation order.
    pub async fn pending(&self) -> Vec<TodoItem> {
        self.items
            .read()
            .await
            .iter()
            .filter(|i| i.is_pending())
            .cloned()
            .collect()
    }

    /// Every item, pending and complete.
    pub async fn all(&self) -> Vec<TodoItem> {
        self.items.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn add_appends_pending_items() {
        let list = TodoList::in_memory();
        list.add("buy milk").await;
        list.add("buy milk").await;

        let pending = list.pending().await;
        assert_eq!(pending.len(), 2);
        assert_ne!(pending[0].id, pending[1].id);
        assert!(pending.iter().all(|i| i.status == TodoStatus::Pending));
    }

    #[tokio::test]
    async fn fuzzy_variants_complete_the_same_item() {
        for query in ["buy groceries", "byu groceries", "Groceries, buy"] {
            let list = TodoList::in_memory();
            let item = list.add("Buy groceries").await;
            match list.complete(query).await {
                CompleteOutcome::Completed(done) => assert_eq!(done.id, item.id, "query {query:?}"),
                other => panic!("query {query:?} gave {other:?}"),
            }
            assert!(list.pending().await.is_empty());
        }
    }

    #[tokio::test]
    async fn unrelated_query_is_not_found() {
        let list = TodoList::in_memory();
        list.add("Buy groceries").await;
        assert!(matches!(list.complete("Launch rocket").await, CompleteOutcome::NotFound));
        assert_eq!(list.pending().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_list_reports_nothing_pending() {
        let list = TodoList::in_memory();
        assert!(matches!(list.complete("anything").await, CompleteOutcome::NothingPending));

        list.add("walk dog").await;
        list.complete("walk dog").await;
        assert!(matches!(list.complete("walk dog").await, CompleteOutcome::NothingPending));
    }

    #[tokio::test]
    async fn tie_goes_to_earliest_created() {
        let list = TodoList::in_memory();
        let later = list.add("water plants").await;
        let earlier = list.add("water plants").await;
        {
            // Make the second-listed item the oldest
            let mut items = list.items.write().await;
            items[1].created_at = items[0].created_at - Duration::minutes(5);
        }

        match list.complete("water plants").await {
            CompleteOutcome::Completed(done) => assert_eq!(done.id, earlier.id),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(list.pending().await[0].id, later.id);
    }

    #[tokio::test]
    async fn persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.json");

        let list = TodoList::open(path.clone());
        list.add("buy milk").await;
        list.add("call mom").await;
        list.complete("call mom").await;

        let reloaded = TodoList::open(path);
        let all = reloaded.all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].description, "buy milk");
        assert_eq!(all[1].status, TodoStatus::Complete);
    }

    #[tokio::test]
    async fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.json");
        std::fs::write(&path, "{ not json").unwrap();

        let list = TodoList::open(path);
        assert!(list.all().await.is_empty());
        list.add("still works").await;
        assert_eq!(list.pending().await.len(), 1);
    }

    #[tokio::test]
    async fn write_failure_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.json");
        std::fs::create_dir_all(&path).unwrap();

        let list = TodoList::open(path);
        list.add("buy milk").await;
        assert_eq!(list.pending().await.len(), 1);
    }
}
