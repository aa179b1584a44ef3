//! Domain event system: the observable side channel of the reasoning loop.
//!
//! The loop publishes an event whenever something an inspection surface
//! might care about happens. Publishing never blocks and never fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A user turn entered the loop
    TurnStarted {
        session_id: String,
        turn: u64,
        config_version: u64,
        timestamp: DateTime<Utc>,
    },

    /// Long-term memory was queried before the first model call
    MemoryRecalled {
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// The output parser needed a fallback strategy
    ParseFallback {
        strategy: String,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A fact was written to long-term memory
    MemoryPersisted {
        memory_id: String,
        timestamp: DateTime<Utc>,
    },

    /// The proactivity monitor surfaced a suggestion
    SuggestionRaised {
        pending: usize,
        timestamp: DateTime<Utc>,
    },

    /// A turn ended without a final answer
    TurnFailed {
        turn: u64,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::ToolExecuted {
            tool_name: "add_todo".into(),
            success: true,
            duration_ms: 3,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::ToolExecuted { tool_name, success, .. } => {
                assert_eq!(tool_name, "add_todo");
                assert!(success);
            }
            _ => panic!("Expected ToolExecuted event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::TurnFailed {
            turn: 1,
            error_message: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}
