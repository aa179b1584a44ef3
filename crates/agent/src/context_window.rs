//! Short-term memory: the last N messages of the conversation.
//!
//! Eviction is FIFO over non-system messages. System messages (such as the
//! proactive suggestion note) are kept while anything else can go, but
//! capacity always wins.

use std::collections::VecDeque;
use openclaw_core::message::{Message, NOTE_KEY};

#[derive(Debug, Clone)]
pub struct ContextWindow {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl ContextWindow {
    /// A window holding at most `capacity` messages (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, message: Message) {
        while self.messages.len() >= self.capacity {
            self.evict_one();
        }
        self.messages.push_back(message);
    }

    fn evict_one(&mut self) {
        match self.messages.iter().position(|m| !m.is_system()) {
            Some(idx) => {
                self.messages.remove(idx);
            }
            None => {
                self.messages.pop_front();
            }
        }
    }

    /// Drop any note of `kind`, then append `message` tagged as that kind.
    pub fn replace_note(&mut self, kind: &str, mut message: Message) {
        self.remove_note(kind);
        message.metadata.insert(NOTE_KEY.into(), kind.into());
        self.append(message);
    }

    pub fn remove_note(&mut self, kind: &str) {
        self.messages.retain(|m| m.note_kind() != Some(kind));
    }

    /// Owned copy of the window, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(6)
    }
}
