//! Message domain types.
//!
//! Messages are the value objects that flow through a session:
//! the user speaks → the reasoning loop answers → both land in the context window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata key marking a system note that replaces older notes of the same kind.
pub const NOTE_KEY: &str = "note";

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The agent itself
    Agent,
    /// System-authored text (persona, proactive notes)
    System,
    /// Tool execution result
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "agent",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

/// A single message. Immutable once appended to a context window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    /// Optional metadata (note kind, tool name, etc.)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new agent message.
    pub fn agent(content: impl Into<String>) -> Self {
        Self::with_role(Role::Agent, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a tool result message.
    pub fn tool(tool_name: &str, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content);
        msg.metadata
            .insert("tool".into(), serde_json::Value::String(tool_name.to_string()));
        msg
    }

    /// Create a system note of the given kind.
    pub fn note(kind: &str, content: impl Into<String>) -> Self {
        let mut msg = Self::system(content);
        msg.metadata
            .insert(NOTE_KEY.into(), serde_json::Value::String(kind.to_string()));
        msg
    }

    /// The note kind, if this message is a system note.
    pub fn note_kind(&self) -> Option<&str> {
        self.metadata.get(NOTE_KEY).and_then(|v| v.as_str())
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello, agent!");
        assert!(msg.metadata.is_empty());
    }

    #[test]
    fn note_carries_its_kind() {
        let msg = Message::note("proactive", "Still pending: buy milk");
        assert!(msg.is_system());
        assert_eq!(msg.note_kind(), Some("proactive"));
        assert_eq!(Message::system("plain").note_kind(), None);
    }

    #[test]
    fn role_serializes_lowercase() {
        let msg = Message::agent("Done.");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"agent\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::Agent);
    }

    #[test]
    fn tool_message_records_tool_name() {
        let msg = Message::tool("current_date", "Monday, October 19, 2026");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.metadata["tool"], "current_date");
    }
}
