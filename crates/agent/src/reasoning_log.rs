//! Per-session log of what the loop did and why, for debugging.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub turn: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: LogKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogKind {
    Retrieval { facts: Vec<(String, f32)> },
    Step { thought: String, action: Option<String>, strategy: String },
    ParseFallback { strategy: String, raw: String },
    ToolCall { tool: String, arguments: String },
    Observation { tool: String, output: String, success: bool },
    MemoryPersisted { id: String, text: String },
    MemoryWarning { message: String },
    Suggestion { text: String },
    TurnFailed { error: String },
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retrieval { facts } if facts.is_empty() => write!(f, "Retrieved memory: none"),
            Self::Retrieval { facts } => {
                write!(f, "Retrieved memory:")?;
                for (text, score) in facts {
                    write!(f, " [{score:.2}] {text};")?;
                }
                Ok(())
            }
            Self::Step { thought, action, strategy } => {
                write!(f, "Thought ({strategy}): {thought}")?;
                if let Some(action) = action {
                    write!(f, " -> {action}")?;
                }
                Ok(())
            }
            Self::ParseFallback { strategy, raw } => {
                write!(f, "Parse fell back to {strategy}; raw output: {raw:?}")
            }
            Self::ToolCall { tool, arguments } => write!(f, "Tool selected: {tool} {arguments}"),
            Self::Observation { tool, output, success } => {
                let status = if *success { "ok" } else { "degraded" };
                write!(f, "Observation from {tool} ({status}): {output}")
            }
            Self::MemoryPersisted { id, text } => write!(f, "Memory saved [{id}]: {text}"),
            Self::MemoryWarning { message } => write!(f, "Memory warning: {message}"),
            Self::Suggestion { text } => write!(f, "Proactive suggestion: {text}"),
            Self::TurnFailed { error } => write!(f, "Turn failed: {error}"),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[turn {} {}] {}", self.turn, self.timestamp.format("%H:%M:%S"), self.kind)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReasoningLog {
    entries: Vec<LogEntry>,
}

impl ReasoningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, turn: u64, kind: LogKind) {
        self.entries.push(LogEntry {
            turn,
            timestamp: Utc::now(),
            kind,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn for_turn(&self, turn: u64) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.turn == turn)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_filter_by_turn() {
        let mut log = ReasoningLog::new();
        log.record(1, LogKind::Retrieval { facts: vec![] });
        log.record(2, LogKind::TurnFailed { error: "model timed out".into() });
        log.record(2, LogKind::Suggestion { text: "buy milk?".into() });

        assert_eq!(log.len(), 3);
        assert_eq!(log.for_turn(2).count(), 2);
        assert!(matches!(log.entries()[0].kind, LogKind::Retrieval { .. }));
    }

    #[test]
    fn display_is_readable() {
        let kind = LogKind::Retrieval {
            facts: vec![("User preference: I like tea".into(), 0.8125)],
        };
        assert_eq!(kind.to_string(), "Retrieved memory: [0.81] User preference: I like tea;");

        let kind = LogKind::Observation {
            tool: "search".into(),
            output: "search unavailable".into(),
            success: false,
        };
        assert_eq!(kind.to_string(), "Observation from search (degraded): search unavailable");
    }
}
