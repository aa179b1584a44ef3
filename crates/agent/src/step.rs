//! One parsed model step: thought, optional action, optional final answer.

use serde::{Deserialize, Serialize};

/// How the final answer is produced after a tool runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Synthesis {
    /// Ask the model to phrase an answer from the observation
    #[default]
    Model,
    /// The observation itself is the answer
    Observation,
}

/// A tool the model asked to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub tool_name: String,
    /// Raw arguments as the model gave them; bound against the tool schema
    /// before execution
    pub arguments: serde_json::Value,
}

impl ActionRequest {
    pub fn new(tool_name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

impl std::fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.arguments {
            serde_json::Value::Null => write!(f, "{}()", self.tool_name),
            serde_json::Value::String(s) => write!(f, "{}({s:?})", self.tool_name),
            other => write!(f, "{}({other})", self.tool_name),
        }
    }
}

/// A single reasoning step. After parsing, exactly one of `action` and
/// `final_answer` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub thought: String,
    pub action: Option<ActionRequest>,
    pub observation: Option<String>,
    pub final_answer: Option<String>,
    pub save_memory: bool,
    pub memory_content: Option<String>,
    pub synthesis: Synthesis,
}

impl ReasoningStep {
    /// A step that answers directly.
    pub fn answer(thought: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            final_answer: Some(answer.into()),
            ..Self::default()
        }
    }

    /// A step that runs a tool.
    pub fn act(thought: impl Into<String>, action: ActionRequest) -> Self {
        Self {
            thought: thought.into(),
            action: Some(action),
            ..Self::default()
        }
    }

    /// Use the tool observation as the answer.
    pub fn answered_by_observation(mut self) -> Self {
        self.synthesis = Synthesis::Observation;
        self
    }

    /// Ask for `fact` to be kept in long-term memory.
    pub fn remembering(mut self, fact: impl Into<String>) -> Self {
        self.save_memory = true;
        self.memory_content = Some(fact.into());
        self
    }

    /// The step as JSON, the shape the model is asked to produce.
    pub fn to_wire(&self) -> serde_json::Value {
        let (action, input) = match &self.action {
            Some(a) => (a.tool_name.as_str(), a.arguments.clone()),
            None => ("none", serde_json::Value::String(String::new())),
        };
        serde_json::json!({
            "thought": self.thought,
            "action": action,
            "action_input": input,
            "save_memory": self.save_memory,
            "memory_content": self.memory_content.clone().unwrap_or_default(),
            "final_answer": self.final_answer.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_display() {
        let a = ActionRequest::new("add_todo", serde_json::json!({"description": "buy milk"}));
        assert_eq!(a.to_string(), r#"add_todo({"description":"buy milk"})"#);
        assert_eq!(ActionRequest::new("current_date", serde_json::Value::Null).to_string(), "current_date()");
        assert_eq!(
            ActionRequest::new("search", serde_json::json!("rust")).to_string(),
            r#"search("rust")"#
        );
    }

    #[test]
    fn builders_set_expected_fields() {
        let step = ReasoningStep::act("need the date", ActionRequest::new("current_date", serde_json::json!({})))
            .answered_by_observation();
        assert!(step.final_answer.is_none());
        assert_eq!(step.synthesis, Synthesis::Observation);

        let step = ReasoningStep::answer("", "Got it.").remembering("User preference: tea");
        assert!(step.save_memory);
        assert_eq!(step.memory_content.as_deref(), Some("User preference: tea"));
        assert!(step.action.is_none());
    }

    #[test]
    fn wire_form_uses_none_for_no_action() {
        let wire = ReasoningStep::answer("simple", "Hello!").to_wire();
        assert_eq!(wire["action"], "none");
        assert_eq!(wire["final_answer"], "Hello!");
    }
}
