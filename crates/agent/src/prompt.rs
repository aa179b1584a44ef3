//! Prompt assembly.
//!
//! Everything here is a pure function of one config snapshot, the recalled
//! memories and the tool definitions, so a turn's prompt cannot change
//! under it.

use openclaw_core::agent::AgentConfig;
use openclaw_core::memory::MemoryRecord;
use openclaw_core::message::Message;
use openclaw_core::tool::ToolDefinition;
use crate::step::ReasoningStep;

const RESPONSE_FORMAT: &str = r#"Respond ONLY with a JSON object in this exact format:
{
  "thought": "your reasoning",
  "action": "tool name or none",
  "action_input": "input for the tool, or empty",
  "save_memory": false,
  "memory_content": "a lasting fact about the user worth remembering, or empty",
  "final_answer": "your answer to the user when action is none"
}"#;

const RULES: &[&str] = &[
    "Use tools ONLY if necessary.",
    "For normal knowledge questions answer directly.",
    "Use add_todo only for explicit task creation.",
    "Use complete_todo only if the user clearly says a task is finished.",
    "Use current_date only for date requests.",
    "Set save_memory to true only for lasting facts about the user.",
];

/// The system prompt for a structured reasoning call.
pub fn system_prompt(config: &AgentConfig, memories: &[MemoryRecord], tools: &[ToolDefinition]) -> String {
    let persona = &config.persona;
    let user = &config.user_profile;

    let mut prompt = format!("You are {}.\nRole: {}.\n", persona.name, persona.role);

    if !persona.instructions.trim().is_empty() {
        prompt.push_str(&format!("\nSystem Instructions:\n{}\n", persona.instructions.trim()));
    }

    prompt.push_str(&format!("\nUser: {}\n", user.name));
    if !user.info.trim().is_empty() {
        prompt.push_str(&format!("User Info:\n{}\n", user.info.trim()));
    }

    prompt.push_str("\nRetrieved Memory:\n");
    if memories.is_empty() {
        prompt.push_str("None\n");
    } else {
        for m in memories {
            prompt.push_str(&format!("- [{:.2}] {}\n", m.score, m.text));
        }
    }

    prompt.push_str("\nAvailable tools:\n");
    for def in tools {
        prompt.push_str(&render_tool(def));
        prompt.push('\n');
    }

    prompt.push_str("\nRules:\n");
    for rule in RULES {
        prompt.push_str(&format!("- {rule}\n"));
    }

    prompt.push('\n');
    prompt.push_str(RESPONSE_FORMAT);
    prompt
}

/// `- name(arg: type, ...): description`
pub fn render_tool(def: &ToolDefinition) -> String {
    let args: Vec<String> = def
        .argument_types()
        .into_iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect();
    format!("- {}({}): {}", def.name, args.join(", "), def.description)
}

/// System prompt, then the context window, then the new user message.
pub fn reasoning_messages(system: &str, history: Vec<Message>, utterance: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system));
    messages.extend(history);
    messages.push(Message::user(utterance));
    messages
}

/// Extend a reasoning conversation with a step and what its tool returned,
/// asking for the next step.
pub fn followup_messages(base: &[Message], step: &ReasoningStep, tool: &str, observation: &str) -> Vec<Message> {
    let mut messages = base.to_vec();
    messages.push(Message::agent(step.to_wire().to_string()));
    messages.push(Message::tool(tool, observation));
    messages
}

/// A plain call turning an observation into the user-facing answer.
pub fn synthesis_messages(config: &AgentConfig, utterance: &str, step: &ReasoningStep, observation: &str) -> Vec<Message> {
    let system = format!(
        "You are {}. Produce the final answer based on the observation.",
        config.persona.name
    );

    let mut user = format!("Question: {utterance}\n");
    if !step.thought.is_empty() {
        user.push_str(&format!("Thought: {}\n", step.thought));
    }
    if let Some(action) = &step.action {
        user.push_str(&format!("Action: {action}\n"));
    }
    user.push_str(&format!("Observation: {observation}"));

    vec![Message::system(system), Message::user(user)]
}
