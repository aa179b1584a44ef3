//! Model output parsing.
//!
//! Small local models often wrap their JSON in prose or code fences, cut it
//! off, or ignore the format entirely. [`parse`] runs an ordered ladder of
//! pure strategies and takes the first that yields a step; the last rung
//! always succeeds, so a turn never stalls on bad output.

use regex_lite::Regex;
use serde_json::Value;
use crate::routing;
use crate::step::{ActionRequest, ReasoningStep};

pub const CLARIFICATION: &str =
    "Sorry, I couldn't work out how to handle that. Could you rephrase your request?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseStrategy {
    /// The whole text is a step object
    Strict,
    /// Prose or code fences around the object
    Unfenced,
    /// First balanced `{...}` span
    Extracted,
    /// Intent routing on the user's words
    Routed,
    /// Ask the user to rephrase
    Clarification,
}

impl ParseStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Unfenced => "unfenced",
            Self::Extracted => "extracted",
            Self::Routed => "routed",
            Self::Clarification => "clarification",
        }
    }

    /// Whether the model's own output was usable.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Strict | Self::Unfenced | Self::Extracted)
    }
}

impl std::fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ParseInput<'a> {
    /// Raw model output
    pub raw: &'a str,
    /// What the user said this turn
    pub utterance: &'a str,
}

#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub step: ReasoningStep,
    pub strategy: ParseStrategy,
}

type Strategy = fn(&ParseInput<'_>) -> Option<ReasoningStep>;

const LADDER: &[(ParseStrategy, Strategy)] = &[
    (ParseStrategy::Strict, strict),
    (ParseStrategy::Unfenced, unfenced),
    (ParseStrategy::Extracted, extracted),
    (ParseStrategy::Routed, routed),
    (ParseStrategy::Clarification, clarification),
];

const FOLLOWUP_LADDER: &[(ParseStrategy, Strategy)] = &[
    (ParseStrategy::Strict, strict),
    (ParseStrategy::Unfenced, unfenced),
    (ParseStrategy::Extracted, extracted),
    (ParseStrategy::Clarification, clarification),
];

/// Turn raw model output into a reasoning step. Never fails.
pub fn parse(raw: &str, utterance: &str) -> ParseOutcome {
    parse_with(raw, utterance, LADDER)
}

/// Like [`parse`] but without the routing rung, for follow-up hops where
/// the user's words have already been acted on.
pub fn parse_followup(raw: &str) -> ParseOutcome {
    parse_with(raw, "", FOLLOWUP_LADDER)
}

fn parse_with(raw: &str, utterance: &str, ladder: &[(ParseStrategy, Strategy)]) -> ParseOutcome {
    let input = ParseInput { raw, utterance };
    for (strategy, run) in ladder {
        if let Some(step) = run(&input) {
            return ParseOutcome {
                step,
                strategy: *strategy,
            };
        }
    }
    ParseOutcome {
        step: clarification_step(),
        strategy: ParseStrategy::Clarification,
    }
}

fn strict(input: &ParseInput<'_>) -> Option<ReasoningStep> {
    step_from_str(input.raw.trim())
}

fn unfenced(input: &ParseInput<'_>) -> Option<ReasoningStep> {
    let raw = input.raw;
    if let Some(inner) = Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```")
        .ok()
        .and_then(|re| re.captures(raw))
        .and_then(|c| c.get(1))
    {
        if let Some(step) = step_from_str(inner.as_str()) {
            return Some(step);
        }
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| step_from_str(&raw[start..=end])).flatten()
}

fn extracted(input: &ParseInput<'_>) -> Option<ReasoningStep> {
    let raw = input.raw;
    raw.match_indices('{')
        .filter_map(|(start, _)| balanced_span(&raw[start..]))
        .find_map(step_from_str)
}

fn routed(input: &ParseInput<'_>) -> Option<ReasoningStep> {
    // Model text only ever routes to intents that change nothing
    routing::route(input.utterance)
        .or_else(|| routing::route(input.raw).filter(routing::RoutedIntent::is_read_only))
        .map(routing::RoutedIntent::into_step)
}

fn clarification(_input: &ParseInput<'_>) -> Option<ReasoningStep> {
    Some(clarification_step())
}

fn clarification_step() -> ReasoningStep {
    ReasoningStep::answer("The model output could not be understood.", CLARIFICATION)
}

/// The shortest prefix of `text` (which starts at `{`) whose braces
/// balance, ignoring braces inside JSON strings.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn step_from_str(text: &str) -> Option<ReasoningStep> {
    let value: Value = serde_json::from_str(text).ok()?;
    step_from_value(&value)
}

/// Read a step out of a JSON value, tolerating the usual small-model
/// deviations. Returns `None` when there is neither an action nor an answer.
pub fn step_from_value(value: &Value) -> Option<ReasoningStep> {
    let obj = value.as_object()?;

    let thought = text_field(obj.get("thought")).unwrap_or_default();
    let final_answer = text_field(obj.get("final_answer"));
    let memory_content = text_field(obj.get("memory_content"));
    let save_memory = match obj.get("save_memory") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    };

    let action = match obj.get("action") {
        Some(Value::String(name)) => tool_name(name).map(|name| {
            ActionRequest::new(name, obj.get("action_input").cloned().unwrap_or(Value::Null))
        }),
        Some(Value::Object(inner)) => inner
            .get("tool_name")
            .or_else(|| inner.get("name"))
            .and_then(Value::as_str)
            .and_then(tool_name)
            .map(|name| {
                let arguments = inner
                    .get("arguments")
                    .or_else(|| inner.get("input"))
                    .or_else(|| obj.get("action_input"))
                    .cloned()
                    .unwrap_or(Value::Null);
                ActionRequest::new(name, arguments)
            }),
        _ => None,
    };

    let mut step = match (action, final_answer) {
        (Some(action), _) => ReasoningStep::act(thought, action),
        (None, Some(answer)) => ReasoningStep::answer(thought, answer),
        (None, None) => return None,
    };
    step.save_memory = save_memory;
    step.memory_content = memory_content;
    Some(step)
}

fn text_field(value: Option<&Value>) -> Option<String> {
    let text = value?.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Canonical tool name, or `None` when the model chose no action.
fn tool_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_ascii_lowercase();
    let canonical = match name.as_str() {
        "" | "none" | "null" | "no_action" => return None,
        "date" | "get_current_date" => "current_date",
        "web_search" | "internet_search" => "search",
        "add_task" | "todo" => "add_todo",
        "complete_task" | "done" => "complete_todo",
        other => other,
    };
    Some(canonical.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Synthesis;

    const STEP: &str = r#"{"thought":"simple greeting","action":"none","action_input":"","save_memory":false,"memory_content":"","final_answer":"Hello!"}"#;

    #[test]
    fn strict_json() {
        let out = parse(STEP, "hi");
        assert_eq!(out.strategy, ParseStrategy::Strict);
        assert_eq!(out.step.final_answer.as_deref(), Some("Hello!"));
        assert!(out.step.action.is_none());
    }

    #[test]
    fn fenced_json() {
        let raw = format!("Sure! Here you go:\n```json\n{STEP}\n```\nHope that helps.");
        let out = parse(&raw, "hi");
        assert_eq!(out.strategy, ParseStrategy::Unfenced);
        assert_eq!(out.step.final_answer.as_deref(), Some("Hello!"));
    }

    #[test]
    fn prose_around_object() {
        let raw = format!("I think this is right: {STEP} -- done");
        assert_eq!(parse(&raw, "hi").strategy, ParseStrategy::Unfenced);
    }

    #[test]
    fn balanced_span_after_stray_braces() {
        // Outer first-{ to last-} slice is not valid JSON
        let raw = format!("{STEP} and then {{oops}}");
        let out = parse(&raw, "hi");
        assert_eq!(out.strategy, ParseStrategy::Extracted);
        assert_eq!(out.step.final_answer.as_deref(), Some("Hello!"));
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_extraction() {
        let raw = r#"note {"thought":"a } in text","final_answer":"use {braces} \" carefully"} then {"x": }"#;
        let out = parse(raw, "hi");
        assert_eq!(out.strategy, ParseStrategy::Extracted);
        assert_eq!(out.step.final_answer.as_deref(), Some(r#"use {braces} " carefully"#));
    }

    #[test]
    fn action_wins_over_answer() {
        let raw = r#"{"thought":"check","action":"search","action_input":"rust 2024","final_answer":"I guess"}"#;
        let step = parse(raw, "").step;
        let action = step.action.unwrap();
        assert_eq!(action.tool_name, "search");
        assert_eq!(action.arguments, Value::String("rust 2024".into()));
        assert!(step.final_answer.is_none());
        assert_eq!(step.synthesis, Synthesis::Model);
    }

    #[test]
    fn tool_aliases_and_object_actions() {
        let step = parse(r#"{"action":"date"}"#, "").step;
        assert_eq!(step.action.unwrap().tool_name, "current_date");

        let raw = r#"{"action":{"name":"add_task","arguments":{"description":"buy milk"}}}"#;
        let action = parse(raw, "").step.action.unwrap();
        assert_eq!(action.tool_name, "add_todo");
        assert_eq!(action.arguments["description"], "buy milk");
    }

    #[test]
    fn save_memory_accepts_string_flag() {
        let raw = r#"{"final_answer":"Noted.","save_memory":"true","memory_content":"User's cat is Miso"}"#;
        let step = parse(raw, "").step;
        assert!(step.save_memory);
        assert_eq!(step.memory_content.as_deref(), Some("User's cat is Miso"));
    }

    #[test]
    fn empty_object_does_not_match() {
        assert!(step_from_value(&serde_json::json!({"thought": "hmm", "action": "none"})).is_none());
        assert!(step_from_value(&serde_json::json!(["not", "an", "object"])).is_none());
    }

    #[test]
    fn garbage_routes_on_utterance() {
        let out = parse("I am a teapot", "what's today's date?");
        assert_eq!(out.strategy, ParseStrategy::Routed);
        assert_eq!(out.step.action.unwrap().tool_name, "current_date");
    }

    #[test]
    fn garbage_without_intent_asks_to_rephrase() {
        let out = parse("}}}{{{", "tell me a story");
        assert_eq!(out.strategy, ParseStrategy::Clarification);
        assert_eq!(out.step.final_answer.as_deref(), Some(CLARIFICATION));
    }

    #[test]
    fn model_text_never_becomes_a_preference() {
        let out = parse("I like this question a lot", "hmm");
        assert_eq!(out.strategy, ParseStrategy::Clarification);
        assert!(!out.step.save_memory);
    }

    #[test]
    fn model_text_never_touches_the_todo_list() {
        for raw in [
            "Sure! To answer that I need to explain how photosynthesis works in plants.",
            "The knight completed his quest at dawn.",
            "You could say: remind me to stretch.",
        ] {
            let out = parse(raw, "How do plants make food?");
            assert_eq!(out.strategy, ParseStrategy::Clarification, "raw {raw:?}");
            assert!(out.step.action.is_none(), "raw {raw:?}");
        }
    }

    #[test]
    fn model_text_may_still_ask_for_the_date() {
        let out = parse("I should check what day is it first", "hmm");
        assert_eq!(out.strategy, ParseStrategy::Routed);
        assert_eq!(out.step.action.unwrap().tool_name, "current_date");
    }

    #[test]
    fn followup_never_routes() {
        let out = parse_followup("garbage about today's date");
        assert_eq!(out.strategy, ParseStrategy::Clarification);
    }

    #[test]
    fn every_input_yields_a_step() {
        let inputs = [
            "",
            "   ",
            "{",
            "}",
            r#"{"thought": "truncated", "final_ans"#,
            "```json\n{\"thought\":",
            "\"\\\"",
            "{{{{{{{{{{",
            "null",
            "42",
            "ñ{ü}ß",
        ];
        for raw in inputs {
            let out = parse(raw, "");
            let step = out.step;
            assert!(
                step.action.is_some() ^ step.final_answer.is_some(),
                "input {raw:?} gave {step:?}"
            );
        }
    }
}
