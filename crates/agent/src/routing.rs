//! Deterministic intent routing.
//!
//! A handful of common requests are recognised from the user's own words,
//! so they work even when the model's output is unusable. Matching is
//! case-insensitive and checked in a fixed order; the first intent wins.

use regex_lite::Regex;
use crate::step::{ActionRequest, ReasoningStep};

pub const PREFERENCE_ACK: &str = "Got it. I'll remember that.";

const PREFERENCE_PREFIXES: &[&str] = &["i like", "i love", "i prefer", "my favorite", "remember"];
const COMPLETE_TRIGGERS: &[&str] = &["i completed", "i finished", "i did", "completed"];
const ADD_TRIGGERS: &[&str] = &["remind me to", "i need to", "i have to"];
const DATE_PHRASES: &[&str] = &[
    "today's date",
    "current date",
    "what day is it",
    "what is the date",
    "what's the date",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutedIntent {
    RememberPreference { fact: String },
    CompleteTask { description: String },
    AddTask { description: String },
    CurrentDate,
}

impl RoutedIntent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RememberPreference { .. } => "remember_preference",
            Self::CompleteTask { .. } => "complete_task",
            Self::AddTask { .. } => "add_task",
            Self::CurrentDate => "current_date",
        }
    }

    /// Whether acting on this intent leaves user state untouched.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::CurrentDate)
    }

    /// The reasoning step this intent stands for.
    pub fn into_step(self) -> ReasoningStep {
        let thought = format!("Recognised a {} request.", self.name().replace('_', " "));
        match self {
            Self::RememberPreference { fact } => {
                ReasoningStep::answer(thought, PREFERENCE_ACK).remembering(fact)
            }
            Self::CompleteTask { description } => ReasoningStep::act(
                thought,
                ActionRequest::new("complete_todo", serde_json::json!({ "description": description })),
            )
            .answered_by_observation(),
            Self::AddTask { description } => ReasoningStep::act(
                thought,
                ActionRequest::new("add_todo", serde_json::json!({ "description": description })),
            )
            .answered_by_observation(),
            Self::CurrentDate => {
                ReasoningStep::act(thought, ActionRequest::new("current_date", serde_json::json!({})))
                    .answered_by_observation()
            }
        }
    }
}

/// Recognise a routed intent in `text`.
pub fn route(text: &str) -> Option<RoutedIntent> {
    let original = text.trim();
    if original.is_empty() {
        return None;
    }
    // ASCII lowering keeps byte offsets aligned with `original`
    let lower = original.to_ascii_lowercase();

    if PREFERENCE_PREFIXES.iter().any(|p| starts_with_word(&lower, p)) && !lower.ends_with('?') {
        return Some(RoutedIntent::RememberPreference {
            fact: format!("User preference: {original}"),
        });
    }

    if let Some(description) = complete_target(original, &lower) {
        return Some(RoutedIntent::CompleteTask { description });
    }

    if let Some(description) = add_target(original, &lower) {
        return Some(RoutedIntent::AddTask { description });
    }

    if is_date_request(&lower) {
        return Some(RoutedIntent::CurrentDate);
    }

    None
}

fn complete_target(original: &str, lower: &str) -> Option<String> {
    if let Some(task) = capture(r"\bmark (.+?) as (?:done|complete|completed|finished)\b", original) {
        return Some(task);
    }
    let end = COMPLETE_TRIGGERS.iter().find_map(|t| find_word(lower, t).map(|i| i + t.len()))?;
    let remainder = clean(&original[end..]);
    // "I finished." still completes something; let the fuzzy matcher see it all
    Some(if remainder.is_empty() { clean(original) } else { remainder })
}

fn add_target(original: &str, lower: &str) -> Option<String> {
    if let Some(task) = capture(r"\badd (.+?) to (?:my )?(?:todo|to-do|task)", original) {
        return Some(task);
    }
    let end = ADD_TRIGGERS.iter().find_map(|t| find_word(lower, t).map(|i| i + t.len()))?;
    let remainder = clean(&original[end..]);
    (!remainder.is_empty()).then_some(remainder)
}

fn is_date_request(lower: &str) -> bool {
    if DATE_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    words.contains(&"today") && (words.contains(&"date") || words.contains(&"day"))
}

fn capture(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(&format!("(?i){pattern}")).ok()?;
    let task = clean(re.captures(text)?.get(1)?.as_str());
    (!task.is_empty()).then_some(task)
}

/// Byte offset of `needle` in `haystack` where it stands as whole words.
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric)
            && !after.is_some_and(|c| c.is_alphanumeric() || c == '\'')
    })
}

fn starts_with_word(haystack: &str, prefix: &str) -> bool {
    find_word(haystack, prefix) == Some(0)
}

fn clean(text: &str) -> String {
    text.trim()
        .trim_start_matches([':', ',', '-'])
        .trim_end_matches(['.', '!', '?'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preference_is_remembered() {
        assert_eq!(
            route("I like green tea"),
            Some(RoutedIntent::RememberPreference {
                fact: "User preference: I like green tea".into()
            })
        );
        assert!(matches!(route("Remember that my cat is Miso"), Some(RoutedIntent::RememberPreference { .. })));
    }

    #[test]
    fn preference_question_is_not_routed() {
        assert_eq!(route("I like what?"), None);
        assert_eq!(route("Do you remember what I like?"), None);
    }

    #[test]
    fn remind_me_adds_task() {
        assert_eq!(
            route("remind me to buy milk"),
            Some(RoutedIntent::AddTask { description: "buy milk".into() })
        );
        assert_eq!(
            route("Please add Call Mom to my todo list"),
            Some(RoutedIntent::AddTask { description: "Call Mom".into() })
        );
    }

    #[test]
    fn empty_task_does_not_route() {
        assert_eq!(route("remind me to"), None);
        assert_eq!(route("I need to."), None);
    }

    #[test]
    fn completion_phrases() {
        assert_eq!(
            route("I finished buying milk"),
            Some(RoutedIntent::CompleteTask { description: "buying milk".into() })
        );
        assert_eq!(
            route("mark buy groceries as done"),
            Some(RoutedIntent::CompleteTask { description: "buy groceries".into() })
        );
        assert_eq!(
            route("I did it!"),
            Some(RoutedIntent::CompleteTask { description: "it".into() })
        );
    }

    #[test]
    fn contraction_is_not_a_completion() {
        assert_eq!(route("I didn't sleep well"), None);
    }

    #[test]
    fn completion_wins_over_addition() {
        assert!(matches!(
            route("I completed what I had to do"),
            Some(RoutedIntent::CompleteTask { .. })
        ));
    }

    #[test]
    fn date_requests() {
        assert_eq!(route("What's the date?"), Some(RoutedIntent::CurrentDate));
        assert_eq!(route("what day is it today"), Some(RoutedIntent::CurrentDate));
        assert_eq!(route("Tell me today's date"), Some(RoutedIntent::CurrentDate));
        assert_eq!(route("How are you today?"), None);
    }

    #[test]
    fn plain_questions_do_not_route() {
        assert_eq!(route("What is the capital of France?"), None);
        assert_eq!(route(""), None);
    }

    #[test]
    fn routed_actions_answer_from_observation() {
        let step = RoutedIntent::AddTask { description: "buy milk".into() }.into_step();
        let action = step.action.as_ref().unwrap();
        assert_eq!(action.tool_name, "add_todo");
        assert_eq!(action.arguments["description"], "buy milk");
        assert_eq!(step.synthesis, crate::step::Synthesis::Observation);

        let step = RoutedIntent::RememberPreference { fact: "User preference: x".into() }.into_step();
        assert_eq!(step.final_answer.as_deref(), Some(PREFERENCE_ACK));
        assert!(step.save_memory);
    }
}
