//! Proactive suggestions from the to-do list.
//!
//! Advisory only: the monitor reads pending tasks and phrases a nudge, it
//! never runs a tool.

use openclaw_tools::TodoList;

/// Most tasks named in a single suggestion.
const MAX_LISTED: usize = 3;

#[derive(Clone)]
pub struct ProactivityMonitor {
    todos: TodoList,
}

impl ProactivityMonitor {
    pub fn new(todos: TodoList) -> Self {
        Self { todos }
    }

    pub async fn pending(&self) -> usize {
        self.todos.pending().await.len()
    }

    /// A suggestion about pending work, or `None` when nothing is pending.
    pub async fn check(&self) -> Option<String> {
        let pending = self.todos.pending().await;
        match pending.as_slice() {
            [] => None,
            [only] => Some(format!(
                "I see we still need to '{}'. Shall I handle it now?",
                only.description
            )),
            many => {
                let listed: Vec<String> = many
                    .iter()
                    .take(MAX_LISTED)
                    .map(|t| format!("'{}'", t.description))
                    .collect();
                let more = many.len().saturating_sub(MAX_LISTED);
                let tail = if more > 0 { format!(" and {more} more") } else { String::new() };
                Some(format!(
                    "I see we still have {} open tasks: {}{tail}. Shall I handle one now?",
                    many.len(),
                    listed.join(", ")
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn silent_when_nothing_pending() {
        let todos = TodoList::in_memory();
        let monitor = ProactivityMonitor::new(todos.clone());
        assert!(monitor.check().await.is_none());

        todos.add("buy milk").await;
        todos.complete("buy milk").await;
        assert!(monitor.check().await.is_none());
    }

    #[tokio::test]
    async fn single_task_suggestion() {
        let todos = TodoList::in_memory();
        todos.add("buy milk").await;
        let text = ProactivityMonitor::new(todos).check().await.unwrap();
        assert_eq!(text, "I see we still need to 'buy milk'. Shall I handle it now?");
    }

    #[tokio::test]
    async fn lists_at_most_three() {
        let todos = TodoList::in_memory();
        for task in ["a1", "b2", "c3", "d4", "e5"] {
            todos.add(task).await;
        }
        let text = ProactivityMonitor::new(todos).check().await.unwrap();
        assert_eq!(
            text,
            "I see we still have 5 open tasks: 'a1', 'b2', 'c3' and 2 more. Shall I handle one now?"
        );
    }
}
