//! Built-in tools for OpenClaw.
//!
//! The agent can search the web, manage a persistent to-do list, and read
//! the date. Every tool is a plain function of its arguments; none of them
//! calls the language model.

pub mod add_todo;
pub mod complete_todo;
pub mod date;
pub mod duckduckgo;
pub mod fuzzy;
pub mod todo;
pub mod web_search;

use openclaw_core::tool::ToolRegistry;

pub use add_todo::AddTodoTool;
pub use complete_todo::CompleteTodoTool;
pub use date::CurrentDateTool;
pub use duckduckgo::DuckDuckGoSearch;
pub use fuzzy::{DEFAULT_MATCH_THRESHOLD, similarity};
pub use todo::{CompleteOutcome, TodoItem, TodoList, TodoStatus};
pub use web_search::SearchTool;

/// Create a registry with the to-do and date tools, plus `search` when a
/// search tool is supplied.
pub fn default_registry(todos: TodoList, search: Option<SearchTool>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(AddTodoTool::new(todos.clone())));
    registry.register(Box::new(CompleteTodoTool::new(todos)));
    registry.register(Box::new(CurrentDateTool::new()));
    if let Some(search) = search {
        registry.register(Box::new(search));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_without_search() {
        let registry = default_registry(TodoList::in_memory(), None);
        assert_eq!(registry.names(), vec!["add_todo", "complete_todo", "current_date"]);
    }

    #[tokio::test]
    async fn registry_tools_share_one_list() {
        let todos = TodoList::in_memory();
        let registry = default_registry(todos.clone(), None);

        let call = |name: &str, description: &str| openclaw_core::tool::ToolCall {
            id: "c1".into(),
            name: name.into(),
            arguments: serde_json::json!({ "description": description }),
        };

        registry.execute(&call("add_todo", "buy milk")).await.unwrap();
        let done = registry.execute(&call("complete_todo", "buy milk")).await.unwrap();
        assert_eq!(done.output, "Task 'buy milk' marked as done.");
        assert!(todos.pending().await.is_empty());
    }
}
