//! `add_todo`: append a task to the to-do list.

use async_trait::async_trait;
use openclaw_core::error::ToolError;
use openclaw_core::tool::{Tool, ToolResult};
use crate::todo::TodoList;

pub struct AddTodoTool {
    list: TodoList,
}

impl AddTodoTool {
    pub fn new(list: TodoList) -> Self {
        Self { list }
    }
}

/// Pull a non-empty `description` out of tool arguments.
pub(crate) fn description_arg(arguments: &serde_json::Value) -> Result<&str, ToolError> {
    arguments["description"]
        .as_str()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments("Missing 'description' argument".into()))
}

#[async_trait]
impl Tool for AddTodoTool {
    fn name(&self) -> &str {
        "add_todo"
    }

    fn description(&self) -> &str {
        "Add a task to the user's to-do list. Use only when the user explicitly asks to create a task."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "What needs to be done"
                }
            },
            "required": ["description"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let description = description_arg(&arguments)?;
        let item = self.list.add(description).await;
        Ok(ToolResult::ok(format!("Task '{}' added.", item.description))
            .with_data(serde_json::json!({ "id": item.id })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn adds_a_pending_item() {
        let list = TodoList::in_memory();
        let tool = AddTodoTool::new(list.clone());

        let result = tool
            .execute(serde_json::json!({"description": "  buy milk "}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "Task 'buy milk' added.");
        let pending = list.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(result.data.unwrap()["id"], pending[0].id.as_str());
    }

    #[tokio::test]
    async fn blank_description_is_invalid() {
        let tool = AddTodoTool::new(TodoList::in_memory());
        let err = tool.execute(serde_json::json!({"description": "   "})).await;
        assert!(matches!(err, Err(ToolError::InvalidArguments(_))));
        let err = tool.execute(serde_json::json!({})).await;
        assert!(matches!(err, Err(ToolError::InvalidArguments(_))));
    }
}
