//! `complete_todo`: mark the best-matching pending task as done.

use async_trait::async_trait;
use openclaw_core::error::ToolError;
use openclaw_core::tool::{Tool, ToolResult};
use crate::add_todo::description_arg;
use crate::todo::{CompleteOutcome, TodoList};

pub struct CompleteTodoTool {
    list: TodoList,
}

impl CompleteTodoTool {
    pub fn new(list: TodoList) -> Self {
        Self { list }
    }
}

#[async_trait]
impl Tool for CompleteTodoTool {
    fn name(&self) -> &str {
        "complete_todo"
    }

    fn description(&self) -> &str {
        "Mark a task on the to-do list as done. Use only when the user clearly says the task is finished."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "description": {
                    "type": "string",
                    "description": "The task as the user described it; need not match exactly"
                }
            },
            "required": ["description"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = description_arg(&arguments)?;
        let result = match self.list.complete(query).await {
            CompleteOutcome::Completed(item) => {
                ToolResult::ok(format!("Task '{}' marked as done.", item.description))
                    .with_data(serde_json::json!({ "id": item.id }))
            }
            CompleteOutcome::NotFound => ToolResult::ok("No matching task found."),
            CompleteOutcome::NothingPending => ToolResult::ok("There are no tasks to complete."),
        };
        Ok(result)
    }
}
