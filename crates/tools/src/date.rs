//! `current_date`: the host's local date.

use async_trait::async_trait;
use chrono::NaiveDate;
use openclaw_core::error::ToolError;
use openclaw_core::tool::{Tool, ToolResult};

const DATE_FORMAT: &str = "%A, %B %d, %Y";

#[derive(Default)]
pub struct CurrentDateTool {
    fixed: Option<NaiveDate>,
}

impl CurrentDateTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always report `date` instead of reading the clock.
    pub fn fixed(date: NaiveDate) -> Self {
        Self { fixed: Some(date) }
    }

    fn today(&self) -> NaiveDate {
        self.fixed
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[async_trait]
impl Tool for CurrentDateTool {
    fn name(&self) -> &str {
        "current_date"
    }

    fn description(&self) -> &str {
        "Get today's date. Use only when the user asks for the date or day."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let today = self.today();
        Ok(ToolResult::ok(today.format(DATE_FORMAT).to_string())
            .with_data(serde_json::json!({ "iso": today.to_string() })))
    }
}
