//! Clock tool: reports the current UTC time.

use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use serde_json::{Value, json};

/// Reports the current UTC timestamp.
#[derive(Debug, Clone, Default)]
pub struct ClockTool;

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "clock"
    }

    fn description(&self) -> &str {
        "Report the current date and time in UTC."
    }

    fn args_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn invoke(&self, _args: Value) -> Result<String, ToolError> {
        Ok(chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ClockTool;
    use crate::tool::Tool;
    use serde_json::json;

    #[tokio::test]
    async fn reports_utc_time() {
        let output = ClockTool.invoke(json!({})).await.expect("invoke");
        assert!(output.ends_with("UTC"));
    }
}
