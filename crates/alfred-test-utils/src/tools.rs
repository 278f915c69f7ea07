//! Stub tools for tests.

use alfred_tools::{Tool, ToolError};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Tool named "echo" that answers "ping" with "pong".
#[derive(Debug, Clone, Default)]
pub struct PingTool;

#[async_trait]
impl Tool for PingTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Answers ping with pong."
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"text": {"type": "string"}},
            "required": ["text"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<String, ToolError> {
        match args.get("text").and_then(Value::as_str) {
            Some("ping") => Ok("pong".to_string()),
            Some(other) => Ok(other.to_string()),
            None => Err(ToolError::InvalidArgs {
                tool: "echo".to_string(),
                message: "text must be a string".to_string(),
            }),
        }
    }
}

/// Tool that always fails, for surfacing-invocation-error tests.
#[derive(Debug, Clone, Default)]
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Always fails."
    }

    fn args_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn invoke(&self, _args: Value) -> Result<String, ToolError> {
        Err(ToolError::Failed {
            tool: "broken".to_string(),
            message: "intentional failure".to_string(),
        })
    }
}
