//! Echo tool: returns its input text.

use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use serde_json::{Value, json};

/// Returns the provided text unchanged.
#[derive(Debug, Clone, Default)]
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the provided text back unchanged."
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {"type": "string", "description": "Text to echo"}
            },
            "required": ["text"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<String, ToolError> {
        let text = args
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArgs {
                tool: "echo".to_string(),
                message: "text must be a string".to_string(),
            })?;
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::EchoTool;
    use crate::tool::Tool;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn echoes_text() {
        let output = EchoTool.invoke(json!({"text": "ping"})).await.expect("invoke");
        assert_eq!(output, "ping");
    }
}
