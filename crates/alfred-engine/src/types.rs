//! Normalized request/response types shared by all backend variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speaker role for a prompt message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User-authored message.
    User,
    /// Assistant-authored message.
    Assistant,
    /// Output of a tool invocation.
    Tool,
    /// Synthetic recall context injected ahead of the live window.
    /// Never appended to a conversation.
    Memory,
}

/// One message in a backend request prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptMessage {
    /// Role that produced the message.
    pub role: Role,
    /// Message content.
    pub content: String,
    /// Call id this message answers, set only for tool results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl PromptMessage {
    /// Build a prompt message from role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Build a tool-result message answering the given call.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// Tool metadata presented to the backend for tool selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    /// Tool name, unique within a session.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON schema for tool arguments.
    pub args_schema: Value,
}

/// A tool invocation requested by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    /// Provider-assigned call id, echoed back with the result.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments for the invocation.
    pub arguments: Value,
}

/// Normalized generation request: the windowed conversation (recall context
/// included) and the tools currently registered.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// Prompt messages, oldest first.
    pub messages: Vec<PromptMessage>,
    /// Specs for tools the backend may request.
    pub tools: Vec<ToolSpec>,
}

/// Normalized generation result: final text, tool calls, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResult {
    /// Final reply text, when the backend produced one.
    pub text: Option<String>,
    /// Tool invocations requested by the backend, in request order.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl GenerateResult {
    /// Build a text-only result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Build a tool-call-only result.
    pub fn tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            text: None,
            tool_calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerateResult, Role};
    use pretty_assertions::assert_eq;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Memory).expect("serialize"),
            "\"memory\""
        );
        let role: Role = serde_json::from_str("\"assistant\"").expect("deserialize");
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn result_constructors() {
        let result = GenerateResult::text("done");
        assert_eq!(result.text.as_deref(), Some("done"));
        assert!(result.tool_calls.is_empty());
    }
}
