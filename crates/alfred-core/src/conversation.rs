//! Conversation transcript model.

use alfred_engine::{PromptMessage, Role, ToolCallRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message stored in a conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role that produced the message.
    pub role: Role,
    /// Message content.
    pub content: String,
    /// Timestamp for the message.
    pub created_at: DateTime<Utc>,
    /// The tool call this message answers, for tool messages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallRequest>,
}

impl Message {
    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Build an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Build a tool-result message for the given call.
    pub fn tool(call: ToolCallRequest, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            created_at: Utc::now(),
            tool_call: Some(call),
        }
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
            tool_call: None,
        }
    }

    /// Project the message into the engine's prompt contract.
    pub fn to_prompt(&self) -> PromptMessage {
        match (&self.role, &self.tool_call) {
            (Role::Tool, Some(call)) => PromptMessage::tool_result(&call.id, &self.content),
            _ => PromptMessage::new(self.role, &self.content),
        }
    }
}

/// Ordered, append-only message sequence owned by one orchestrator session.
/// Messages are never reordered; windowing only limits what is sent to the
/// backend, not what is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    /// Session identifier owning this conversation.
    pub id: Uuid,
    /// Ordered list of messages.
    messages: Vec<Message>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation for a new session.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append a message to the transcript.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a batch of messages in order.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent `max_messages` messages for context budgeting.
    pub fn window(&self, max_messages: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(max_messages);
        &self.messages[start..]
    }

    /// Total message count.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Conversation, Message};
    use alfred_engine::{Role, ToolCallRequest};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn window_keeps_most_recent_messages() {
        let mut conversation = Conversation::new();
        for i in 0..5 {
            conversation.append(Message::user(format!("message {i}")));
        }
        let window = conversation.window(2);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "message 3");
        assert_eq!(window[1].content, "message 4");
        // windowing never shrinks the transcript itself
        assert_eq!(conversation.len(), 5);
    }

    #[test]
    fn window_larger_than_transcript_returns_all() {
        let mut conversation = Conversation::new();
        conversation.append(Message::user("only"));
        assert_eq!(conversation.window(10).len(), 1);
    }

    #[test]
    fn tool_message_projects_call_id_into_prompt() {
        let call = ToolCallRequest {
            id: "call_1".to_string(),
            name: "echo".to_string(),
            arguments: json!({"text": "ping"}),
        };
        let message = Message::tool(call, "pong");
        let prompt = message.to_prompt();
        assert_eq!(prompt.role, Role::Tool);
        assert_eq!(prompt.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(prompt.content, "pong");
    }
}
