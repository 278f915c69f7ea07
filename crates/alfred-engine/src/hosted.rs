//! Hosted backend variant speaking an OpenAI-style HTTP API.
//!
//! The adapter translates normalized requests into the provider wire format
//! and folds the response back into `GenerateResult`. Nothing outside this
//! module depends on the payload shapes.

use crate::backend::{EmbeddingBackend, ReasoningBackend, resolve_api_key};
use crate::error::EngineError;
use crate::types::{GenerateRequest, GenerateResult, PromptMessage, Role, ToolCallRequest};
use alfred_config::{BackendConfig, EmbeddingConfig};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Hosted chat-completions backend.
pub struct HostedReasoningBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl HostedReasoningBackend {
    /// Build the backend from config, resolving credentials from the
    /// environment.
    pub fn new(config: &BackendConfig) -> Result<Self, EngineError> {
        let api_key = resolve_api_key(config.api_key_env.as_deref())?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| EngineError::Configuration(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: config.model.clone(),
            temperature: config.params.temperature,
            max_tokens: config.params.max_tokens,
        })
    }
}

#[async_trait]
impl ReasoningBackend for HostedReasoningBackend {
    fn name(&self) -> &str {
        "hosted"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, EngineError> {
        let body = build_chat_request(
            &self.model,
            self.temperature,
            self.max_tokens,
            request,
        );
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EngineError::Unavailable(err.to_string()))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|err| EngineError::Unavailable(err.to_string()))?;
        if !status.is_success() {
            return Err(classify_http_failure(status.as_u16(), &payload));
        }

        let value: Value = serde_json::from_str(&payload)
            .map_err(|err| EngineError::Protocol(format!("undecodable response: {err}")))?;
        let result = parse_chat_response(&value)?;
        debug!(
            "hosted generate ok (model={}, tool_calls={})",
            self.model,
            result.tool_calls.len()
        );
        Ok(result)
    }
}

/// Hosted embeddings backend.
pub struct HostedEmbeddingBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl HostedEmbeddingBackend {
    /// Build the backend from config, resolving credentials from the
    /// environment.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EngineError> {
        let api_key = resolve_api_key(config.api_key_env.as_deref())?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(EMBEDDING_TIMEOUT_SECS))
            .build()
            .map_err(|err| EngineError::Configuration(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for HostedEmbeddingBackend {
    fn name(&self) -> &str {
        "hosted"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        let body = EmbeddingRequestWire {
            model: self.model.clone(),
            input: vec![text.to_string()],
        };
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EngineError::Embedding(err.to_string()))?;
        if !response.status().is_success() {
            return Err(EngineError::Embedding(format!(
                "embedding request failed with status {}",
                response.status()
            )));
        }
        let wire: EmbeddingResponseWire = response
            .json()
            .await
            .map_err(|err| EngineError::Embedding(err.to_string()))?;
        let embedding = wire
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| EngineError::Embedding("empty embedding response".to_string()))?;
        if embedding.len() != self.dimension {
            return Err(EngineError::Embedding(format!(
                "provider returned dimension {} but config declares {}",
                embedding.len(),
                self.dimension
            )));
        }
        Ok(embedding)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequestWire {
    model: String,
    messages: Vec<ChatMessageWire>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolWire>,
}

#[derive(Debug, Serialize)]
struct ChatMessageWire {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolWire {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolFunctionWire,
}

#[derive(Debug, Serialize)]
struct ToolFunctionWire {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequestWire {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponseWire {
    data: Vec<EmbeddingItemWire>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItemWire {
    embedding: Vec<f32>,
}

/// Map a prompt message onto the provider role vocabulary. Recall context
/// rides as a system message since providers have no memory role.
fn wire_role(message: &PromptMessage) -> &'static str {
    match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
        Role::Memory => "system",
    }
}

/// Translate a normalized request into the chat-completions wire format.
fn build_chat_request(
    model: &str,
    temperature: f32,
    max_tokens: u32,
    request: &GenerateRequest,
) -> ChatRequestWire {
    ChatRequestWire {
        model: model.to_string(),
        messages: request
            .messages
            .iter()
            .map(|message| ChatMessageWire {
                role: wire_role(message),
                content: message.content.clone(),
                tool_call_id: message.tool_call_id.clone(),
            })
            .collect(),
        temperature,
        max_tokens,
        tools: request
            .tools
            .iter()
            .map(|spec| ToolWire {
                kind: "function",
                function: ToolFunctionWire {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    parameters: spec.args_schema.clone(),
                },
            })
            .collect(),
    }
}

/// Fold a chat-completions response into a normalized result.
fn parse_chat_response(value: &Value) -> Result<GenerateResult, EngineError> {
    let message = value
        .pointer("/choices/0/message")
        .ok_or_else(|| EngineError::Protocol("response has no choices".to_string()))?;

    let text = message
        .get("content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .map(str::to_string);

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
        for call in calls {
            let id = call
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| EngineError::Protocol("tool call missing id".to_string()))?;
            let name = call
                .pointer("/function/name")
                .and_then(Value::as_str)
                .ok_or_else(|| EngineError::Protocol("tool call missing name".to_string()))?;
            let raw_arguments = call
                .pointer("/function/arguments")
                .and_then(Value::as_str)
                .unwrap_or("{}");
            let arguments: Value = serde_json::from_str(raw_arguments).map_err(|err| {
                EngineError::Protocol(format!("tool call arguments are not JSON: {err}"))
            })?;
            tool_calls.push(ToolCallRequest {
                id: id.to_string(),
                name: name.to_string(),
                arguments,
            });
        }
    }

    if text.is_none() && tool_calls.is_empty() {
        return Err(EngineError::Protocol(
            "response carried neither text nor tool calls".to_string(),
        ));
    }
    Ok(GenerateResult { text, tool_calls })
}

/// Classify a non-success HTTP status into the engine error taxonomy.
fn classify_http_failure(status: u16, payload: &str) -> EngineError {
    if payload.contains("context_length_exceeded") || payload.contains("maximum context length") {
        return EngineError::ContextOverflow(format!("status {status}"));
    }
    match status {
        408 | 429 | 500..=599 => {
            EngineError::Unavailable(format!("backend returned status {status}"))
        }
        _ => EngineError::Protocol(format!("backend returned status {status}: {payload}")),
    }
}
