//! Configuration schema for Alfred.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Root config for the Alfred orchestrator and its backends.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlfredConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub reasoning: BackendConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub debug: bool,
}

impl AlfredConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> AlfredConfigBuilder {
        AlfredConfigBuilder::new()
    }

    /// Validate cross-field constraints after deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reasoning.provider.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                path: "reasoning.provider".to_string(),
                message: "provider must not be empty".to_string(),
            });
        }
        if self.embedding.provider.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                path: "embedding.provider".to_string(),
                message: "provider must not be empty".to_string(),
            });
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigError::InvalidField {
                path: "embedding.dimension".to_string(),
                message: "dimension must be greater than zero".to_string(),
            });
        }
        if self.memory.capacity == 0 {
            return Err(ConfigError::InvalidField {
                path: "memory.capacity".to_string(),
                message: "capacity must be greater than zero".to_string(),
            });
        }
        if self.orchestrator.max_tool_rounds == 0 {
            return Err(ConfigError::InvalidField {
                path: "orchestrator.max_tool_rounds".to_string(),
                message: "max_tool_rounds must be greater than zero".to_string(),
            });
        }
        if self.reasoning.timeout_secs == 0 {
            return Err(ConfigError::InvalidField {
                path: "reasoning.timeout_secs".to_string(),
                message: "timeouts on backend calls are mandatory".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for assembling an `AlfredConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct AlfredConfigBuilder {
    config: AlfredConfig,
}

impl AlfredConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: AlfredConfig::default(),
        }
    }

    /// Replace the reasoning backend configuration.
    pub fn reasoning(mut self, reasoning: BackendConfig) -> Self {
        self.config.reasoning = reasoning;
        self
    }

    /// Replace the embedding backend configuration.
    pub fn embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.config.embedding = embedding;
        self
    }

    /// Replace the memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the tool configuration.
    pub fn tools(mut self, tools: ToolsConfig) -> Self {
        self.config.tools = tools;
        self
    }

    /// Replace the orchestrator configuration.
    pub fn orchestrator(mut self, orchestrator: OrchestratorConfig) -> Self {
        self.config.orchestrator = orchestrator;
        self
    }

    /// Set the debug flag.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Finalize and return the built `AlfredConfig`.
    pub fn build(self) -> AlfredConfig {
        self.config
    }
}

/// Reasoning backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Provider identifier (`hosted` or `local`).
    #[serde(default = "default_reasoning_provider")]
    pub provider: String,
    /// Model name passed through to the provider.
    #[serde(default = "default_reasoning_model")]
    pub model: String,
    /// Environment variable holding the provider credential.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Optional base URL override for hosted providers.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Generation parameters forwarded with every request.
    #[serde(default)]
    pub params: GenerationParams,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry policy for transient failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_reasoning_provider(),
            model: default_reasoning_model(),
            api_key_env: None,
            base_url: None,
            params: GenerationParams::default(),
            timeout_secs: default_timeout_secs(),
            retry: RetryConfig::default(),
        }
    }
}

/// Default reasoning provider identifier.
fn default_reasoning_provider() -> String {
    "local".to_string()
}

/// Default reasoning model name.
fn default_reasoning_model() -> String {
    "alfred-local".to_string()
}

/// Default per-request timeout in seconds.
fn default_timeout_secs() -> u64 {
    60
}

/// Generation parameters forwarded to the reasoning backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Default sampling temperature.
fn default_temperature() -> f32 {
    0.7
}

/// Default maximum generated tokens.
fn default_max_tokens() -> u32 {
    1024
}

/// Retry policy for transient backend failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts including the initial call.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds, doubled per attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Default attempt cap for retries.
fn default_max_attempts() -> u32 {
    3
}

/// Default base backoff delay in milliseconds.
fn default_base_delay_ms() -> u64 {
    250
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider identifier (`hosted` or `local`).
    #[serde(default = "default_embedding_provider")]
    pub provider: String,
    /// Embedding model name for hosted providers.
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Environment variable holding the provider credential.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Optional base URL override for hosted providers.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Embedding vector dimensionality.
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            api_key_env: None,
            base_url: None,
            dimension: default_embedding_dimension(),
        }
    }
}

/// Default embedding provider identifier.
fn default_embedding_provider() -> String {
    "local".to_string()
}

/// Default embedding model name.
fn default_embedding_model() -> String {
    "alfred-hash".to_string()
}

/// Default embedding dimensionality for the local embedder.
fn default_embedding_dimension() -> usize {
    256
}

/// Memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum record count per session partition.
    #[serde(default = "default_memory_capacity")]
    pub capacity: usize,
    /// Number of records returned by recall.
    #[serde(default = "default_recall_k")]
    pub recall_k: usize,
    /// Optional directory for JSONL persistence; in-memory when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_memory_capacity(),
            recall_k: default_recall_k(),
            path: None,
        }
    }
}

/// Default per-session memory capacity.
fn default_memory_capacity() -> usize {
    512
}

/// Default recall result count.
fn default_recall_k() -> usize {
    4
}

/// Tool registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Names of builtin tools to register at startup.
    #[serde(default = "default_enabled_tools")]
    pub enabled: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_tools(),
        }
    }
}

/// Default builtin tool set.
fn default_enabled_tools() -> Vec<String> {
    vec!["echo".to_string(), "clock".to_string()]
}

/// Orchestrator loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Maximum tool-call rounds per turn before forcing a response.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    /// Maximum conversation messages sent to the backend per turn.
    #[serde(default = "default_window_messages")]
    pub window_messages: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            window_messages: default_window_messages(),
        }
    }
}

/// Default tool-round bound per turn.
fn default_max_tool_rounds() -> usize {
    5
}

/// Default conversation window size in messages.
fn default_window_messages() -> usize {
    40
}

#[cfg(test)]
mod tests {
    use super::AlfredConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_validate() {
        let config = AlfredConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reasoning.provider, "local");
        assert_eq!(config.orchestrator.max_tool_rounds, 5);
    }

    #[test]
    fn builder_overrides_sections() {
        let config = AlfredConfig::builder().debug(true).build();
        assert_eq!(config.debug, true);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let mut config = AlfredConfig::default();
        config.embedding.dimension = 0;
        let err = config.validate().expect_err("invalid");
        assert!(err.to_string().contains("embedding.dimension"));
    }
}
