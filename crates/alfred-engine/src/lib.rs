//! Reasoning and embedding backend abstraction for Alfred.
//!
//! This crate owns the normalized request/response contracts between the
//! orchestrator and interchangeable text-generation providers. Callers work
//! against the `ReasoningBackend` and `EmbeddingBackend` traits and never
//! branch on provider identity; the concrete variant is picked once from
//! config by the factory functions.

mod backend;
mod error;
mod hosted;
mod local;
mod retry;
mod types;

/// Backend traits and config-driven factories.
pub use backend::{
    EmbeddingBackend, ReasoningBackend, ReasoningEngine, build_embedding_backend,
    build_reasoning_backend,
};
/// Engine error type.
pub use error::EngineError;
/// Hosted (OpenAI-style HTTP) backend variant.
pub use hosted::{HostedEmbeddingBackend, HostedReasoningBackend};
/// Local in-process backend variant.
pub use local::{HashEmbedder, LocalReasoningBackend};
/// Retry policy and helper.
pub use retry::{RetryPolicy, with_retry};
/// Normalized request/response types.
pub use types::{GenerateRequest, GenerateResult, PromptMessage, Role, ToolCallRequest, ToolSpec};
