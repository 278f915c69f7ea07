//! Error types for backend requests.

use thiserror::Error;

/// Errors returned by reasoning and embedding backends.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Backend unreachable or timed out; safe to retry with backoff.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Backend returned a response the adapter could not interpret.
    #[error("backend protocol error: {0}")]
    Protocol(String),
    /// Request exceeded the backend's context or token budget.
    #[error("context overflow: {0}")]
    ContextOverflow(String),
    /// Embedding computation failed.
    #[error("embedding error: {0}")]
    Embedding(String),
    /// Backend selection or credential resolution failed.
    #[error("backend configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Whether the error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Unavailable(_))
    }
}
