//! Error types for memory operations.

/// Errors returned by the memory store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// Embedding computation failed; the memory operation is skipped.
    #[error("embedding error: {0}")]
    Embedding(String),
    /// A record's embedding does not match the active backend's space.
    /// Mixing embeddings from different backends is a configuration error.
    #[error("embedding dimension mismatch: expected {expected}, found {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
