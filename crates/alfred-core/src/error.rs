//! Error types for the orchestration core.

use alfred_engine::EngineError;
use thiserror::Error;

/// Errors returned by orchestrator operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Startup-time configuration or wiring failure. Fatal before any
    /// session starts.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Reasoning or embedding backend failure that could not be recovered
    /// within the turn.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Memory store failure outside the recoverable embedding path.
    #[error("memory error: {0}")]
    Memory(String),
    /// `process` called before `start`.
    #[error("orchestrator not started")]
    NotStarted,
    /// `process` called while another utterance is in flight.
    #[error("orchestrator busy: process calls are serialized per instance")]
    Busy,
    /// The in-flight call was aborted by shutdown or user interrupt.
    #[error("operation cancelled")]
    Cancelled,
}
