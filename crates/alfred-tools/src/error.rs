//! Error types for tool invocation.

use thiserror::Error;

/// Errors returned by the registry and tool implementations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Requested tool is not registered.
    #[error("unknown tool: {0}")]
    Unknown(String),
    /// Arguments failed validation against the declared schema.
    #[error("invalid arguments for {tool}: {message}")]
    InvalidArgs { tool: String, message: String },
    /// The tool itself failed while executing.
    #[error("tool {tool} failed: {message}")]
    Failed { tool: String, message: String },
}
