//! Tool trait definition.

use crate::error::ToolError;
use alfred_engine::ToolSpec;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

/// Interface for executable tools.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Return the tool name, unique within a session.
    fn name(&self) -> &str;

    /// Return the tool description presented to the backend.
    fn description(&self) -> &str;

    /// Return the JSON schema for tool arguments.
    fn args_schema(&self) -> Value;

    /// Invoke the tool with validated arguments, producing result text.
    async fn invoke(&self, args: Value) -> Result<String, ToolError>;

    /// Build a `ToolSpec` describing this tool to the reasoning engine.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args_schema: self.args_schema(),
        }
    }
}
