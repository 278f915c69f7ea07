//! Registry for tool implementations.

use crate::error::ToolError;
use crate::schema::validate_args;
use crate::tool::Tool;
use alfred_engine::ToolSpec;
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory registry for tool implementations. Registration happens before
/// the orchestration loop starts; lookups during the loop are read-only.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    /// Map of tool name to implementation.
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    /// Create an empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool by name, replacing any previous registration.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        debug!("registering tool (name={})", tool.name());
        self.tools.write().insert(tool.name().to_string(), tool);
    }

    /// Fetch a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    /// List all registered tool names.
    pub fn list(&self) -> Vec<String> {
        self.tools.read().keys().cloned().collect()
    }

    /// Return tool specs for all registered tools.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.read().values().map(|tool| tool.spec()).collect()
    }

    /// Validate arguments and invoke the named tool.
    pub async fn invoke(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::Unknown(name.to_string()))?;
        validate_args(name, &tool.args_schema(), &args)?;
        tool.invoke(args).await
    }
}
