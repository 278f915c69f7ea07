//! Tool contract and registry for Alfred.
//!
//! A tool is an external callable capability the reasoning engine may
//! request mid-conversation. The orchestrator depends only on the contract
//! here: a name, an args schema, and `invoke`.

pub mod builtins;
mod error;
mod registry;
mod schema;
mod tool;

/// Builtin registry assembly.
pub use builtins::builtin_tool_registry;
/// Tool error type.
pub use error::ToolError;
/// In-memory tool registry.
pub use registry::ToolRegistry;
/// Argument validation against a declared schema.
pub use schema::validate_args;
/// Tool trait.
pub use tool::Tool;
