//! Shared stubs for testing Alfred components.

mod backends;
mod tools;

pub use backends::{
    FailingEmbedder, FixedBackend, HangingBackend, RecordingBackend, ScriptedBackend, ScriptedStep,
};
pub use tools::{FailingTool, PingTool};
