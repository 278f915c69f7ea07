//! Orchestration core for Alfred.
//!
//! Drives the conversation loop: accept an utterance, retrieve memory
//! context, invoke the reasoning engine through bounded tool-call rounds,
//! persist the exchange, and return the reply.

mod conversation;
mod error;
mod orchestrator;

/// Conversation transcript model.
pub use conversation::{Conversation, Message};
/// Core error type.
pub use error::CoreError;
/// Orchestrator facade.
pub use orchestrator::Orchestrator;
/// Message roles, re-exported from the engine contract.
pub use alfred_engine::Role;
