//! Configuration models and loading for Alfred.
//!
//! This crate owns the Alfred config schema, validation, and the json5
//! loader used by the binary and by embedders of the orchestrator.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Config loading entry points.
pub use loader::load_config;
/// Configuration schema models.
pub use model::*;
