//! Public SDK surface for Alfred.
//!
//! This crate re-exports the workspace building blocks and provides a small
//! logging initializer to keep consumer setup consistent.

/// Re-export for convenience.
pub use alfred_config as config;
pub use alfred_core as core;
/// Re-export for convenience.
pub use alfred_engine as engine;
/// Re-export for convenience.
pub use alfred_memory as memory;
/// Re-export for convenience.
pub use alfred_tools as tools;

/// Initialize logging via env_logger. `RUST_LOG` wins; the debug flag
/// raises the default filter when no environment override is set.
pub fn init_logging(debug: bool) {
    let mut builder = env_logger::builder();
    builder.format_timestamp_millis();
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.parse_default_env();
    let _ = builder.try_init();
}
