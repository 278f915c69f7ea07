//! Builtin tools shipped with Alfred.

mod clock;
mod echo;

pub use clock::ClockTool;
pub use echo::EchoTool;

use crate::registry::ToolRegistry;
use log::warn;
use std::sync::Arc;

/// Build a registry holding the named builtin tools.
pub fn builtin_tool_registry(enabled: &[String]) -> ToolRegistry {
    let registry = ToolRegistry::new();
    for name in enabled {
        match name.as_str() {
            "echo" => registry.register(Arc::new(EchoTool)),
            "clock" => registry.register(Arc::new(ClockTool)),
            other => warn!("ignoring unknown builtin tool (name={other})"),
        }
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::builtin_tool_registry;
    use pretty_assertions::assert_eq;

    #[test]
    fn registry_skips_unknown_names() {
        let registry = builtin_tool_registry(&[
            "echo".to_string(),
            "clock".to_string(),
            "teleport".to_string(),
        ]);
        let mut names = registry.list();
        names.sort();
        assert_eq!(names, vec!["clock".to_string(), "echo".to_string()]);
    }
}
