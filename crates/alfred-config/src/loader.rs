//! json5 config loading.

use crate::error::ConfigError;
use crate::model::AlfredConfig;
use log::{debug, info};
use std::path::Path;

/// Load and validate a config document from disk.
///
/// Missing files and parse failures are fatal startup errors by contract;
/// callers surface the returned error and exit non-zero.
pub fn load_config(path: impl AsRef<Path>) -> Result<AlfredConfig, ConfigError> {
    let path = path.as_ref();
    debug!("loading config (path={})", path.display());
    let raw = std::fs::read_to_string(path)?;
    let config: AlfredConfig = json5::from_str(&raw)?;
    config.validate()?;
    info!(
        "config loaded (path={}, reasoning={}, embedding={}, capacity={})",
        path.display(),
        config.reasoning.provider,
        config.embedding.provider,
        config.memory.capacity
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::load_config;
    use crate::error::ConfigError;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn loads_json5_document() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("alfred.json5");
        let mut file = std::fs::File::create(&path).expect("create");
        write!(
            file,
            "{{\n  // hosted reasoning, local embeddings\n  reasoning: {{ provider: 'hosted', model: 'gpt-4o-mini', api_key_env: 'OPENAI_API_KEY' }},\n  memory: {{ capacity: 32, recall_k: 2 }},\n  debug: true,\n}}"
        )
        .expect("write");

        let config = load_config(&path).expect("load");
        assert_eq!(config.reasoning.provider, "hosted");
        assert_eq!(config.reasoning.model, "gpt-4o-mini");
        assert_eq!(config.memory.capacity, 32);
        assert_eq!(config.memory.recall_k, 2);
        assert_eq!(config.debug, true);
        // untouched sections keep defaults
        assert_eq!(config.embedding.provider, "local");
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempdir().expect("tempdir");
        let err = load_config(dir.path().join("absent.json5")).expect_err("missing");
        match err {
            ConfigError::ReadFailed(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_document_surfaces_parse_failure() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.json5");
        std::fs::write(&path, "{ reasoning: { provider: ").expect("write");
        let err = load_config(&path).expect_err("malformed");
        match err {
            ConfigError::ParseFailed(_) => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_field_fails_validation() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bad.json5");
        std::fs::write(&path, "{ memory: { capacity: 0 } }").expect("write");
        let err = load_config(&path).expect_err("invalid");
        assert!(err.to_string().contains("memory.capacity"));
    }
}
