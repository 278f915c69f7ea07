//! Backend traits, the retrying engine facade, and config-driven factories.

use crate::error::EngineError;
use crate::hosted::{HostedEmbeddingBackend, HostedReasoningBackend};
use crate::local::{HashEmbedder, LocalReasoningBackend};
use crate::retry::{RetryPolicy, with_retry};
use crate::types::{GenerateRequest, GenerateResult};
use alfred_config::{BackendConfig, EmbeddingConfig};
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// Text-generation capability implemented by every backend variant.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Provider identifier, used only for logging.
    fn name(&self) -> &str;

    /// Issue one generation request and normalize the response.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, EngineError>;
}

impl std::fmt::Debug for dyn ReasoningBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningBackend")
            .field("name", &self.name())
            .finish()
    }
}

/// Embedding capability implemented by every backend variant.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Provider identifier, used only for logging.
    fn name(&self) -> &str;

    /// Dimensionality of vectors produced by this backend.
    fn dimension(&self) -> usize;

    /// Embed a single text into a fixed-dimensionality vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError>;
}

/// Stateless request/response facade over a reasoning backend.
///
/// Applies the mandatory per-request timeout and the bounded retry policy;
/// a timeout is treated identically to an unavailable backend.
#[derive(Clone)]
pub struct ReasoningEngine {
    backend: Arc<dyn ReasoningBackend>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ReasoningEngine {
    /// Wrap a backend with retry and timeout behavior from config.
    pub fn new(backend: Arc<dyn ReasoningBackend>, config: &BackendConfig) -> Self {
        Self {
            backend,
            retry: RetryPolicy::from_config(&config.retry),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Wrap a backend with explicit retry and timeout settings.
    pub fn with_policy(
        backend: Arc<dyn ReasoningBackend>,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            retry,
            timeout,
        }
    }

    /// Provider identifier of the wrapped backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Generate a reply for the request, retrying transient failures.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, EngineError> {
        debug!(
            "generate (backend={}, messages={}, tools={})",
            self.backend.name(),
            request.messages.len(),
            request.tools.len()
        );
        with_retry(self.retry, || async {
            match tokio::time::timeout(self.timeout, self.backend.generate(request)).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::Unavailable(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs()
                ))),
            }
        })
        .await
    }
}

/// Select and construct the reasoning backend named by config.
pub fn build_reasoning_backend(
    config: &BackendConfig,
) -> Result<Arc<dyn ReasoningBackend>, EngineError> {
    let backend: Arc<dyn ReasoningBackend> = match config.provider.as_str() {
        "hosted" => Arc::new(HostedReasoningBackend::new(config)?),
        "local" => Arc::new(LocalReasoningBackend::new()),
        other => {
            return Err(EngineError::Configuration(format!(
                "unknown reasoning provider: {other}"
            )));
        }
    };
    info!(
        "reasoning backend ready (provider={}, model={})",
        config.provider, config.model
    );
    Ok(backend)
}

/// Select and construct the embedding backend named by config.
pub fn build_embedding_backend(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingBackend>, EngineError> {
    let backend: Arc<dyn EmbeddingBackend> = match config.provider.as_str() {
        "hosted" => Arc::new(HostedEmbeddingBackend::new(config)?),
        "local" => Arc::new(HashEmbedder::new(config.dimension)),
        other => {
            return Err(EngineError::Configuration(format!(
                "unknown embedding provider: {other}"
            )));
        }
    };
    info!(
        "embedding backend ready (provider={}, dimension={})",
        config.provider,
        backend.dimension()
    );
    Ok(backend)
}

/// Resolve an API key from the environment variable named in config.
pub(crate) fn resolve_api_key(api_key_env: Option<&str>) -> Result<String, EngineError> {
    let var = api_key_env.ok_or_else(|| {
        EngineError::Configuration("hosted provider requires api_key_env".to_string())
    })?;
    std::env::var(var).map_err(|_| {
        EngineError::Configuration(format!("credential variable not set: {var}"))
    })
}

#[cfg(test)]
mod tests {
    use super::{ReasoningEngine, build_embedding_backend, build_reasoning_backend};
    use crate::error::EngineError;
    use crate::retry::RetryPolicy;
    use crate::types::{GenerateRequest, GenerateResult, PromptMessage, Role};
    use alfred_config::{BackendConfig, EmbeddingConfig};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    struct SlowBackend;

    #[async_trait]
    impl super::ReasoningBackend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(
            &self,
            _request: &GenerateRequest,
        ) -> Result<GenerateResult, EngineError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(GenerateResult::text("too late"))
        }
    }

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        let mut config = BackendConfig::default();
        config.provider = "levitating".to_string();
        let err = build_reasoning_backend(&config).expect_err("unknown");
        match err {
            EngineError::Configuration(message) => assert!(message.contains("levitating")),
            other => panic!("unexpected error: {other:?}"),
        }

        let mut config = EmbeddingConfig::default();
        config.provider = "levitating".to_string();
        assert!(build_embedding_backend(&config).is_err());
    }

    #[tokio::test]
    async fn local_backends_build_from_default_config() {
        let backend = build_reasoning_backend(&BackendConfig::default()).expect("reasoning");
        let request = GenerateRequest {
            messages: vec![PromptMessage::new(Role::User, "hello")],
            tools: Vec::new(),
        };
        let result = backend.generate(&request).await.expect("generate");
        assert!(result.text.is_some());

        let embedder = build_embedding_backend(&EmbeddingConfig::default()).expect("embedding");
        assert_eq!(embedder.dimension(), 256);
    }

    #[tokio::test]
    async fn timeout_surfaces_as_unavailable() {
        let retry = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
        };
        let engine =
            ReasoningEngine::with_policy(Arc::new(SlowBackend), retry, Duration::from_millis(10));
        let err = engine
            .generate(&GenerateRequest::default())
            .await
            .expect_err("timeout");
        assert!(err.is_retryable());
    }
}
