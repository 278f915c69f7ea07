//! Stub reasoning and embedding backends for tests.

use alfred_engine::{
    EmbeddingBackend, EngineError, GenerateRequest, GenerateResult, HashEmbedder,
    ReasoningBackend,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Backend that always replies with the same text.
#[derive(Debug, Clone)]
pub struct FixedBackend {
    response: String,
}

impl FixedBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl ReasoningBackend for FixedBackend {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResult, EngineError> {
        Ok(GenerateResult::text(self.response.clone()))
    }
}

/// One step in a scripted backend's playbook.
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    /// Return this result.
    Reply(GenerateResult),
    /// Fail as unavailable (retryable).
    Unavailable(String),
    /// Fail with a protocol error (non-retryable).
    Protocol(String),
    /// Fail with a context overflow.
    Overflow(String),
}

/// Backend that replays a fixed sequence of results and failures.
/// Panics in tests if called past the end of its script.
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<ScriptedStep>>,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<ScriptedStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
        }
    }

    /// Number of steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.steps.lock().len()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResult, EngineError> {
        let step = self
            .steps
            .lock()
            .pop_front()
            .expect("scripted backend exhausted");
        match step {
            ScriptedStep::Reply(result) => Ok(result),
            ScriptedStep::Unavailable(message) => Err(EngineError::Unavailable(message)),
            ScriptedStep::Protocol(message) => Err(EngineError::Protocol(message)),
            ScriptedStep::Overflow(message) => Err(EngineError::ContextOverflow(message)),
        }
    }
}

/// Backend that records every request and replies with fixed text.
pub struct RecordingBackend {
    response: String,
    /// Requests captured in call order.
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl RecordingBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReasoningBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, EngineError> {
        self.requests.lock().push(request.clone());
        Ok(GenerateResult::text(self.response.clone()))
    }
}

/// Embedder that fails after a configurable number of successful calls.
/// Delegates successful calls to a feature-hashing embedder.
pub struct FailingEmbedder {
    inner: HashEmbedder,
    successes_left: Mutex<usize>,
}

impl FailingEmbedder {
    /// Embedder whose every call fails.
    pub fn new(dimension: usize) -> Self {
        Self::after(dimension, 0)
    }

    /// Embedder that succeeds `successes` times, then fails.
    pub fn after(dimension: usize, successes: usize) -> Self {
        Self {
            inner: HashEmbedder::new(dimension),
            successes_left: Mutex::new(successes),
        }
    }
}

#[async_trait]
impl EmbeddingBackend for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        let mut left = self.successes_left.lock();
        if *left == 0 {
            return Err(EngineError::Embedding("embedder offline".to_string()));
        }
        *left -= 1;
        Ok(self.inner.embed_text(text))
    }
}

/// Backend that never completes, for cancellation and timeout tests.
#[derive(Debug, Clone, Default)]
pub struct HangingBackend;

#[async_trait]
impl ReasoningBackend for HangingBackend {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResult, EngineError> {
        tokio::time::sleep(Duration::from_secs(86_400)).await;
        Err(EngineError::Unavailable("hung backend woke up".to_string()))
    }
}
