//! Local in-process backend variant.
//!
//! Useful for offline operation and tests: generation is a deterministic
//! reflection of the latest user message, and embeddings come from a
//! feature-hashing projection so similar texts land near each other without
//! any model weights.

use crate::backend::{EmbeddingBackend, ReasoningBackend};
use crate::error::EngineError;
use crate::types::{GenerateRequest, GenerateResult, Role};
use async_trait::async_trait;

/// Deterministic in-process reasoning backend. Never requests tools.
#[derive(Debug, Clone, Default)]
pub struct LocalReasoningBackend;

impl LocalReasoningBackend {
    /// Create the local backend.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReasoningBackend for LocalReasoningBackend {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, EngineError> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(|message| message.content.as_str())
            .unwrap_or("");
        if last_user.is_empty() {
            return Err(EngineError::Protocol(
                "request contained no user message".to_string(),
            ));
        }
        Ok(GenerateResult::text(format!(
            "I heard: {last_user}. I'm running without a hosted model, so that's all I can offer."
        )))
    }
}

/// Feature-hashing embedder with a fixed dimensionality.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of the given dimensionality.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Embed synchronously; the async trait method delegates here.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let bucket = (fnv1a(token) as usize) % self.dimension;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingBackend for HashEmbedder {
    fn name(&self) -> &str {
        "local"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EngineError> {
        Ok(self.embed_text(text))
    }
}

/// Split text into lowercase alphanumeric tokens.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
}

/// FNV-1a hash over the lowercased token bytes.
fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in token.bytes() {
        hash ^= byte.to_ascii_lowercase() as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::{HashEmbedder, LocalReasoningBackend};
    use crate::backend::{EmbeddingBackend, ReasoningBackend};
    use crate::types::{GenerateRequest, PromptMessage, Role};
    use pretty_assertions::assert_eq;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn local_backend_reflects_last_user_message() {
        let backend = LocalReasoningBackend::new();
        let request = GenerateRequest {
            messages: vec![
                PromptMessage::new(Role::User, "first"),
                PromptMessage::new(Role::Assistant, "reply"),
                PromptMessage::new(Role::User, "second"),
            ],
            tools: Vec::new(),
        };
        let result = backend.generate(&request).await.expect("generate");
        assert!(result.text.expect("text").contains("second"));
    }

    #[tokio::test]
    async fn embeddings_are_deterministic_and_normalized() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("the cat sat on the mat").await.expect("embed");
        let b = embedder.embed("the cat sat on the mat").await.expect("embed");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn shared_tokens_score_higher_than_disjoint_text() {
        let embedder = HashEmbedder::new(128);
        let base = embedder.embed("reminder to water the plants").await.expect("embed");
        let near = embedder.embed("water the plants tomorrow").await.expect("embed");
        let far = embedder.embed("quarterly revenue projections").await.expect("embed");
        assert!(cosine(&base, &near) > cosine(&base, &far));
    }

    #[test]
    fn tokenizer_is_case_insensitive_via_hash() {
        let embedder = HashEmbedder::new(32);
        assert_eq!(embedder.embed_text("Hello World"), embedder.embed_text("hello world"));
    }
}
