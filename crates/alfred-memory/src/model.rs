//! Memory record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag exempting a record from capacity eviction.
pub const PINNED_TAG: &str = "pinned";

/// Persisted memory record. Immutable after creation; removed only by the
/// eviction policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Owning session partition.
    pub session_id: Uuid,
    /// Source text the embedding was computed from.
    pub text: String,
    /// Embedding vector in the active backend's space.
    pub embedding: Vec<f32>,
    /// Tags for filtering and eviction control.
    pub tags: Vec<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Whether this record is exempt from eviction.
    pub fn is_pinned(&self) -> bool {
        self.tags.iter().any(|tag| tag == PINNED_TAG)
    }
}

/// A record paired with its similarity score for a recall query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    /// The matched record.
    pub record: MemoryRecord,
    /// Cosine similarity against the query embedding.
    pub score: f32,
}
