//! Vector memory for Alfred: embedding-backed storage and semantic recall.

mod error;
mod model;
mod similarity;
mod store;

/// Memory error type.
pub use error::MemoryError;
/// Memory record model and the pinned tag.
pub use model::{MemoryRecord, PINNED_TAG, ScoredRecord};
/// Cosine similarity scoring.
pub use similarity::cosine_similarity;
/// Session-partitioned vector store.
pub use store::MemoryStore;
