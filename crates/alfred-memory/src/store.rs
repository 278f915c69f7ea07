//! Session-partitioned vector store with JSONL persistence.
//!
//! Records live in memory partitioned by session id; a configured root
//! directory adds one JSONL file per partition, appended on `remember` and
//! rewritten atomically when eviction shrinks a partition.

use crate::error::MemoryError;
use crate::model::{MemoryRecord, ScoredRecord};
use crate::similarity::cosine_similarity;
use alfred_engine::{EmbeddingBackend, EngineError};
use chrono::Utc;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Embedding-backed memory store.
pub struct MemoryStore {
    /// Embedding backend used for both records and queries.
    embedder: Arc<dyn EmbeddingBackend>,
    /// Maximum record count per session partition.
    capacity: usize,
    /// In-memory partitions, insertion order equals creation order.
    partitions: RwLock<HashMap<Uuid, Vec<MemoryRecord>>>,
    /// Optional persistence root.
    root: Option<PathBuf>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("capacity", &self.capacity)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl MemoryStore {
    /// Create an in-memory store.
    pub fn new(embedder: Arc<dyn EmbeddingBackend>, capacity: usize) -> Self {
        Self {
            embedder,
            capacity: capacity.max(1),
            partitions: RwLock::new(HashMap::new()),
            root: None,
        }
    }

    /// Open a persistent store, loading any existing partitions under root.
    ///
    /// Fails fast if a persisted record's embedding does not match the
    /// active backend's dimensionality.
    pub fn open(
        embedder: Arc<dyn EmbeddingBackend>,
        capacity: usize,
        root: impl AsRef<Path>,
    ) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        let dimension = embedder.dimension();
        let mut partitions: HashMap<Uuid, Vec<MemoryRecord>> = HashMap::new();
        for entry in std::fs::read_dir(&root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
                continue;
            }
            let records = load_partition(&path, dimension)?;
            if let Some(first) = records.first() {
                partitions.insert(first.session_id, records);
            }
        }
        info!(
            "memory store opened (root={}, partitions={}, dimension={})",
            root.display(),
            partitions.len(),
            dimension
        );
        Ok(Self {
            embedder,
            capacity: capacity.max(1),
            partitions: RwLock::new(partitions),
            root: Some(root),
        })
    }

    /// Dimensionality of the store's embedding space.
    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Record count for a session partition.
    pub fn len(&self, session_id: Uuid) -> usize {
        self.partitions
            .read()
            .get(&session_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Whether a session partition is empty.
    pub fn is_empty(&self, session_id: Uuid) -> bool {
        self.len(session_id) == 0
    }

    /// Embed and persist a record; visible to `recall` once this returns.
    pub async fn remember(
        &self,
        session_id: Uuid,
        text: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Uuid, MemoryError> {
        let text = text.into();
        let embedding = self
            .embedder
            .embed(&text)
            .await
            .map_err(embedding_failure)?;
        self.check_dimension(embedding.len())?;

        let record = MemoryRecord {
            id: Uuid::new_v4(),
            session_id,
            text,
            embedding,
            tags,
            created_at: Utc::now(),
        };
        let record_id = record.id;

        let mut partitions = self.partitions.write();
        let partition = partitions.entry(session_id).or_default();
        self.append_persisted(&record)?;
        partition.push(record);
        debug!(
            "memory record stored (session_id={}, record_id={}, size={})",
            session_id,
            record_id,
            partition.len()
        );
        let evicted = evict_over_capacity(partition, self.capacity);
        if evicted > 0 {
            info!(
                "memory evicted (session_id={}, evicted={}, remaining={})",
                session_id,
                evicted,
                partition.len()
            );
            self.rewrite_persisted(session_id, partition)?;
        }
        Ok(record_id)
    }

    /// Return the top-k records by descending cosine similarity, ties
    /// broken most-recent-first. An empty partition yields an empty vec.
    pub async fn recall(
        &self,
        session_id: Uuid,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredRecord>, MemoryError> {
        if k == 0 || self.is_empty(session_id) {
            return Ok(Vec::new());
        }
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(embedding_failure)?;
        self.check_dimension(query_embedding.len())?;

        let partitions = self.partitions.read();
        let Some(partition) = partitions.get(&session_id) else {
            return Ok(Vec::new());
        };
        let mut scored = Vec::with_capacity(partition.len());
        for record in partition {
            if record.embedding.len() != query_embedding.len() {
                return Err(MemoryError::DimensionMismatch {
                    expected: query_embedding.len(),
                    actual: record.embedding.len(),
                });
            }
            scored.push(ScoredRecord {
                score: cosine_similarity(&query_embedding, &record.embedding),
                record: record.clone(),
            });
        }
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.record.created_at.cmp(&a.record.created_at))
        });
        scored.truncate(k);
        debug!(
            "recall (session_id={}, k={}, returned={})",
            session_id,
            k,
            scored.len()
        );
        Ok(scored)
    }

    /// Rewrite all partitions to disk. No-op for in-memory stores.
    pub fn flush(&self) -> Result<(), MemoryError> {
        if self.root.is_none() {
            return Ok(());
        }
        let partitions = self.partitions.read();
        for (session_id, partition) in partitions.iter() {
            self.rewrite_persisted(*session_id, partition)?;
        }
        debug!("memory flushed (partitions={})", partitions.len());
        Ok(())
    }

    /// Fail fast when an embedding leaves the configured space.
    fn check_dimension(&self, actual: usize) -> Result<(), MemoryError> {
        let expected = self.embedder.dimension();
        if actual != expected {
            return Err(MemoryError::DimensionMismatch { expected, actual });
        }
        Ok(())
    }

    /// Path to a session's JSONL file, when persistence is configured.
    fn partition_path(&self, session_id: Uuid) -> Option<PathBuf> {
        self.root
            .as_ref()
            .map(|root| root.join(format!("{session_id}.jsonl")))
    }

    /// Append one record to the session file.
    fn append_persisted(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        let Some(path) = self.partition_path(record.session_id) else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Rewrite a session's file atomically via a temp file.
    fn rewrite_persisted(
        &self,
        session_id: Uuid,
        records: &[MemoryRecord],
    ) -> Result<(), MemoryError> {
        let Some(path) = self.partition_path(session_id) else {
            return Ok(());
        };
        let temp_path = path.with_extension("jsonl.tmp");
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            for record in records {
                let line = serde_json::to_string(record)?;
                writeln!(file, "{line}")?;
            }
        }
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        std::fs::rename(temp_path, path)?;
        Ok(())
    }
}

/// Map an engine failure to the memory error taxonomy.
fn embedding_failure(err: EngineError) -> MemoryError {
    MemoryError::Embedding(err.to_string())
}

/// Drop oldest unpinned records until the partition fits capacity.
/// Returns the number of records evicted.
fn evict_over_capacity(partition: &mut Vec<MemoryRecord>, capacity: usize) -> usize {
    let mut evicted = 0;
    while partition.len() > capacity {
        match partition.iter().position(|record| !record.is_pinned()) {
            Some(index) => {
                let record = partition.remove(index);
                debug!(
                    "evicting record (record_id={}, created_at={})",
                    record.id, record.created_at
                );
                evicted += 1;
            }
            None => {
                warn!(
                    "partition over capacity but fully pinned (size={}, capacity={})",
                    partition.len(),
                    capacity
                );
                break;
            }
        }
    }
    evicted
}

/// Load one partition file, verifying dimensionality.
fn load_partition(path: &Path, dimension: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
    let file = OpenOptions::new().read(true).open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: MemoryRecord = serde_json::from_str(&line)?;
        if record.embedding.len() != dimension {
            return Err(MemoryError::DimensionMismatch {
                expected: dimension,
                actual: record.embedding.len(),
            });
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::error::MemoryError;
    use crate::model::PINNED_TAG;
    use alfred_engine::HashEmbedder;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn store(capacity: usize) -> MemoryStore {
        MemoryStore::new(Arc::new(HashEmbedder::new(64)), capacity)
    }

    #[tokio::test]
    async fn exact_match_recall_is_sound() {
        let store = store(16);
        let session = Uuid::new_v4();
        store
            .remember(session, "alfred enjoys earl grey tea", Vec::new())
            .await
            .expect("remember");
        store
            .remember(session, "the garage code is 4417", Vec::new())
            .await
            .expect("remember");

        let results = store
            .recall(session, "alfred enjoys earl grey tea", 2)
            .await
            .expect("recall");
        assert_eq!(results[0].record.text, "alfred enjoys earl grey tea");
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn recall_caps_at_k_and_sorts_descending() {
        let store = store(16);
        let session = Uuid::new_v4();
        for text in ["water the plants", "water the garden", "file the taxes", "walk the dog"] {
            store.remember(session, text, Vec::new()).await.expect("remember");
        }
        let results = store.recall(session, "water the plants", 3).await.expect("recall");
        assert_eq!(results.len(), 3);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn empty_partition_recalls_nothing() {
        let store = store(4);
        let results = store
            .recall(Uuid::new_v4(), "anything", 5)
            .await
            .expect("recall");
        assert_eq!(results, Vec::new());
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_first() {
        let store = store(2);
        let session = Uuid::new_v4();
        store.remember(session, "record A", Vec::new()).await.expect("a");
        store.remember(session, "record B", Vec::new()).await.expect("b");
        store.remember(session, "record C", Vec::new()).await.expect("c");

        let results = store.recall(session, "record", 10).await.expect("recall");
        let mut texts: Vec<&str> = results.iter().map(|r| r.record.text.as_str()).collect();
        texts.sort();
        assert_eq!(texts, vec!["record B", "record C"]);
    }

    #[tokio::test]
    async fn pinned_records_survive_eviction() {
        let store = store(2);
        let session = Uuid::new_v4();
        store
            .remember(session, "keep me", vec![PINNED_TAG.to_string()])
            .await
            .expect("pinned");
        store.remember(session, "second", Vec::new()).await.expect("second");
        store.remember(session, "third", Vec::new()).await.expect("third");

        let results = store.recall(session, "keep me", 10).await.expect("recall");
        let texts: Vec<&str> = results.iter().map(|r| r.record.text.as_str()).collect();
        assert!(texts.contains(&"keep me"));
        assert!(!texts.contains(&"second"));
    }

    #[tokio::test]
    async fn sessions_are_partitioned() {
        let store = store(8);
        let session_a = Uuid::new_v4();
        let session_b = Uuid::new_v4();
        store.remember(session_a, "private to a", Vec::new()).await.expect("a");
        let results = store.recall(session_b, "private to a", 5).await.expect("recall");
        assert_eq!(results.len(), 0);
    }

    #[tokio::test]
    async fn persistence_round_trips_and_checks_dimension() {
        let dir = tempdir().expect("tempdir");
        let session = Uuid::new_v4();
        {
            let store = MemoryStore::open(Arc::new(HashEmbedder::new(64)), 8, dir.path())
                .expect("open");
            store.remember(session, "durable fact", Vec::new()).await.expect("remember");
            store.flush().expect("flush");
        }

        let store =
            MemoryStore::open(Arc::new(HashEmbedder::new(64)), 8, dir.path()).expect("reopen");
        let results = store.recall(session, "durable fact", 1).await.expect("recall");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.text, "durable fact");

        // reopening against a different embedding space must fail fast
        let err = MemoryStore::open(Arc::new(HashEmbedder::new(32)), 8, dir.path())
            .expect_err("mismatch");
        match err {
            MemoryError::DimensionMismatch { expected, actual } => {
                assert_eq!(expected, 32);
                assert_eq!(actual, 64);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn eviction_rewrites_persisted_partition() {
        let dir = tempdir().expect("tempdir");
        let session = Uuid::new_v4();
        {
            let store = MemoryStore::open(Arc::new(HashEmbedder::new(64)), 2, dir.path())
                .expect("open");
            for text in ["one", "two", "three"] {
                store.remember(session, text, Vec::new()).await.expect("remember");
            }
        }
        let store =
            MemoryStore::open(Arc::new(HashEmbedder::new(64)), 2, dir.path()).expect("reopen");
        assert_eq!(store.len(session), 2);
    }
}
