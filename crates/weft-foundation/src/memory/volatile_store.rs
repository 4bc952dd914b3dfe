//! In-memory vector store implementation
//!
//! Brute-force similarity search over records held in per-collection
//! HashMaps. Suitable for development, testing, and small datasets.

use crate::memory::similarity::compute_similarity;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;
use weft_kernel::error::{KernelError, Result};
use weft_kernel::memory::{MemoryRecord, SimilarityMetric, VectorStore};

type Collection = HashMap<String, MemoryRecord>;

/// In-memory vector store using brute-force similarity search.
///
/// Upserting into an unknown collection creates it. Every record in a
/// collection must have the same embedding dimensionality.
///
/// # Example
///
/// ```rust,ignore
/// use weft_foundation::memory::VolatileMemoryStore;
/// use weft_kernel::memory::VectorStore;
///
/// let store = VolatileMemoryStore::cosine();
/// let key = store.upsert("facts", record).await?;
/// let matches = store.get_nearest_matches("facts", &[0.1, 0.2, 0.3], 5, 0.0, false).await?;
/// ```
pub struct VolatileMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    metric: SimilarityMetric,
}

impl VolatileMemoryStore {
    /// Create an empty store with the given similarity metric.
    pub fn new(metric: SimilarityMetric) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            metric,
        }
    }

    /// Create an empty store using cosine similarity.
    pub fn cosine() -> Self {
        Self::new(SimilarityMetric::Cosine)
    }

    pub fn similarity_metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Number of records in `collection` (0 when it does not exist).
    pub fn count(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, HashMap::len)
    }

    fn record_key(record: &MemoryRecord) -> String {
        match &record.key {
            Some(key) if !key.is_empty() => key.clone(),
            _ if !record.metadata.id().is_empty() => record.metadata.id().to_string(),
            _ => Uuid::new_v4().to_string(),
        }
    }

    fn project(record: &MemoryRecord, with_embedding: bool) -> MemoryRecord {
        if with_embedding {
            record.clone()
        } else {
            record.clone().without_embedding()
        }
    }
}

impl Default for VolatileMemoryStore {
    fn default() -> Self {
        Self::cosine()
    }
}

#[async_trait]
impl VectorStore for VolatileMemoryStore {
    async fn create_collection(&self, collection: &str) -> Result<()> {
        self.collections.write().entry(collection.to_string()).or_default();
        Ok(())
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool> {
        Ok(self.collections.read().contains_key(collection))
    }

    async fn get_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.collections.write().remove(collection);
        Ok(())
    }

    async fn upsert(&self, collection: &str, mut record: MemoryRecord) -> Result<String> {
        let key = Self::record_key(&record);
        record.key = Some(key.clone());
        record.collection = collection.to_string();

        let mut collections = self.collections.write();
        let records = collections.entry(collection.to_string()).or_default();

        let expected = records
            .iter()
            .find(|(existing_key, _)| **existing_key != key)
            .map(|(_, existing)| existing.dimensions());
        if let Some(expected) = expected {
            if expected != record.dimensions() {
                return Err(KernelError::storage(format!(
                    "embedding dimension mismatch in collection '{collection}': expected {expected}, got {}",
                    record.dimensions()
                )));
            }
        }

        records.insert(key.clone(), record);
        Ok(key)
    }

    async fn get(&self, collection: &str, key: &str, with_embedding: bool) -> Result<Option<MemoryRecord>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|records| records.get(key))
            .map(|record| Self::project(record, with_embedding)))
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<()> {
        if let Some(records) = self.collections.write().get_mut(collection) {
            records.remove(key);
        }
        Ok(())
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance_score: f64,
        with_embeddings: bool,
    ) -> Result<Vec<(MemoryRecord, f64)>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let collections = self.collections.read();
        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(&MemoryRecord, f64)> = records
            .values()
            .filter(|record| record.dimensions() == embedding.len())
            .map(|record| (record, compute_similarity(&record.embedding, embedding, self.metric)))
            .filter(|(_, score)| *score >= min_relevance_score)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(record, score)| (Self::project(record, with_embeddings), score))
            .collect())
    }
}
