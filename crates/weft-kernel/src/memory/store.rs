//! VectorStore trait definition
//!
//! Defines the abstract interface for collection-scoped vector storage and
//! similarity search. Concrete implementations (VolatileMemoryStore,
//! QdrantMemoryStore) live in weft-foundation.

use crate::error::Result;
use crate::memory::record::MemoryRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Abstract interface for vector storage and similarity search.
///
/// Records live in named collections. The store owns the similarity metric
/// and the ordering of search results; callers only project what it returns.
/// All methods take `&self`: a store is shared by every memory view and
/// pipeline run of a kernel and must tolerate concurrent calls.
///
/// # Example
///
/// ```rust,ignore
/// use weft_kernel::memory::{MemoryRecord, VectorStore};
///
/// let key = store.upsert("facts", record).await?;
///
/// let matches = store
///     .get_nearest_matches("facts", &query_embedding, 5, 0.7, false)
///     .await?;
/// for (record, score) in matches {
///     println!("{score:.3}: {}", record.metadata.text());
/// }
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create `collection`; creating an existing collection is a no-op.
    async fn create_collection(&self, collection: &str) -> Result<()>;

    async fn does_collection_exist(&self, collection: &str) -> Result<bool>;

    /// Names of every known collection.
    async fn get_collections(&self) -> Result<Vec<String>>;

    /// Drop `collection` and everything in it.
    async fn delete_collection(&self, collection: &str) -> Result<()>;

    /// Insert or replace `record` in `collection`, returning its key.
    ///
    /// A record without a key is assigned one by the store.
    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String>;

    /// Insert or replace several records, returning their keys in input order.
    async fn upsert_batch(&self, collection: &str, records: Vec<MemoryRecord>) -> Result<Vec<String>> {
        let mut keys = Vec::with_capacity(records.len());
        for record in records {
            keys.push(self.upsert(collection, record).await?);
        }
        Ok(keys)
    }

    /// Point lookup; `Ok(None)` when the key (or collection) is absent.
    async fn get(&self, collection: &str, key: &str, with_embedding: bool) -> Result<Option<MemoryRecord>>;

    /// Point lookup of several keys; absent keys are skipped.
    async fn get_batch(
        &self,
        collection: &str,
        keys: &[String],
        with_embeddings: bool,
    ) -> Result<Vec<MemoryRecord>> {
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(record) = self.get(collection, key, with_embeddings).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Remove the record under `key`; removing an absent key is a no-op.
    async fn remove(&self, collection: &str, key: &str) -> Result<()>;

    async fn remove_batch(&self, collection: &str, keys: &[String]) -> Result<()> {
        for key in keys {
            self.remove(collection, key).await?;
        }
        Ok(())
    }

    /// Up to `limit` records most similar to `embedding`, with their scores.
    ///
    /// Only matches scoring at least `min_relevance_score` are returned,
    /// sorted by descending relevance. A missing collection yields no matches.
    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance_score: f64,
        with_embeddings: bool,
    ) -> Result<Vec<(MemoryRecord, f64)>>;

    /// The single best match, if any clears `min_relevance_score`.
    async fn get_nearest_match(
        &self,
        collection: &str,
        embedding: &[f32],
        min_relevance_score: f64,
        with_embedding: bool,
    ) -> Result<Option<(MemoryRecord, f64)>> {
        let mut matches = self
            .get_nearest_matches(collection, embedding, 1, min_relevance_score, with_embedding)
            .await?;
        Ok(matches.pop())
    }
}

/// Similarity metric used for comparing embedding vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity (angle between vectors, 1.0 for identical direction)
    #[default]
    Cosine,
    /// Euclidean distance mapped to `1 / (1 + distance)`
    Euclidean,
    /// Dot product (higher is more similar)
    DotProduct,
}
