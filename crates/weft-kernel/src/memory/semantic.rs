//! SemanticTextMemory trait and the no-op NullMemory

use crate::error::Result;
use crate::memory::record::MemoryQueryResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Text-in, text-out memory over named collections.
///
/// Turns free text into embeddings, persists them through a vector store and
/// answers similarity queries. The default implementation lives in
/// weft-foundation (`DefaultSemanticTextMemory`).
#[async_trait]
pub trait SemanticTextMemory: Send + Sync {
    /// Save `text` under `id` in `collection`.
    ///
    /// Returns the persisted key, or `None` when the embedding generator
    /// produced nothing and the save was skipped.
    async fn save_information(
        &self,
        collection: &str,
        text: &str,
        id: &str,
        description: Option<&str>,
        additional_metadata: Option<&str>,
    ) -> Result<Option<String>>;

    /// Save a pointer to a record held by an external system.
    ///
    /// The collection is created first if it does not exist.
    async fn save_reference(
        &self,
        collection: &str,
        text: &str,
        external_id: &str,
        external_source_name: &str,
        description: Option<&str>,
        additional_metadata: Option<&str>,
    ) -> Result<Option<String>>;

    /// Exact lookup by key; a hit reports relevance 1.0.
    async fn get(&self, collection: &str, key: &str, with_embedding: bool) -> Result<Option<MemoryQueryResult>>;

    /// Remove the record under `key`; absent keys are ignored.
    async fn remove(&self, collection: &str, key: &str) -> Result<()>;

    /// Up to `limit` memories relevant to `query`, most relevant first.
    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_relevance_score: f64,
        with_embeddings: bool,
    ) -> Result<Vec<MemoryQueryResult>>;

    /// Names of every collection in the backing store.
    async fn get_collections(&self) -> Result<Vec<String>>;

    /// A view onto the same generator and store.
    ///
    /// Not a clone: writes through either handle are visible through both.
    fn copy(&self) -> Arc<dyn SemanticTextMemory>;
}

/// Memory that remembers nothing.
///
/// Used by a kernel built without memory so functions can call into memory
/// unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMemory;

impl NullMemory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SemanticTextMemory for NullMemory {
    async fn save_information(
        &self,
        _collection: &str,
        _text: &str,
        _id: &str,
        _description: Option<&str>,
        _additional_metadata: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    async fn save_reference(
        &self,
        _collection: &str,
        _text: &str,
        _external_id: &str,
        _external_source_name: &str,
        _description: Option<&str>,
        _additional_metadata: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    async fn get(&self, _collection: &str, _key: &str, _with_embedding: bool) -> Result<Option<MemoryQueryResult>> {
        Ok(None)
    }

    async fn remove(&self, _collection: &str, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn search(
        &self,
        _collection: &str,
        _query: &str,
        _limit: usize,
        _min_relevance_score: f64,
        _with_embeddings: bool,
    ) -> Result<Vec<MemoryQueryResult>> {
        Ok(Vec::new())
    }

    async fn get_collections(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn copy(&self) -> Arc<dyn SemanticTextMemory> {
        Arc::new(Self)
    }
}
