//! Vector store double that fails selected operations.
//!
//! [`FaultyStore`] delegates to a [`VolatileMemoryStore`] and returns the
//! configured error from `upsert` and/or `remove` instead.

use async_trait::async_trait;

use weft_foundation::memory::VolatileMemoryStore;
use weft_kernel::error::{KernelError, Result};
use weft_kernel::memory::{MemoryRecord, VectorStore};

type Fault = fn() -> KernelError;

#[derive(Default)]
pub struct FaultyStore {
    inner: VolatileMemoryStore,
    upsert_fault: Option<Fault>,
    remove_fault: Option<Fault>,
}

impl FaultyStore {
    pub fn failing_upsert(fault: Fault) -> Self {
        Self {
            upsert_fault: Some(fault),
            ..Default::default()
        }
    }

    pub fn failing_remove(fault: Fault) -> Self {
        Self {
            remove_fault: Some(fault),
            ..Default::default()
        }
    }
}

#[async_trait]
impl VectorStore for FaultyStore {
    async fn create_collection(&self, collection: &str) -> Result<()> {
        self.inner.create_collection(collection).await
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool> {
        self.inner.does_collection_exist(collection).await
    }

    async fn get_collections(&self) -> Result<Vec<String>> {
        self.inner.get_collections().await
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.inner.delete_collection(collection).await
    }

    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String> {
        match self.upsert_fault {
            Some(fault) => Err(fault()),
            None => self.inner.upsert(collection, record).await,
        }
    }

    async fn get(&self, collection: &str, key: &str, with_embedding: bool) -> Result<Option<MemoryRecord>> {
        self.inner.get(collection, key, with_embedding).await
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<()> {
        match self.remove_fault {
            Some(fault) => Err(fault()),
            None => self.inner.remove(collection, key).await,
        }
    }

    async fn get_nearest_matches(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
        min_relevance_score: f64,
        with_embeddings: bool,
    ) -> Result<Vec<(MemoryRecord, f64)>> {
        self.inner
            .get_nearest_matches(collection, embedding, limit, min_relevance_score, with_embeddings)
            .await
    }
}
