//! 语义文本记忆
//! Semantic text memory over an embedding generator and a vector store
//!
//! [`DefaultSemanticTextMemory`] embeds text with one
//! [`EmbeddingGenerator`] and persists it through one [`VectorStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_foundation::embedding::HashEmbeddingGenerator;
//! use weft_foundation::memory::{DefaultSemanticTextMemory, VolatileMemoryStore};
//! use weft_kernel::memory::SemanticTextMemory;
//! use std::sync::Arc;
//!
//! let memory = DefaultSemanticTextMemory::new(
//!     Arc::new(VolatileMemoryStore::cosine()),
//!     Arc::new(HashEmbeddingGenerator::default()),
//! );
//!
//! memory.save_information("facts", "Paris is the capital of France", "f1", None, None).await?;
//! let hits = memory.search("facts", "capital of France", 1, 0.0, false).await?;
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use weft_kernel::error::{KernelError, Result};
use weft_kernel::kernel::SemanticTextMemoryFactory;
use weft_kernel::memory::{
    Embedding, EmbeddingGenerator, MemoryQueryResult, MemoryRecord, MemoryRecordMetadata, SemanticTextMemory,
    VectorStore,
};

/// Default [`SemanticTextMemory`].
///
/// Cloning (or [`copy`](SemanticTextMemory::copy)) shares the generator and
/// the store; nothing is duplicated.
#[derive(Clone)]
pub struct DefaultSemanticTextMemory {
    storage: Arc<dyn VectorStore>,
    embedding_generator: Arc<dyn EmbeddingGenerator>,
}

impl DefaultSemanticTextMemory {
    pub fn new(storage: Arc<dyn VectorStore>, embedding_generator: Arc<dyn EmbeddingGenerator>) -> Self {
        Self {
            storage,
            embedding_generator,
        }
    }

    pub fn builder() -> DefaultSemanticTextMemoryBuilder {
        DefaultSemanticTextMemoryBuilder::default()
    }

    /// Hook for `KernelBuilder::with_semantic_memory_factory`.
    pub fn factory() -> SemanticTextMemoryFactory {
        Arc::new(|storage: Arc<dyn VectorStore>, embedding_generator: Arc<dyn EmbeddingGenerator>| {
            Ok(Arc::new(Self::new(storage, embedding_generator)) as Arc<dyn SemanticTextMemory>)
        })
    }

    pub fn storage(&self) -> &Arc<dyn VectorStore> {
        &self.storage
    }

    pub fn embedding_generator(&self) -> &Arc<dyn EmbeddingGenerator> {
        &self.embedding_generator
    }

    /// One embedding for `text`, or `None` when the generator produced nothing.
    ///
    /// Generator errors reach the caller with their kind intact.
    async fn embed(&self, text: &str) -> Result<Option<Embedding>> {
        self.embedding_generator.generate_embedding(text).await
    }

    async fn upsert(&self, collection: &str, metadata: MemoryRecordMetadata, embedding: Embedding) -> Result<String> {
        let record = MemoryRecord::new(metadata, embedding, collection, None);
        self.storage.upsert(collection, record).await
    }
}

fn project(record: MemoryRecord, relevance: f64, with_embedding: bool) -> MemoryQueryResult {
    let mut result = MemoryQueryResult::from_record(record, relevance);
    if !with_embedding {
        result.embedding = None;
    }
    result
}

#[async_trait]
impl SemanticTextMemory for DefaultSemanticTextMemory {
    async fn save_information(
        &self,
        collection: &str,
        text: &str,
        id: &str,
        description: Option<&str>,
        additional_metadata: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(embedding) = self.embed(text).await? else {
            tracing::trace!(collection, id, "Empty embedding, nothing saved");
            return Ok(None);
        };

        let metadata = MemoryRecordMetadata::new(
            true,
            id,
            text,
            description.map(str::to_string),
            "",
            additional_metadata.map(str::to_string),
        );
        let key = self.upsert(collection, metadata, embedding).await?;

        tracing::debug!(collection, key = %key, "Saved information");
        Ok(Some(key))
    }

    async fn save_reference(
        &self,
        collection: &str,
        text: &str,
        external_id: &str,
        external_source_name: &str,
        description: Option<&str>,
        additional_metadata: Option<&str>,
    ) -> Result<Option<String>> {
        let Some(embedding) = self.embed(text).await? else {
            tracing::trace!(collection, external_id, "Empty embedding, reference not saved");
            return Ok(None);
        };

        if !self.storage.does_collection_exist(collection).await? {
            self.storage.create_collection(collection).await?;
        }

        let metadata = MemoryRecordMetadata::new(
            false,
            external_id,
            text,
            description.map(str::to_string),
            external_source_name,
            additional_metadata.map(str::to_string),
        );
        let key = self.upsert(collection, metadata, embedding).await?;

        tracing::debug!(collection, key = %key, source = external_source_name, "Saved reference");
        Ok(Some(key))
    }

    async fn get(&self, collection: &str, key: &str, with_embedding: bool) -> Result<Option<MemoryQueryResult>> {
        let record = self.storage.get(collection, key, with_embedding).await?;
        Ok(record.map(|record| project(record, 1.0, with_embedding)))
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<()> {
        self.storage.remove(collection, key).await?;
        tracing::debug!(collection, key, "Removed memory");
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        limit: usize,
        min_relevance_score: f64,
        with_embeddings: bool,
    ) -> Result<Vec<MemoryQueryResult>> {
        let Some(embedding) = self.embed(query).await? else {
            tracing::trace!(collection, "Empty query embedding, no search");
            return Ok(Vec::new());
        };

        let matches = self
            .storage
            .get_nearest_matches(collection, &embedding, limit, min_relevance_score, with_embeddings)
            .await?;

        tracing::debug!(collection, limit, min_relevance_score, matches = matches.len(), "Searched memory");
        Ok(matches
            .into_iter()
            .map(|(record, relevance)| project(record, relevance, with_embeddings))
            .collect())
    }

    async fn get_collections(&self) -> Result<Vec<String>> {
        self.storage.get_collections().await
    }

    fn copy(&self) -> Arc<dyn SemanticTextMemory> {
        Arc::new(self.clone())
    }
}

/// Builder for [`DefaultSemanticTextMemory`]; both parts are required.
#[derive(Default)]
pub struct DefaultSemanticTextMemoryBuilder {
    storage: Option<Arc<dyn VectorStore>>,
    embedding_generator: Option<Arc<dyn EmbeddingGenerator>>,
}

impl DefaultSemanticTextMemoryBuilder {
    pub fn with_storage(mut self, storage: Arc<dyn VectorStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_embedding_generator(mut self, embedding_generator: Arc<dyn EmbeddingGenerator>) -> Self {
        self.embedding_generator = Some(embedding_generator);
        self
    }

    pub fn build(self) -> Result<DefaultSemanticTextMemory> {
        let storage = self
            .storage
            .ok_or_else(|| KernelError::InvalidArgument("storage must be set".to_string()))?;
        let embedding_generator = self
            .embedding_generator
            .ok_or_else(|| KernelError::InvalidArgument("embedding generator must be set".to_string()))?;
        Ok(DefaultSemanticTextMemory::new(storage, embedding_generator))
    }
}
