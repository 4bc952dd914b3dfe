//! Memory record types
//!
//! Records are what a [`VectorStore`](super::VectorStore) persists; query
//! results are the read-time projection handed back to callers.

use serde::{Deserialize, Serialize};

/// An embedding vector.
pub type Embedding = Vec<f32>;

/// Descriptive half of a memory record.
///
/// Immutable once constructed; fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecordMetadata {
    is_reference: bool,
    id: String,
    text: String,
    description: Option<String>,
    external_source_name: String,
    additional_metadata: Option<String>,
}

impl MemoryRecordMetadata {
    pub fn new(
        is_reference: bool,
        id: impl Into<String>,
        text: impl Into<String>,
        description: Option<String>,
        external_source_name: impl Into<String>,
        additional_metadata: Option<String>,
    ) -> Self {
        Self {
            is_reference,
            id: id.into(),
            text: text.into(),
            description,
            external_source_name: external_source_name.into(),
            additional_metadata,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    /// Id, unique within a collection
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Name of the external system the record points into (empty for local records)
    pub fn external_source_name(&self) -> &str {
        &self.external_source_name
    }

    pub fn additional_metadata(&self) -> Option<&str> {
        self.additional_metadata.as_deref()
    }
}

/// A persisted memory: metadata plus its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub metadata: MemoryRecordMetadata,
    pub embedding: Embedding,
    pub collection: String,
    /// Store key; assigned by the store on upsert when absent
    pub key: Option<String>,
}

impl MemoryRecord {
    pub fn new(
        metadata: MemoryRecordMetadata,
        embedding: Embedding,
        collection: impl Into<String>,
        key: Option<String>,
    ) -> Self {
        Self {
            metadata,
            embedding,
            collection: collection.into(),
            key,
        }
    }

    /// Same record with `key` set
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Same record without its embedding, for reads that did not ask for it
    pub fn without_embedding(mut self) -> Self {
        self.embedding = Vec::new();
        self
    }

    /// Embedding dimensionality
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// One answer to a memory lookup or search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryQueryResult {
    pub metadata: MemoryRecordMetadata,
    /// Higher is more similar; exact lookups report 1.0
    pub relevance: f64,
    /// Present only when the caller asked for embeddings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Embedding>,
}

impl MemoryQueryResult {
    pub fn new(metadata: MemoryRecordMetadata, relevance: f64) -> Self {
        Self {
            metadata,
            relevance,
            embedding: None,
        }
    }

    /// Project a stored record and its score, keeping the embedding if it was loaded.
    pub fn from_record(record: MemoryRecord, relevance: f64) -> Self {
        let embedding = if record.embedding.is_empty() {
            None
        } else {
            Some(record.embedding)
        };
        Self {
            metadata: record.metadata,
            relevance,
            embedding,
        }
    }
}
