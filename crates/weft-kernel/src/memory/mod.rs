//! Semantic memory traits and types
//!
//! Defines the records, the vector store and embedding generator
//! abstractions, and the `SemanticTextMemory` contract. Concrete
//! implementations live in weft-foundation.

pub mod embedding;
pub mod record;
pub mod semantic;
pub mod store;

pub use embedding::EmbeddingGenerator;
pub use record::{Embedding, MemoryQueryResult, MemoryRecord, MemoryRecordMetadata};
pub use semantic::{NullMemory, SemanticTextMemory};
pub use store::{SimilarityMetric, VectorStore};
