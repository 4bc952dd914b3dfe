//! Semantic memory implementations
//!
//! - [`VolatileMemoryStore`]: in-process brute-force vector store
//! - [`QdrantMemoryStore`]: Qdrant-backed vector store (feature `qdrant`)
//! - [`DefaultSemanticTextMemory`]: embedding generator + vector store

pub mod semantic_memory;
pub mod similarity;
pub mod volatile_store;

#[cfg(feature = "qdrant")]
pub mod qdrant_store;

pub use semantic_memory::{DefaultSemanticTextMemory, DefaultSemanticTextMemoryBuilder};
pub use similarity::compute_similarity;
pub use volatile_store::VolatileMemoryStore;

#[cfg(feature = "qdrant")]
pub use qdrant_store::{QdrantConfig, QdrantMemoryStore};
