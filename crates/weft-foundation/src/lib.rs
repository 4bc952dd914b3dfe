//! Weft foundation
//!
//! Concrete services for the Weft kernel:
//!
//! - [`memory`]: vector stores and [`DefaultSemanticTextMemory`](memory::DefaultSemanticTextMemory)
//! - [`embedding`]: embedding generators
//! - [`plugins`]: kernel functions such as [`TextMemoryPlugin`](plugins::TextMemoryPlugin)

// embedding generators
pub mod embedding;

// memory module - vector stores and semantic text memory
pub mod memory;

// plugins
pub mod plugins;

pub use embedding::HashEmbeddingGenerator;
pub use memory::{DefaultSemanticTextMemory, VolatileMemoryStore};
pub use plugins::TextMemoryPlugin;
