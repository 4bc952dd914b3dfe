//! Embedding generators

pub mod hash;

pub use hash::HashEmbeddingGenerator;
