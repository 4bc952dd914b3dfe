//! Feature-hashing embedding generator

use async_trait::async_trait;
use std::collections::HashMap;
use weft_kernel::ai::{AIService, MODEL_ID_KEY};
use weft_kernel::error::Result;
use weft_kernel::memory::{Embedding, EmbeddingGenerator};

/// A deterministic, API-free embedding generator based on FNV-1a hashing.
///
/// Combines word-level and character-bigram features into a fixed-dimensional
/// L2-normalised vector. Texts that share words and character patterns get a
/// higher cosine similarity than unrelated texts.
///
/// Needs no network access, which makes it the generator of choice for tests,
/// demos and offline deployments. Swap in an API-backed generator by
/// implementing [`EmbeddingGenerator`].
#[derive(Debug, Clone)]
pub struct HashEmbeddingGenerator {
    dims: usize,
}

impl HashEmbeddingGenerator {
    /// Create a generator producing `dims`-dimensional vectors (at least one).
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    /// 128 dimensions, enough for small datasets.
    pub fn with_128_dims() -> Self {
        Self::new(128)
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed(&self, text: &str) -> Embedding {
        let mut embedding = vec![0.0f32; self.dims];
        let text_lower = text.to_lowercase();

        // Word-level features (weight 1.0)
        for word in text_lower.split_whitespace() {
            let h = fnv1a(word.as_bytes());
            embedding[h as usize % self.dims] += 1.0;
        }

        // Character bigram features (weight 0.5)
        let bytes: Vec<u8> = text_lower.bytes().collect();
        for bigram in bytes.windows(2) {
            let h = fnv1a(bigram);
            embedding[h as usize % self.dims] += 0.5;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

impl Default for HashEmbeddingGenerator {
    fn default() -> Self {
        Self::with_128_dims()
    }
}

impl AIService for HashEmbeddingGenerator {
    fn attributes(&self) -> HashMap<String, String> {
        HashMap::from([(MODEL_ID_KEY.to_string(), format!("fnv1a-hash-{}", self.dims))])
    }
}

#[async_trait]
impl EmbeddingGenerator for HashEmbeddingGenerator {
    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        tracing::trace!(texts = texts.len(), dims = self.dims, "Hashing embeddings");
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }
}

/// FNV-1a 64-bit hash
pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 14695981039346656037;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_one_vector_per_text_in_order() {
        let generator = HashEmbeddingGenerator::new(64);
        let texts = vec!["hello world".to_string(), "".to_string(), "hello".to_string()];

        let vectors = generator.generate_embeddings(&texts).await.unwrap();

        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.len() == 64));
        assert_eq!(vectors[1].iter().map(|x| x * x).sum::<f32>(), 0.0);
    }

    #[tokio::test]
    async fn test_embeddings_are_normalised() {
        let generator = HashEmbeddingGenerator::with_128_dims();
        let vector = generator.generate_embedding("some test text").await.unwrap().unwrap();
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "embedding should be unit-length, got norm={norm}");
    }

    #[tokio::test]
    async fn test_similar_texts_closer() {
        let generator = HashEmbeddingGenerator::with_128_dims();
        let texts = vec![
            "rust programming language".to_string(),
            "rust language systems".to_string(),
            "python data science machine learning".to_string(),
        ];
        let v = generator.generate_embeddings(&texts).await.unwrap();

        assert!(dot(&v[0], &v[1]) > dot(&v[0], &v[2]));
    }

    #[tokio::test]
    async fn test_deterministic() {
        let generator = HashEmbeddingGenerator::default();
        let a = generator.generate_embedding("deterministic embedding").await.unwrap();
        let b = generator.generate_embedding("deterministic embedding").await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_model_id_attribute() {
        let generator = HashEmbeddingGenerator::new(0);
        assert_eq!(generator.dimensions(), 1);
        assert_eq!(generator.model_id().as_deref(), Some("fnv1a-hash-1"));
    }
}
