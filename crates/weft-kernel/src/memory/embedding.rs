//! EmbeddingGenerator trait definition

use crate::ai::AIService;
use crate::error::Result;
use crate::memory::record::Embedding;
use async_trait::async_trait;

/// Maps a batch of texts to embedding vectors.
///
/// Implementations return one vector per input, in input order, or an empty
/// vector to signal "nothing to embed". Callers treat the empty answer as a
/// no-op, not as a failure.
///
/// # Example
///
/// ```rust,ignore
/// use weft_kernel::memory::EmbeddingGenerator;
///
/// let vectors = generator
///     .generate_embeddings(&["Paris is the capital of France".to_string()])
///     .await?;
/// assert_eq!(vectors.len(), 1);
/// ```
#[async_trait]
pub trait EmbeddingGenerator: AIService {
    /// Embed every text in `texts`.
    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Embed a single text; `None` when the generator produced nothing.
    async fn generate_embedding(&self, text: &str) -> Result<Option<Embedding>> {
        let mut embeddings = self.generate_embeddings(&[text.to_string()]).await?;
        if embeddings.is_empty() {
            Ok(None)
        } else {
            Ok(Some(embeddings.swap_remove(0)))
        }
    }
}
