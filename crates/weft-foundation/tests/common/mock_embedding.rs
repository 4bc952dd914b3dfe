//! Mock embedding generator for `weft-foundation` integration tests.
//!
//! [`MockEmbeddingGenerator`] implements
//! [`weft_kernel::memory::EmbeddingGenerator`]. By default every text maps to
//! a keyword-count vector: one axis per configured keyword, counting
//! case-insensitive occurrences. That keeps relevance scores predictable
//! without a model.
//!
//! | Need | Builder call |
//! |------|--------------|
//! | Fixed axes | `keywords([...])` |
//! | Canned answer for the next call | `respond_with(vec![...])` |
//! | "Nothing to embed" | `respond_empty()` |
//! | Failure | `respond_with_error("...")` |
//!
//! Queued responses are consumed FIFO; once drained the keyword vectors are
//! used again. Every batch is recorded.
//!
//! # Example
//!
//! ```rust,ignore
//! let mock = MockEmbeddingGenerator::builder()
//!     .keywords(["paris", "france"])
//!     .respond_with_error("quota exceeded")
//!     .build();
//!
//! assert!(mock.generate_embedding("Paris").await.is_err());
//! assert_eq!(mock.generate_embedding("Paris").await.unwrap(), Some(vec![1.0, 0.0]));
//! assert_eq!(mock.call_count(), 2);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use weft_kernel::ai::{AIService, MODEL_ID_KEY};
use weft_kernel::error::{KernelError, Result};
use weft_kernel::memory::{Embedding, EmbeddingGenerator};

/// Keywords used when the builder is not given any
pub const FACT_KEYWORDS: [&str; 5] = ["paris", "france", "tokyo", "japan", "capital"];

enum Canned {
    Vectors(Vec<Embedding>),
    Error(String),
}

struct MockState {
    /// Every batch passed to `generate_embeddings`, in call order
    calls: Vec<Vec<String>>,
    responses: VecDeque<Canned>,
}

/// Deterministic, observable [`EmbeddingGenerator`].
#[derive(Clone)]
pub struct MockEmbeddingGenerator {
    keywords: Arc<Vec<String>>,
    state: Arc<Mutex<MockState>>,
}

impl MockEmbeddingGenerator {
    pub fn builder() -> MockEmbeddingGeneratorBuilder {
        MockEmbeddingGeneratorBuilder::default()
    }

    /// Keyword generator over [`FACT_KEYWORDS`]
    pub fn facts() -> Self {
        Self::builder().build()
    }

    pub fn dimensions(&self) -> usize {
        self.keywords.len()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn last_call(&self) -> Option<Vec<String>> {
        self.state.lock().unwrap().calls.last().cloned()
    }

    /// Queue one more response after construction
    pub fn push_error(&self, message: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Canned::Error(message.into()));
    }

    pub fn keyword_vector(&self, text: &str) -> Embedding {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .map(|keyword| text.matches(keyword.as_str()).count() as f32)
            .collect()
    }
}

impl AIService for MockEmbeddingGenerator {
    fn attributes(&self) -> HashMap<String, String> {
        HashMap::from([(MODEL_ID_KEY.to_string(), "mock-keywords".to_string())])
    }
}

#[async_trait]
impl EmbeddingGenerator for MockEmbeddingGenerator {
    async fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let canned = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(texts.to_vec());
            state.responses.pop_front()
        };

        match canned {
            Some(Canned::Vectors(vectors)) => Ok(vectors),
            Some(Canned::Error(message)) => Err(KernelError::Generation(message)),
            None => Ok(texts.iter().map(|text| self.keyword_vector(text)).collect()),
        }
    }
}

#[derive(Default)]
pub struct MockEmbeddingGeneratorBuilder {
    keywords: Option<Vec<String>>,
    responses: VecDeque<Canned>,
}

impl MockEmbeddingGeneratorBuilder {
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(|k| k.into().to_lowercase()).collect());
        self
    }

    pub fn respond_with(mut self, vectors: Vec<Embedding>) -> Self {
        self.responses.push_back(Canned::Vectors(vectors));
        self
    }

    pub fn respond_empty(self) -> Self {
        self.respond_with(Vec::new())
    }

    pub fn respond_with_error(mut self, message: impl Into<String>) -> Self {
        self.responses.push_back(Canned::Error(message.into()));
        self
    }

    pub fn build(self) -> MockEmbeddingGenerator {
        let keywords = self
            .keywords
            .unwrap_or_else(|| FACT_KEYWORDS.iter().map(|k| k.to_string()).collect());
        MockEmbeddingGenerator {
            keywords: Arc::new(keywords),
            state: Arc::new(Mutex::new(MockState {
                calls: Vec::new(),
                responses: self.responses,
            })),
        }
    }
}
