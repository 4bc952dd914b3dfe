//! AI 服务 Trait 与能力标签
//! AI service traits and capability tags

use crate::error::Result;
use crate::memory::EmbeddingGenerator;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Attribute key under which services publish their model id.
pub const MODEL_ID_KEY: &str = "ModelId";

/// 所有 AI 服务的公共接口
/// Common interface of every AI service
///
/// The kernel imposes no behavioural contract beyond identity: services are
/// stored and resolved, never introspected. `attributes` lets a service
/// describe itself (model id, endpoint, ...) to callers that care.
pub trait AIService: Send + Sync {
    /// Free-form service attributes
    fn attributes(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// Model id published under [`MODEL_ID_KEY`], if any
    fn model_id(&self) -> Option<String> {
        self.attributes().get(MODEL_ID_KEY).cloned()
    }
}

/// 能力类型标签
/// Capability type tag
///
/// Part of every registry key. Built-in capabilities have their own variant;
/// applications add their own with [`CapabilityType::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum CapabilityType {
    /// Prompt in, text out
    TextCompletion,
    /// Text in, embedding vector out
    TextEmbeddingGeneration,
    /// Application-defined capability
    Custom(&'static str),
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextCompletion => f.write_str("TextCompletion"),
            Self::TextEmbeddingGeneration => f.write_str("TextEmbeddingGeneration"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// 能力标记 Trait
/// Capability marker trait
///
/// Ties a [`CapabilityType`] tag to the trait object the registry hands back
/// for it, so resolution is typed without any runtime reflection.
///
/// # Example
///
/// ```rust,ignore
/// use weft_kernel::ai::{AIService, Capability, CapabilityType};
///
/// pub trait ImageGenerator: AIService {
///     fn render(&self, prompt: &str) -> Vec<u8>;
/// }
///
/// pub struct ImageGeneration;
///
/// impl Capability for ImageGeneration {
///     type Service = dyn ImageGenerator;
///     fn capability_type() -> CapabilityType {
///         CapabilityType::Custom("ImageGeneration")
///     }
/// }
///
/// let generator = kernel.get_service::<ImageGeneration>(Some("dall-e"))?;
/// ```
pub trait Capability: 'static {
    /// Service trait object stored for this capability
    type Service: ?Sized + Send + Sync + 'static;

    /// Tag used in registry keys and error messages
    fn capability_type() -> CapabilityType;
}

/// Text completion service
#[async_trait]
pub trait TextCompletionService: AIService {
    /// Complete `prompt` and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Marker for [`TextCompletionService`] registrations
pub struct TextCompletion;

impl Capability for TextCompletion {
    type Service = dyn TextCompletionService;

    fn capability_type() -> CapabilityType {
        CapabilityType::TextCompletion
    }
}

/// Marker for [`EmbeddingGenerator`] registrations
pub struct TextEmbeddingGeneration;

impl Capability for TextEmbeddingGeneration {
    type Service = dyn EmbeddingGenerator;

    fn capability_type() -> CapabilityType {
        CapabilityType::TextEmbeddingGeneration
    }
}
