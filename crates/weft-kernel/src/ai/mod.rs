//! AI 服务能力与注册中心
//! AI service capabilities and registry
//!
//! AI services are opaque capability objects. The kernel only needs to know
//! *what* a service does (its [`CapabilityType`]) and *which* instance the
//! caller wants (an optional service id); everything else is behind the
//! service's own trait.

pub mod registry;
pub mod service;

pub use registry::{ServiceBinding, ServiceFactory, ServiceRegistry};
pub use service::{
    AIService, Capability, CapabilityType, MODEL_ID_KEY, TextCompletion, TextCompletionService,
    TextEmbeddingGeneration,
};
