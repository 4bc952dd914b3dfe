//! Crate-level error types for `weft-kernel`.
//!
//! [`KernelError`] is the single error type shared by the service registry,
//! the function pipeline and the semantic memory layer. Ordinary APIs return
//! [`Result`]; the configuration loader returns [`KernelReport`], an
//! [`error_stack::Report`] that carries the file and format context
//! collected while the error propagated.
//!
//! # Usage
//!
//! ```rust,ignore
//! use weft_kernel::error::{KernelError, KernelReport};
//! use error_stack::ResultExt;
//!
//! fn load() -> KernelReport<KernelConfig> {
//!     KernelConfig::from_file("kernel.toml").attach("loading kernel settings")
//! }
//! ```

use crate::ai::CapabilityType;
use thiserror::Error;

/// Errors produced by the kernel, its registries and the memory layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// A required construction input was missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No registry binding exists for the requested capability and id.
    #[error("Service of type {capability} and name {} not registered", service_id.as_deref().unwrap_or("<default>"))]
    ServiceNotFound {
        capability: CapabilityType,
        service_id: Option<String>,
    },

    /// A lazily registered service factory failed to produce an instance.
    #[error("Service of type {capability} could not be initialized: {message}")]
    ServiceInitialization {
        capability: CapabilityType,
        message: String,
    },

    /// No function is registered under the given plugin and function name.
    #[error("Function not found: {plugin}.{function}")]
    FunctionNotFound { plugin: String, function: String },

    /// `run` was called with an unusable pipeline (e.g. no functions).
    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// The embedding generator (or another AI service) failed.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The vector store failed.
    #[error("Storage failed: {0}")]
    Storage(String),

    /// The operation is intentionally not available on this implementation.
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// A function invocation exceeded the configured time budget.
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The run was cancelled before every function completed.
    #[error("Operation was cancelled")]
    Cancelled,

    /// A configuration-related error (requires the `config` feature).
    #[cfg(feature = "config")]
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// A JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal / untyped error described by a message string.
    #[error("{0}")]
    Internal(String),
}

impl KernelError {
    /// Build a [`KernelError::ServiceNotFound`] for a capability and optional id.
    pub fn service_not_found(capability: CapabilityType, service_id: Option<&str>) -> Self {
        Self::ServiceNotFound {
            capability,
            service_id: service_id.map(str::to_string),
        }
    }

    /// Build a [`KernelError::FunctionNotFound`].
    pub fn function_not_found(plugin: impl Into<String>, function: impl Into<String>) -> Self {
        Self::FunctionNotFound {
            plugin: plugin.into(),
            function: function.into(),
        }
    }

    /// Build a [`KernelError::Generation`] from any displayable cause.
    pub fn generation(cause: impl std::fmt::Display) -> Self {
        Self::Generation(cause.to_string())
    }

    /// Build a [`KernelError::Storage`] from any displayable cause.
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        Self::Storage(cause.to_string())
    }

    /// Build a [`KernelError::Timeout`].
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }
}

/// Result alias used across the kernel.
pub type Result<T, E = KernelError> = std::result::Result<T, E>;

/// Result alias carrying an [`error_stack::Report`].
///
/// Equivalent to `Result<T, error_stack::Report<KernelError>>`.
pub type KernelReport<T> = std::result::Result<T, error_stack::Report<KernelError>>;
