//! 内核配置
//! Kernel configuration
//!
//! [`KernelConfig`] is always available. With the `config` feature (on by
//! default) it can be loaded from YAML, TOML, JSON, INI, RON or JSON5 files
//! with `${VAR}` / `$VAR` environment substitution.

#[cfg(feature = "config")]
mod loader;

#[cfg(feature = "config")]
pub use config::FileFormat;
#[cfg(feature = "config")]
pub use loader::{ConfigError, ConfigResult, detect_format, from_str, load_config, merge_configs, substitute_env_vars};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kernel-wide settings.
///
/// # Example
///
/// ```toml
/// name = "assistant"
/// function_timeout_ms = 30000
/// max_concurrent_functions = 4
///
/// [memory]
/// default_collection = "facts"
/// default_relevance = 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Kernel name, used in log spans
    pub name: String,
    /// Per-function time budget; `None` means unbounded
    pub function_timeout_ms: Option<u64>,
    /// Upper bound on in-flight invocations per run; `None` or `Some(0)` means unbounded
    pub max_concurrent_functions: Option<usize>,
    /// Defaults for memory plugins
    pub memory: MemorySettings,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "weft".to_string(),
            function_timeout_ms: None,
            max_concurrent_functions: None,
            memory: MemorySettings::default(),
        }
    }
}

impl KernelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_function_timeout(mut self, timeout: Duration) -> Self {
        self.function_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Cap in-flight invocations per run; `0` lifts the cap
    pub fn with_max_concurrent_functions(mut self, max: usize) -> Self {
        self.max_concurrent_functions = Some(max);
        self
    }

    pub fn with_memory_settings(mut self, memory: MemorySettings) -> Self {
        self.memory = memory;
        self
    }

    /// Per-function time budget
    pub fn function_timeout(&self) -> Option<Duration> {
        self.function_timeout_ms.map(Duration::from_millis)
    }
}

/// Defaults used by memory plugins when a run does not supply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Collection used when the `collection` variable is absent
    pub default_collection: Option<String>,
    /// Minimum relevance for recall
    pub default_relevance: f64,
    /// Maximum number of recalled memories
    pub default_limit: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            default_collection: None,
            default_relevance: 0.75,
            default_limit: 1,
        }
    }
}
