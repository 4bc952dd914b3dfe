//! Multi-format configuration loading

use super::KernelConfig;
use crate::error::{KernelError, KernelReport};
use config::{Config as Cfg, File, FileFormat};
use error_stack::{Report, ResultExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Failure while reading or decoding a kernel configuration source
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("cannot read config source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(String),

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("config does not match the expected shape: {0}")]
    Serialization(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

static BRACED_VAR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").ok());
static SIMPLE_VAR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").ok());

/// Map a path's extension (case-insensitive) to a [`FileFormat`]: `yaml`/`yml`,
/// `toml`, `json`, `ini`, `ron` or `json5`.
pub fn detect_format(path: &str) -> ConfigResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| ConfigError::UnsupportedFormat("path has no extension".to_string()))?;

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "toml" => Ok(FileFormat::Toml),
        "json" => Ok(FileFormat::Json),
        "ini" => Ok(FileFormat::Ini),
        "ron" => Ok(FileFormat::Ron),
        "json5" => Ok(FileFormat::Json5),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}

/// Expand environment references in `content`.
///
/// Handles `${VAR_NAME}` and `$VAR_NAME`. References to unset variables are
/// left as written.
///
/// ```rust,ignore
/// use weft_kernel::config::substitute_env_vars;
///
/// // with EMBEDDING_ENDPOINT=http://localhost:6334
/// let result = substitute_env_vars("url: ${EMBEDDING_ENDPOINT}");
/// assert_eq!(result, "url: http://localhost:6334");
/// ```
pub fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    for pattern in [&*BRACED_VAR, &*SIMPLE_VAR].into_iter().flatten() {
        result = pattern
            .replace_all(&result, |caps: &regex::Captures| {
                std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
            })
            .to_string();
    }

    result
}

fn build<T: DeserializeOwned>(sources: &[(String, FileFormat)]) -> ConfigResult<T> {
    let mut builder = Cfg::builder();
    for (content, format) in sources {
        builder = builder.add_source(File::from_str(content, *format));
    }

    let config = builder.build().map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::Serialization(e.to_string()))
}

/// Load configuration from a file, detecting the format from its extension
pub fn load_config<T>(path: &str) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    build(&[(substitute_env_vars(&content), format)])
}

/// Decode `content` in the given format, after environment expansion
pub fn from_str<T>(content: &str, format: FileFormat) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    build(&[(substitute_env_vars(content), format)])
}

/// Merge multiple configuration sources; later sources override earlier ones
///
/// ```rust,ignore
/// use weft_kernel::config::{merge_configs, FileFormat, KernelConfig};
///
/// let base = r#"{ "name": "assistant", "function_timeout_ms": 1000 }"#;
/// let local = r#"{ "function_timeout_ms": 5000 }"#;
///
/// let config: KernelConfig = merge_configs(&[(base, FileFormat::Json), (local, FileFormat::Json)])?;
/// assert_eq!(config.function_timeout_ms, Some(5000));
/// ```
pub fn merge_configs<T>(sources: &[(&str, FileFormat)]) -> ConfigResult<T>
where
    T: DeserializeOwned,
{
    let sources: Vec<(String, FileFormat)> = sources
        .iter()
        .map(|(content, format)| (substitute_env_vars(content), *format))
        .collect();
    build(&sources)
}

impl KernelConfig {
    /// 从文件加载内核配置
    /// Load kernel settings from a file
    pub fn from_file(path: impl AsRef<Path>) -> KernelReport<Self> {
        let path = path.as_ref().to_string_lossy().into_owned();
        let config = load_config::<Self>(&path)
            .map_err(|e| Report::new(KernelError::Config(e)))
            .attach(format!("config file: {path}"))?;

        tracing::debug!(path = %path, name = %config.name, "Loaded kernel config");
        Ok(config)
    }

    /// Parse kernel settings from a string
    pub fn from_content(content: &str, format: FileFormat) -> KernelReport<Self> {
        from_str::<Self>(content, format)
            .map_err(|e| Report::new(KernelError::Config(e)))
            .attach(format!("config format: {format:?}"))
    }
}
