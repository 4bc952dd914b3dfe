//! 文本记忆插件
//! Text memory plugin
//!
//! Native functions `save`, `recall`, `retrieve` and `remove` over the
//! kernel's semantic memory. Each reads its arguments from the run's
//! [`ContextVariables`]:
//!
//! | variable     | used by                         | fallback                            |
//! |--------------|---------------------------------|-------------------------------------|
//! | `input`      | `save` (text), `recall` (query) | required                            |
//! | `collection` | all                             | `memory.default_collection`         |
//! | `key`        | `save`, `retrieve`, `remove`    | required                            |
//! | `relevance`  | `recall`                        | `memory.default_relevance`          |
//! | `limit`      | `recall`                        | `memory.default_limit`              |

use std::sync::Arc;
use weft_kernel::error::{KernelError, Result};
use weft_kernel::function::{ContextVariables, FunctionResult, INPUT_VARIABLE, KernelFunction, NativeFunction};
use weft_kernel::kernel::Kernel;

pub const PLUGIN_NAME: &str = "memory";

pub const COLLECTION_PARAM: &str = "collection";
pub const KEY_PARAM: &str = "key";
pub const RELEVANCE_PARAM: &str = "relevance";
pub const LIMIT_PARAM: &str = "limit";

/// Separator between recalled texts
const RECALL_SEPARATOR: &str = "\n";

/// Semantic memory as kernel functions.
///
/// # Example
///
/// ```rust,ignore
/// use weft_foundation::plugins::TextMemoryPlugin;
///
/// TextMemoryPlugin::import(&kernel)?;
/// let save = kernel.get_function("memory", "save")?;
/// let recall = kernel.get_function("memory", "recall")?;
/// ```
pub struct TextMemoryPlugin;

impl TextMemoryPlugin {
    pub fn functions() -> Vec<Arc<dyn KernelFunction>> {
        vec![
            Arc::new(
                NativeFunction::new(PLUGIN_NAME, "save", |kernel, vars, _| Box::pin(save(kernel, vars)))
                    .with_description("Save the input text under `key` in a memory collection"),
            ),
            Arc::new(
                NativeFunction::new(PLUGIN_NAME, "recall", |kernel, vars, _| Box::pin(recall(kernel, vars)))
                    .with_description("Recall memories semantically related to the input"),
            ),
            Arc::new(
                NativeFunction::new(PLUGIN_NAME, "retrieve", |kernel, vars, _| Box::pin(retrieve(kernel, vars)))
                    .with_description("Fetch the text stored under `key`"),
            ),
            Arc::new(
                NativeFunction::new(PLUGIN_NAME, "remove", |kernel, vars, _| Box::pin(remove(kernel, vars)))
                    .with_description("Forget the memory stored under `key`"),
            ),
        ]
    }

    /// Register every function under the `memory` plugin
    pub fn import(kernel: &Kernel) -> Result<()> {
        kernel.import_plugin(PLUGIN_NAME, Self::functions())
    }
}

fn collection(kernel: &Kernel, vars: &ContextVariables) -> Result<String> {
    vars.get(COLLECTION_PARAM)
        .filter(|c| !c.trim().is_empty())
        .or_else(|| kernel.config().memory.default_collection.clone())
        .ok_or_else(|| {
            KernelError::InvalidArgument(format!(
                "'{COLLECTION_PARAM}' is not set and no default collection is configured"
            ))
        })
}

fn required(vars: &ContextVariables, name: &str) -> Result<String> {
    vars.get(name)
        .ok_or_else(|| KernelError::InvalidArgument(format!("'{name}' is required")))
}

fn parsed<T>(vars: &ContextVariables, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| KernelError::InvalidArgument(format!("'{name}' = '{raw}': {e}"))),
        None => Ok(default),
    }
}

async fn save(kernel: &Kernel, vars: &ContextVariables) -> Result<FunctionResult> {
    let collection = collection(kernel, vars)?;
    let key = required(vars, KEY_PARAM)?;
    let text = required(vars, INPUT_VARIABLE)?;

    let saved = kernel
        .memory()
        .save_information(&collection, &text, &key, None, None)
        .await?;

    Ok(match saved {
        Some(key) => FunctionResult::success(key),
        None => FunctionResult::empty(),
    })
}

async fn recall(kernel: &Kernel, vars: &ContextVariables) -> Result<FunctionResult> {
    let settings = &kernel.config().memory;
    let collection = collection(kernel, vars)?;
    let relevance = parsed(vars, RELEVANCE_PARAM, settings.default_relevance)?;
    let limit = parsed(vars, LIMIT_PARAM, settings.default_limit)?;
    let query = required(vars, INPUT_VARIABLE)?;

    let hits = kernel
        .memory()
        .search(&collection, &query, limit, relevance, false)
        .await?;

    tracing::debug!(collection = %collection, limit, relevance, hits = hits.len(), "Recalled memories");

    let recalled = hits
        .iter()
        .map(|hit| hit.metadata.text())
        .collect::<Vec<_>>()
        .join(RECALL_SEPARATOR);
    Ok(FunctionResult::success(recalled).with_metadata("count", hits.len().to_string()))
}

async fn retrieve(kernel: &Kernel, vars: &ContextVariables) -> Result<FunctionResult> {
    let collection = collection(kernel, vars)?;
    let key = required(vars, KEY_PARAM)?;

    let hit = kernel.memory().get(&collection, &key, false).await?;
    Ok(FunctionResult::success(
        hit.map(|hit| hit.metadata.text().to_string()).unwrap_or_default(),
    ))
}

async fn remove(kernel: &Kernel, vars: &ContextVariables) -> Result<FunctionResult> {
    let collection = collection(kernel, vars)?;
    let key = required(vars, KEY_PARAM)?;

    kernel.memory().remove(&collection, &key).await?;
    Ok(FunctionResult::empty())
}
