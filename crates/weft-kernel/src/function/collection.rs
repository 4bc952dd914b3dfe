//! 函数集合
//! Function collection

use crate::error::{KernelError, Result};
use crate::function::{ContextVariables, FunctionResult, KernelFunction};
use crate::kernel::Kernel;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Plugin name for functions registered without one.
pub const GLOBAL_PLUGIN: &str = "_GLOBAL_FUNCTIONS_";

/// Read-only description of a registered function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionView {
    pub plugin_name: String,
    pub name: String,
    pub description: String,
}

/// Functions keyed by `(plugin, name)`, looked up case-insensitively.
#[derive(Default)]
pub struct FunctionCollection {
    plugins: RwLock<HashMap<String, HashMap<String, Arc<dyn KernelFunction>>>>,
}

fn normalize_plugin(plugin: &str) -> String {
    if plugin.trim().is_empty() {
        GLOBAL_PLUGIN.to_lowercase()
    } else {
        plugin.to_lowercase()
    }
}

impl FunctionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册函数
    /// Register a function, replacing any function with the same key
    pub fn add(&self, function: Arc<dyn KernelFunction>) -> Result<()> {
        if function.name().trim().is_empty() {
            return Err(KernelError::InvalidArgument("function name must not be empty".into()));
        }

        let plugin = normalize_plugin(function.plugin_name());
        let name = function.name().to_lowercase();
        let replaced = self
            .plugins
            .write()
            .entry(plugin)
            .or_default()
            .insert(name, function.clone())
            .is_some();

        tracing::debug!(
            plugin = function.plugin_name(),
            function = function.name(),
            replaced,
            "Registered kernel function"
        );
        Ok(())
    }

    /// Register `function` under `plugin`, whatever plugin it declares itself
    pub fn add_to_plugin(&self, plugin: &str, function: Arc<dyn KernelFunction>) -> Result<()> {
        if function.plugin_name().eq_ignore_ascii_case(plugin) {
            return self.add(function);
        }
        self.add(Arc::new(PluginScoped {
            plugin_name: plugin.to_string(),
            inner: function,
        }))
    }

    /// 获取函数
    /// Look up a function; an empty plugin name means the global plugin
    pub fn get(&self, plugin: &str, name: &str) -> Result<Arc<dyn KernelFunction>> {
        self.try_get(plugin, name)
            .ok_or_else(|| KernelError::function_not_found(plugin, name))
    }

    pub fn try_get(&self, plugin: &str, name: &str) -> Option<Arc<dyn KernelFunction>> {
        self.plugins
            .read()
            .get(&normalize_plugin(plugin))
            .and_then(|functions| functions.get(&name.to_lowercase()))
            .cloned()
    }

    pub fn contains(&self, plugin: &str, name: &str) -> bool {
        self.try_get(plugin, name).is_some()
    }

    /// All functions of `plugin`, sorted by name
    pub fn plugin_functions(&self, plugin: &str) -> Vec<Arc<dyn KernelFunction>> {
        let plugins = self.plugins.read();
        let mut functions: Vec<_> = plugins
            .get(&normalize_plugin(plugin))
            .map(|functions| functions.values().cloned().collect())
            .unwrap_or_default();
        functions.sort_by(|a, b| a.name().cmp(b.name()));
        functions
    }

    /// Views of every registered function, sorted by plugin then name
    pub fn views(&self) -> Vec<FunctionView> {
        let plugins = self.plugins.read();
        let mut views: Vec<FunctionView> = plugins
            .values()
            .flat_map(|functions| functions.values())
            .map(|function| FunctionView {
                plugin_name: function.plugin_name().to_string(),
                name: function.name().to_string(),
                description: function.description().to_string(),
            })
            .collect();
        views.sort_by(|a, b| {
            (a.plugin_name.to_lowercase(), a.name.to_lowercase())
                .cmp(&(b.plugin_name.to_lowercase(), b.name.to_lowercase()))
        });
        views
    }

    pub fn len(&self) -> usize {
        self.plugins.read().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A function re-homed under another plugin name.
struct PluginScoped {
    plugin_name: String,
    inner: Arc<dyn KernelFunction>,
}

#[async_trait]
impl KernelFunction for PluginScoped {
    fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    async fn invoke(
        &self,
        kernel: &Kernel,
        variables: &ContextVariables,
        streaming: bool,
    ) -> Result<FunctionResult> {
        self.inner.invoke(kernel, variables, streaming).await
    }
}
