//! 原生函数
//! Native functions backed by async closures

use crate::error::Result;
use crate::function::result::FunctionResult;
use crate::function::variables::ContextVariables;
use crate::function::KernelFunction;
use crate::kernel::Kernel;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Handler signature of a [`NativeFunction`].
pub type NativeHandler = Arc<
    dyn for<'a> Fn(&'a Kernel, &'a ContextVariables, bool) -> BoxFuture<'a, Result<FunctionResult>>
        + Send
        + Sync,
>;

/// A [`KernelFunction`] implemented by an async closure.
///
/// # Example
///
/// ```rust,ignore
/// use weft_kernel::function::{FunctionResult, NativeFunction};
///
/// let shout = NativeFunction::new("text", "uppercase", |_kernel, vars, _streaming| {
///     Box::pin(async move {
///         let input = vars.input().unwrap_or_default();
///         Ok(FunctionResult::success(input.to_uppercase()))
///     })
/// });
/// kernel.register_function(Arc::new(shout))?;
/// ```
#[derive(Clone)]
pub struct NativeFunction {
    plugin_name: String,
    name: String,
    description: String,
    handler: NativeHandler,
}

impl NativeFunction {
    pub fn new<F>(plugin_name: impl Into<String>, name: impl Into<String>, handler: F) -> Self
    where
        F: for<'a> Fn(&'a Kernel, &'a ContextVariables, bool) -> BoxFuture<'a, Result<FunctionResult>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            plugin_name: plugin_name.into(),
            name: name.into(),
            description: String::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("plugin_name", &self.plugin_name)
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KernelFunction for NativeFunction {
    fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(
        &self,
        kernel: &Kernel,
        variables: &ContextVariables,
        streaming: bool,
    ) -> Result<FunctionResult> {
        (self.handler)(kernel, variables, streaming).await
    }
}
