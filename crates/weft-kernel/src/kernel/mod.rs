//! 内核
//! The kernel: registries plus the pipeline executor
//!
//! A [`Kernel`] owns the AI service registry, the function collection, the
//! semantic memory and the kernel settings. [`Kernel::run`] invokes a batch
//! of functions against one shared [`ContextVariables`] and joins them.

mod builder;
mod template;

pub use builder::{KernelBuilder, SemanticTextMemoryFactory};
pub use template::{PassthroughTemplateEngine, PromptTemplateEngine};

use crate::ai::{Capability, ServiceRegistry};
use crate::config::KernelConfig;
use crate::error::{KernelError, Result};
use crate::function::{ContextVariables, FunctionCollection, FunctionResult, KernelFunction, KernelResult};
use crate::memory::{NullMemory, SemanticTextMemory};
use futures::{StreamExt, future, stream};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// 内核
/// Kernel
///
/// Holds no per-run state: every run gets its own variables and result, so
/// one kernel may serve any number of concurrent runs.
///
/// # Example
///
/// ```rust,ignore
/// use weft_kernel::kernel::KernelBuilder;
///
/// let kernel = KernelBuilder::new()
///     .with_memory(memory)
///     .build()?;
///
/// let recall = kernel.get_function("memory", "recall")?;
/// let result = kernel.run_with_input("capital of France", &[recall]).await?;
/// println!("{}", result.last_value().unwrap_or_default());
/// ```
pub struct Kernel {
    config: KernelConfig,
    template_engine: Arc<dyn PromptTemplateEngine>,
    memory: RwLock<Arc<dyn SemanticTextMemory>>,
    services: ServiceRegistry,
    functions: FunctionCollection,
}

impl Kernel {
    /// 创建内核
    /// Create a kernel
    ///
    /// A supplied memory is kept as a [`copy`](SemanticTextMemory::copy);
    /// without one the kernel uses [`NullMemory`].
    pub fn new(
        config: Option<KernelConfig>,
        template_engine: Arc<dyn PromptTemplateEngine>,
        memory: Option<Arc<dyn SemanticTextMemory>>,
        services: ServiceRegistry,
    ) -> Result<Self> {
        let config =
            config.ok_or_else(|| KernelError::InvalidArgument("kernel configuration is required".to_string()))?;
        let memory = match memory {
            Some(memory) => memory.copy(),
            None => Arc::new(NullMemory::new()),
        };

        tracing::debug!(kernel = %config.name, services = services.len(), "Created kernel");

        Ok(Self {
            config,
            template_engine,
            memory: RwLock::new(memory),
            services,
            functions: FunctionCollection::new(),
        })
    }

    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn template_engine(&self) -> Arc<dyn PromptTemplateEngine> {
        self.template_engine.clone()
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// 当前语义记忆
    /// Current semantic memory
    pub fn memory(&self) -> Arc<dyn SemanticTextMemory> {
        self.memory.read().clone()
    }

    /// Replace the semantic memory; runs already in flight keep the old one
    pub fn set_memory(&self, memory: Arc<dyn SemanticTextMemory>) {
        *self.memory.write() = memory.copy();
    }

    /// 获取 AI 服务
    /// Resolve an AI service by capability and optional id
    pub fn get_service<C: Capability>(&self, service_id: Option<&str>) -> Result<Arc<C::Service>> {
        self.services.resolve::<C>(service_id)
    }

    pub fn functions(&self) -> &FunctionCollection {
        &self.functions
    }

    pub fn get_function(&self, plugin: &str, function: &str) -> Result<Arc<dyn KernelFunction>> {
        self.functions.get(plugin, function)
    }

    pub fn register_function(&self, function: Arc<dyn KernelFunction>) -> Result<()> {
        self.functions.add(function)
    }

    /// 导入插件
    /// Register every function in `functions` under `plugin_name`
    pub fn import_plugin<I>(&self, plugin_name: &str, functions: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn KernelFunction>>,
    {
        let mut count = 0usize;
        for function in functions {
            self.functions.add_to_plugin(plugin_name, function)?;
            count += 1;
        }
        tracing::debug!(plugin = plugin_name, functions = count, "Imported plugin");
        Ok(())
    }

    /// 运行流水线
    /// Run a pipeline
    ///
    /// Every function is started against the same `variables` and the call
    /// returns once all of them have finished. Results are listed in pipeline
    /// order. A function that fails or runs past the configured timeout leaves
    /// a failed [`FunctionResult`] in its slot without affecting the others.
    pub async fn run(
        &self,
        variables: ContextVariables,
        streaming: bool,
        pipeline: &[Arc<dyn KernelFunction>],
    ) -> Result<KernelResult> {
        ensure_non_empty(pipeline)?;

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "kernel_run",
            kernel = %self.config.name,
            %run_id,
            functions = pipeline.len(),
            streaming
        );

        async move {
            let invocations = pipeline
                .iter()
                .enumerate()
                .map(|(slot, function)| self.invoke_slot(slot, function.as_ref(), &variables, streaming));

            let results: Vec<FunctionResult> = match self.config.max_concurrent_functions {
                Some(limit) if limit > 0 => stream::iter(invocations).buffered(limit).collect().await,
                _ => future::join_all(invocations).await,
            };

            let result = KernelResult::new(results);
            tracing::debug!(
                succeeded = result.iter().filter(|r| r.success).count(),
                failed = result.errors().len(),
                "Pipeline run finished"
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Run with a fresh variable set whose `input` is `input`
    pub async fn run_with_input(
        &self,
        input: impl Into<String>,
        pipeline: &[Arc<dyn KernelFunction>],
    ) -> Result<KernelResult> {
        self.run(ContextVariables::with_input(input), false, pipeline).await
    }

    /// Run with an empty variable set
    pub async fn run_default(&self, pipeline: &[Arc<dyn KernelFunction>]) -> Result<KernelResult> {
        self.run(ContextVariables::new(), false, pipeline).await
    }

    /// Run until finished or until `token` is cancelled.
    ///
    /// On cancellation every in-flight invocation is dropped and the call
    /// fails with [`KernelError::Cancelled`].
    pub async fn run_until_cancelled(
        &self,
        variables: ContextVariables,
        streaming: bool,
        pipeline: &[Arc<dyn KernelFunction>],
        token: CancellationToken,
    ) -> Result<KernelResult> {
        ensure_non_empty(pipeline)?;

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::warn!(kernel = %self.config.name, "Pipeline run cancelled");
                Err(KernelError::Cancelled)
            }
            result = self.run(variables, streaming, pipeline) => result,
        }
    }

    async fn invoke_slot(
        &self,
        slot: usize,
        function: &dyn KernelFunction,
        variables: &ContextVariables,
        streaming: bool,
    ) -> FunctionResult {
        let plugin = function.plugin_name();
        let name = function.name();
        tracing::debug!(slot, plugin, function = name, "Invoking function");

        let invocation = function.invoke(self, variables, streaming);
        let outcome = match self.config.function_timeout() {
            Some(budget) => match tokio::time::timeout(budget, invocation).await {
                Ok(outcome) => outcome,
                Err(_) => Err(KernelError::timeout(budget.as_millis() as u64)),
            },
            None => invocation.await,
        };

        match outcome {
            Ok(result) => {
                if !result.success {
                    tracing::warn!(slot, plugin, function = name, error = ?result.error, "Function reported failure");
                }
                result.for_function(plugin, name)
            }
            Err(e) => {
                tracing::warn!(slot, plugin, function = name, error = %e, "Function failed");
                FunctionResult::failure(e.to_string()).for_function(plugin, name)
            }
        }
    }
}

fn ensure_non_empty(pipeline: &[Arc<dyn KernelFunction>]) -> Result<()> {
    if pipeline.is_empty() {
        return Err(KernelError::InvalidPipeline(
            "pipeline must contain at least one function".to_string(),
        ));
    }
    Ok(())
}
