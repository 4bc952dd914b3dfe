//! 内核函数
//! Kernel functions
//!
//! The unit of work a pipeline runs, the variables it shares with its
//! siblings and the results it reports.

pub mod collection;
pub mod native;
pub mod result;
pub mod variables;

pub use collection::{FunctionCollection, FunctionView, GLOBAL_PLUGIN};
pub use native::{NativeFunction, NativeHandler};
pub use result::{FunctionResult, KernelResult};
pub use variables::{ContextVariables, INPUT_VARIABLE};

use crate::error::Result;
use crate::kernel::Kernel;
use async_trait::async_trait;

/// 内核函数 Trait
/// Kernel function trait
///
/// A function may read and write the shared [`ContextVariables`] and reach
/// services and memory through the [`Kernel`]. Returning `Err` does not abort
/// the run: the kernel records a failed [`FunctionResult`] in the function's
/// slot.
#[async_trait]
pub trait KernelFunction: Send + Sync {
    /// Plugin the function belongs to
    fn plugin_name(&self) -> &str;

    /// Function name, unique within its plugin
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// 执行函数
    /// Invoke the function
    async fn invoke(
        &self,
        kernel: &Kernel,
        variables: &ContextVariables,
        streaming: bool,
    ) -> Result<FunctionResult>;
}
