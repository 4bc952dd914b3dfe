//! Prompt template engine seam

use crate::error::Result;
use crate::function::ContextVariables;
use async_trait::async_trait;

/// Renders prompt templates against the run's variables.
///
/// The kernel only stores and hands out the engine; the template syntax is
/// up to the implementation.
#[async_trait]
pub trait PromptTemplateEngine: Send + Sync {
    async fn render(&self, template: &str, variables: &ContextVariables) -> Result<String>;
}

/// Engine that returns every template unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTemplateEngine;

#[async_trait]
impl PromptTemplateEngine for PassthroughTemplateEngine {
    async fn render(&self, template: &str, _variables: &ContextVariables) -> Result<String> {
        Ok(template.to_string())
    }
}
