//! Kernel pipelines that read and write semantic memory through the
//! `memory` plugin.

mod common;

use std::fs;
use std::sync::Arc;

use common::mock_embedding::MockEmbeddingGenerator;
use tempfile::TempDir;
use weft_foundation::memory::{DefaultSemanticTextMemory, VolatileMemoryStore};
use weft_foundation::plugins::TextMemoryPlugin;
use weft_kernel::ai::TextEmbeddingGeneration;
use weft_kernel::config::KernelConfig;
use weft_kernel::function::{ContextVariables, FunctionResult, KernelFunction, NativeFunction};
use weft_kernel::memory::{EmbeddingGenerator, SemanticTextMemory};
use weft_kernel::{Kernel, KernelError};

fn memory_kernel(config: KernelConfig, generator: MockEmbeddingGenerator) -> Kernel {
    common::init_tracing();
    let generator: Arc<dyn EmbeddingGenerator> = Arc::new(generator);
    let kernel = Kernel::builder()
        .with_configuration(config)
        .with_default_ai_service::<TextEmbeddingGeneration>(generator.clone())
        .with_memory_storage_and_embedding_generator(Arc::new(VolatileMemoryStore::cosine()), generator)
        .with_semantic_memory_factory(DefaultSemanticTextMemory::factory())
        .build()
        .unwrap();
    TextMemoryPlugin::import(&kernel).unwrap();
    kernel
}

fn facts_config() -> KernelConfig {
    let mut config = KernelConfig::new("facts-kernel");
    config.memory.default_collection = Some("facts".to_string());
    config.memory.default_relevance = 0.0;
    config
}

async fn remember(kernel: &Kernel, key: &str, text: &str) {
    let save = kernel.get_function("memory", "save").unwrap();
    let vars = ContextVariables::with_input(text);
    vars.set("key", key);
    let result = kernel.run(vars, false, &[save]).await.unwrap();
    assert!(result.is_success(), "save failed: {:?}", result.errors());
}

#[tokio::test]
async fn recall_through_a_pipeline() {
    let kernel = memory_kernel(facts_config(), MockEmbeddingGenerator::facts());
    remember(&kernel, "f1", "Paris is the capital of France").await;
    remember(&kernel, "f2", "Tokyo is the capital of Japan").await;

    let recall = kernel.get_function("memory", "recall").unwrap();
    let result = kernel.run_with_input("capital of France", &[recall]).await.unwrap();

    assert_eq!(result.len(), 1);
    let hit = result.get(0).unwrap();
    assert_eq!(hit.plugin_name, "memory");
    assert_eq!(hit.function_name, "recall");
    assert_eq!(hit.value(), Some("Paris is the capital of France"));
}

#[tokio::test]
async fn mixed_pipeline_keeps_slot_order_and_isolates_failures() {
    let kernel = memory_kernel(facts_config(), MockEmbeddingGenerator::facts());
    remember(&kernel, "f2", "Tokyo is the capital of Japan").await;

    let echo: Arc<dyn KernelFunction> = Arc::new(NativeFunction::new("text", "echo", |_kernel, vars, _| {
        Box::pin(async move { Ok(FunctionResult::success(vars.input().unwrap_or_default())) })
    }));
    let pipeline = [
        kernel.get_function("memory", "retrieve").unwrap(),
        kernel.get_function("memory", "recall").unwrap(),
        echo,
    ];

    let vars = ContextVariables::with_input("capital of Japan");
    vars.set("key", "f2");
    vars.set("limit", "several");
    let result = kernel.run(vars, false, &pipeline).await.unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result.get(0).unwrap().value(), Some("Tokyo is the capital of Japan"));
    assert!(!result.get(1).unwrap().success);
    assert_eq!(result.get(2).unwrap().value(), Some("capital of Japan"));

    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, 1);
    assert!(!result.is_success());
}

#[tokio::test]
async fn embedding_service_and_memory_share_the_generator() {
    let generator = MockEmbeddingGenerator::facts();
    let kernel = memory_kernel(facts_config(), generator.clone());

    let service = kernel.get_service::<TextEmbeddingGeneration>(None).unwrap();
    assert_eq!(service.model_id().as_deref(), Some("mock-keywords"));

    service.generate_embedding("Paris").await.unwrap();
    remember(&kernel, "f1", "Paris is the capital of France").await;
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn generator_error_fails_only_the_memory_slot() {
    let generator = MockEmbeddingGenerator::builder()
        .respond_with_error("embedding backend down")
        .build();
    let kernel = memory_kernel(facts_config(), generator);

    let save = kernel.get_function("memory", "save").unwrap();
    let vars = ContextVariables::with_input("Paris is the capital of France");
    vars.set("key", "f1");
    let result = kernel.run(vars, false, &[save]).await.unwrap();

    let failed = result.get(0).unwrap();
    assert!(!failed.success);
    assert!(failed.error().unwrap().contains("embedding backend down"));

    let missing = kernel.memory().get("facts", "f1", false).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn replaced_memory_is_seen_by_plugins() {
    let kernel = memory_kernel(facts_config(), MockEmbeddingGenerator::facts());
    remember(&kernel, "f1", "Paris is the capital of France").await;

    let fresh: Arc<dyn SemanticTextMemory> = Arc::new(DefaultSemanticTextMemory::new(
        Arc::new(VolatileMemoryStore::cosine()),
        Arc::new(MockEmbeddingGenerator::facts()),
    ));
    kernel.set_memory(fresh);

    let retrieve = kernel.get_function("memory", "retrieve").unwrap();
    let vars = ContextVariables::new();
    vars.set("key", "f1");
    let result = kernel.run(vars, false, &[retrieve]).await.unwrap();
    assert_eq!(result.last_value(), Some(""));
}

#[tokio::test]
async fn kernel_configured_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kernel.toml");
    fs::write(
        &path,
        "name = \"file-kernel\"\n\n[memory]\ndefault_collection = \"notes\"\ndefault_relevance = 0.0\ndefault_limit = 2\n",
    )
    .unwrap();

    let config = KernelConfig::from_file(&path).unwrap();
    let kernel = memory_kernel(config, MockEmbeddingGenerator::facts());
    assert_eq!(kernel.config().name, "file-kernel");

    remember(&kernel, "n1", "Paris is the capital of France").await;
    remember(&kernel, "n2", "Tokyo is the capital of Japan").await;

    let recall = kernel.get_function("memory", "recall").unwrap();
    let result = kernel.run_with_input("capital", &[recall]).await.unwrap();
    let hit = result.get(0).unwrap();
    assert_eq!(hit.metadata.get("count").map(String::as_str), Some("2"));
    assert_eq!(kernel.memory().get_collections().await.unwrap(), vec!["notes".to_string()]);
}

#[tokio::test]
async fn empty_pipeline_is_rejected() {
    let kernel = memory_kernel(facts_config(), MockEmbeddingGenerator::facts());
    let result = kernel.run_default(&[]).await;
    assert!(matches!(result, Err(KernelError::InvalidPipeline(_))));
}

#[tokio::test]
async fn memory_storage_borrows_the_default_embedding_service() {
    common::init_tracing();
    let generator = MockEmbeddingGenerator::facts();
    let kernel = Kernel::builder()
        .with_configuration(facts_config())
        .with_default_ai_service::<TextEmbeddingGeneration>(Arc::new(generator.clone()))
        .with_memory_storage(Arc::new(VolatileMemoryStore::cosine()))
        .with_semantic_memory_factory(DefaultSemanticTextMemory::factory())
        .build()
        .unwrap();
    TextMemoryPlugin::import(&kernel).unwrap();

    remember(&kernel, "f1", "Paris is the capital of France").await;
    remember(&kernel, "f2", "Tokyo is the capital of Japan").await;

    let recall = kernel.get_function("memory", "recall").unwrap();
    let result = kernel.run_with_input("capital of Japan", &[recall]).await.unwrap();

    assert_eq!(result.last_value(), Some("Tokyo is the capital of Japan"));
    assert_eq!(generator.call_count(), 3);
}
