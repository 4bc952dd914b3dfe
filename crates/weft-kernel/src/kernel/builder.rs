//! Kernel builder

use super::{Kernel, PassthroughTemplateEngine, PromptTemplateEngine};
use crate::ai::{Capability, ServiceBinding, ServiceRegistry, TextEmbeddingGeneration};
use crate::config::KernelConfig;
use crate::error::{KernelError, Result};
use crate::memory::{EmbeddingGenerator, SemanticTextMemory, VectorStore};
use std::sync::Arc;

/// Builds a [`SemanticTextMemory`] from a vector store and an embedding
/// generator.
///
/// The kernel crate has no memory implementation of its own; weft-foundation
/// supplies one for `DefaultSemanticTextMemory`.
pub type SemanticTextMemoryFactory = Arc<
    dyn Fn(Arc<dyn VectorStore>, Arc<dyn EmbeddingGenerator>) -> Result<Arc<dyn SemanticTextMemory>>
        + Send
        + Sync,
>;

/// Registration replayed against the registry once the configuration is known.
type PendingRegistration = Box<dyn FnOnce(&ServiceRegistry, &KernelConfig) + Send>;

/// Deferred vector store for memory backed by the default embedding service.
type StorageSource = Box<dyn FnOnce() -> Result<Arc<dyn VectorStore>> + Send>;

/// 内核构建器
/// Kernel builder
///
/// Service registrations are applied in call order, so default selection
/// follows the same rules as [`ServiceRegistry::register`].
///
/// # Example
///
/// ```rust,ignore
/// use weft_kernel::ai::TextEmbeddingGeneration;
/// use weft_kernel::kernel::KernelBuilder;
///
/// let kernel = KernelBuilder::new()
///     .with_configuration(config)
///     .with_default_ai_service::<TextEmbeddingGeneration>(generator.clone())
///     .with_memory_storage_and_embedding_generator(store, generator)
///     .with_semantic_memory_factory(DefaultSemanticTextMemory::factory())
///     .build()?;
/// ```
#[derive(Default)]
pub struct KernelBuilder {
    config: Option<KernelConfig>,
    template_engine: Option<Arc<dyn PromptTemplateEngine>>,
    memory: Option<Arc<dyn SemanticTextMemory>>,
    memory_parts: Option<(Arc<dyn VectorStore>, Arc<dyn EmbeddingGenerator>)>,
    memory_factory: Option<SemanticTextMemoryFactory>,
    memory_storage: Option<StorageSource>,
    registrations: Vec<PendingRegistration>,
}

impl KernelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configuration(mut self, config: KernelConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_prompt_template_engine(mut self, engine: Arc<dyn PromptTemplateEngine>) -> Self {
        self.template_engine = Some(engine);
        self
    }

    /// Use a ready memory; takes precedence over store/generator parts
    pub fn with_memory(mut self, memory: Arc<dyn SemanticTextMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Build the memory from a store and a generator at `build` time
    ///
    /// Requires a [`SemanticTextMemoryFactory`].
    pub fn with_memory_storage_and_embedding_generator(
        mut self,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn EmbeddingGenerator>,
    ) -> Self {
        self.memory_parts = Some((store, generator));
        self
    }

    /// Build the memory from `store` and the default
    /// [`TextEmbeddingGeneration`] service at `build` time
    ///
    /// Requires a [`SemanticTextMemoryFactory`]. Ignored when a ready memory
    /// or store/generator parts were given.
    pub fn with_memory_storage(self, store: Arc<dyn VectorStore>) -> Self {
        self.with_memory_storage_factory(move || Ok(store))
    }

    /// Like [`with_memory_storage`](Self::with_memory_storage), creating the
    /// store only when the kernel is built
    pub fn with_memory_storage_factory<F>(mut self, factory: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn VectorStore>> + Send + 'static,
    {
        self.memory_storage = Some(Box::new(factory));
        self
    }

    pub fn with_semantic_memory_factory(mut self, factory: SemanticTextMemoryFactory) -> Self {
        self.memory_factory = Some(factory);
        self
    }

    /// Register `service` as the default for capability `C`
    pub fn with_default_ai_service<C: Capability>(self, service: Arc<C::Service>) -> Self {
        self.register::<C>(None, ServiceBinding::Instance(service), true)
    }

    /// Register `service` for capability `C` under `service_id`
    pub fn with_ai_service<C: Capability>(
        self,
        service_id: Option<&str>,
        service: Arc<C::Service>,
        set_as_default: bool,
    ) -> Self {
        self.register::<C>(service_id, ServiceBinding::Instance(service), set_as_default)
    }

    /// Register a lazy service built from the kernel configuration on first use
    pub fn with_ai_service_factory<C, F>(mut self, service_id: Option<&str>, factory: F, set_as_default: bool) -> Self
    where
        C: Capability,
        F: Fn(&KernelConfig) -> Result<Arc<C::Service>> + Send + Sync + 'static,
    {
        let service_id = service_id.map(str::to_string);
        self.registrations.push(Box::new(move |registry, config| {
            let config = config.clone();
            registry.register::<C>(
                service_id.as_deref(),
                ServiceBinding::factory(move || factory(&config)),
                set_as_default,
            );
        }));
        self
    }

    fn register<C: Capability>(
        mut self,
        service_id: Option<&str>,
        binding: ServiceBinding<C::Service>,
        set_as_default: bool,
    ) -> Self {
        let service_id = service_id.map(str::to_string);
        self.registrations.push(Box::new(move |registry, _config| {
            registry.register::<C>(service_id.as_deref(), binding, set_as_default);
        }));
        self
    }

    /// 构建内核
    /// Build the kernel, defaulting the configuration when none was given
    pub fn build(self) -> Result<Kernel> {
        let config = self.config.unwrap_or_default();

        let services = ServiceRegistry::new();
        for registration in self.registrations {
            registration(&services, &config);
        }

        let memory = match (self.memory, self.memory_parts, self.memory_storage) {
            (Some(memory), _, _) => Some(memory),
            (None, Some((store, generator)), _) => {
                let factory = require_memory_factory(self.memory_factory)?;
                Some(factory(store, generator)?)
            }
            (None, None, Some(storage)) => {
                let factory = require_memory_factory(self.memory_factory)?;
                let generator = services.resolve::<TextEmbeddingGeneration>(None)?;
                Some(factory(storage()?, generator)?)
            }
            (None, None, None) => None,
        };

        let template_engine = self
            .template_engine
            .unwrap_or_else(|| Arc::new(PassthroughTemplateEngine));

        Kernel::new(Some(config), template_engine, memory, services)
    }
}

fn require_memory_factory(factory: Option<SemanticTextMemoryFactory>) -> Result<SemanticTextMemoryFactory> {
    factory.ok_or_else(|| {
        KernelError::InvalidArgument("memory storage given without a semantic memory factory".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AIService, TextCompletion, TextCompletionService};
    use crate::function::ContextVariables;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NamedCompletion(String);

    impl AIService for NamedCompletion {}

    #[async_trait]
    impl TextCompletionService for NamedCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    async fn complete_with(kernel: &Kernel, service_id: Option<&str>) -> String {
        match kernel.get_service::<TextCompletion>(service_id) {
            Ok(service) => service.complete("").await.unwrap(),
            Err(e) => panic!("service lookup failed: {e}"),
        }
    }

    #[tokio::test]
    async fn test_registration_order_decides_default() {
        let kernel = KernelBuilder::new()
            .with_ai_service::<TextCompletion>(Some("a"), Arc::new(NamedCompletion("a".into())), false)
            .with_ai_service::<TextCompletion>(Some("b"), Arc::new(NamedCompletion("b".into())), true)
            .with_ai_service::<TextCompletion>(Some("c"), Arc::new(NamedCompletion("c".into())), false)
            .build()
            .unwrap();

        assert_eq!(complete_with(&kernel, None).await, "b");
        assert_eq!(complete_with(&kernel, Some("c")).await, "c");
    }

    #[tokio::test]
    async fn test_factory_receives_configuration_lazily() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let kernel = KernelBuilder::new()
            .with_configuration(KernelConfig::new("configured"))
            .with_ai_service_factory::<TextCompletion, _>(
                Some("lazy"),
                move |config| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Arc::new(NamedCompletion(config.name.clone())) as Arc<dyn TextCompletionService>)
                },
                true,
            )
            .build()
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(complete_with(&kernel, Some("lazy")).await, "configured");
        assert_eq!(complete_with(&kernel, None).await, "configured");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_build_defaults_configuration() {
        let kernel = KernelBuilder::new().build().unwrap();
        assert_eq!(kernel.config(), &KernelConfig::default());
        assert!(kernel.services().is_empty());
    }

    #[tokio::test]
    async fn test_custom_template_engine() {
        struct Upper;

        #[async_trait]
        impl PromptTemplateEngine for Upper {
            async fn render(&self, template: &str, _variables: &ContextVariables) -> Result<String> {
                Ok(template.to_uppercase())
            }
        }

        let kernel = KernelBuilder::new()
            .with_prompt_template_engine(Arc::new(Upper))
            .build()
            .unwrap();
        let rendered = kernel
            .template_engine()
            .render("hi", &ContextVariables::new())
            .await
            .unwrap();
        assert_eq!(rendered, "HI");
    }

    struct NoStore;
    struct NoEmbedder;

    #[async_trait]
    impl VectorStore for NoStore {
        async fn create_collection(&self, _c: &str) -> Result<()> {
            Ok(())
        }
        async fn does_collection_exist(&self, _c: &str) -> Result<bool> {
            Ok(false)
        }
        async fn get_collections(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        async fn delete_collection(&self, _c: &str) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _c: &str, _r: crate::memory::MemoryRecord) -> Result<String> {
            Ok(String::new())
        }
        async fn get(&self, _c: &str, _k: &str, _e: bool) -> Result<Option<crate::memory::MemoryRecord>> {
            Ok(None)
        }
        async fn remove(&self, _c: &str, _k: &str) -> Result<()> {
            Ok(())
        }
        async fn get_nearest_matches(
            &self,
            _c: &str,
            _e: &[f32],
            _l: usize,
            _m: f64,
            _w: bool,
        ) -> Result<Vec<(crate::memory::MemoryRecord, f64)>> {
            Ok(Vec::new())
        }
    }

    impl AIService for NoEmbedder {}

    #[async_trait]
    impl EmbeddingGenerator for NoEmbedder {
        async fn generate_embeddings(&self, _texts: &[String]) -> Result<Vec<crate::memory::Embedding>> {
            Ok(Vec::new())
        }
    }

    /// Factory recording the store and generator it was handed.
    fn recording_factory(
        seen: Arc<parking_lot::Mutex<Option<(Arc<dyn VectorStore>, Arc<dyn EmbeddingGenerator>)>>>,
    ) -> SemanticTextMemoryFactory {
        Arc::new(move |store: Arc<dyn VectorStore>, generator: Arc<dyn EmbeddingGenerator>| {
            *seen.lock() = Some((store, generator));
            Ok(Arc::new(crate::memory::NullMemory::new()) as Arc<dyn SemanticTextMemory>)
        })
    }

    #[test]
    fn test_memory_parts_without_factory_fail() {
        let result = KernelBuilder::new()
            .with_memory_storage_and_embedding_generator(Arc::new(NoStore), Arc::new(NoEmbedder))
            .build();
        assert!(matches!(result, Err(KernelError::InvalidArgument(_))));
    }

    #[test]
    fn test_memory_storage_uses_default_embedding_service() {
        let store: Arc<dyn VectorStore> = Arc::new(NoStore);
        let generator: Arc<dyn EmbeddingGenerator> = Arc::new(NoEmbedder);
        let seen = Arc::new(parking_lot::Mutex::new(None));

        KernelBuilder::new()
            .with_default_ai_service::<TextEmbeddingGeneration>(generator.clone())
            .with_memory_storage(store.clone())
            .with_semantic_memory_factory(recording_factory(seen.clone()))
            .build()
            .unwrap();

        let (used_store, used_generator) = seen.lock().take().unwrap();
        assert!(Arc::ptr_eq(&used_store, &store));
        assert!(Arc::ptr_eq(&used_generator, &generator));
    }

    #[test]
    fn test_memory_storage_factory_runs_at_build() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let seen = Arc::new(parking_lot::Mutex::new(None));

        let builder = KernelBuilder::new()
            .with_memory_storage_factory(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(NoStore) as Arc<dyn VectorStore>)
            })
            .with_ai_service::<TextEmbeddingGeneration>(Some("embedder"), Arc::new(NoEmbedder), true)
            .with_semantic_memory_factory(recording_factory(seen.clone()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        builder.build().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(seen.lock().is_some());
    }

    #[test]
    fn test_memory_storage_without_embedding_service_fails() {
        let result = KernelBuilder::new()
            .with_memory_storage(Arc::new(NoStore))
            .with_semantic_memory_factory(recording_factory(Arc::new(parking_lot::Mutex::new(None))))
            .build();
        assert!(matches!(result, Err(KernelError::ServiceNotFound { .. })));
    }

    #[test]
    fn test_memory_storage_without_factory_fails() {
        let result = KernelBuilder::new()
            .with_default_ai_service::<TextEmbeddingGeneration>(Arc::new(NoEmbedder))
            .with_memory_storage(Arc::new(NoStore))
            .build();
        assert!(matches!(result, Err(KernelError::InvalidArgument(_))));
    }
}
