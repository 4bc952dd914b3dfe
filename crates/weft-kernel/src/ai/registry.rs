//! AI 服务注册中心
//! AI service registry
//!
//! Services are stored under a `(capability type, service id)` key, either as
//! ready instances or as factories that are materialized on first use. Each
//! capability type has at most one default binding, used whenever the caller
//! does not name a service or names one that is not registered.

use crate::ai::service::{Capability, CapabilityType};
use crate::error::{KernelError, Result};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Id under which services registered without a name are stored.
const UNNAMED_SERVICE_ID: &str = "__default__";

/// Deferred constructor for a service instance.
pub type ServiceFactory<S> = Arc<dyn Fn() -> Result<Arc<S>> + Send + Sync>;

/// What gets registered: a ready instance or a factory.
pub enum ServiceBinding<S: ?Sized> {
    Instance(Arc<S>),
    Factory(ServiceFactory<S>),
}

impl<S: ?Sized + Send + Sync + 'static> ServiceBinding<S> {
    /// Bind a ready instance
    pub fn instance(service: Arc<S>) -> Self {
        Self::Instance(service)
    }

    /// Bind a factory, invoked at most once on first resolve
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<S>> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }
}

/// Once-initialized holder for one registration.
struct ServiceEntry<S: ?Sized> {
    cell: OnceCell<Arc<S>>,
    factory: Option<ServiceFactory<S>>,
}

impl<S: ?Sized> ServiceEntry<S> {
    fn new(binding: ServiceBinding<S>) -> Self {
        match binding {
            ServiceBinding::Instance(service) => Self {
                cell: OnceCell::with_value(service),
                factory: None,
            },
            ServiceBinding::Factory(factory) => Self {
                cell: OnceCell::new(),
                factory: Some(factory),
            },
        }
    }

    fn materialize(&self, capability: CapabilityType, service_id: &str) -> Result<Arc<S>> {
        self.cell
            .get_or_try_init(|| {
                let factory = self.factory.as_ref().ok_or_else(|| {
                    KernelError::Internal(format!("service {service_id} has neither instance nor factory"))
                })?;
                tracing::debug!(%capability, service_id, "Materializing service from factory");
                factory().map_err(|e| KernelError::ServiceInitialization {
                    capability,
                    message: e.to_string(),
                })
            })
            .cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ServiceKey {
    capability: CapabilityType,
    service_id: String,
}

impl ServiceKey {
    fn new(capability: CapabilityType, service_id: &str) -> Self {
        Self {
            capability,
            service_id: service_id.to_string(),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<ServiceKey, Arc<dyn Any + Send + Sync>>,
    defaults: HashMap<CapabilityType, String>,
}

/// AI 服务注册中心
/// AI service registry
///
/// Shared by reference between the kernel and every pipeline run; all
/// methods take `&self` and are safe to call concurrently.
///
/// # Example
///
/// ```rust,ignore
/// use weft_kernel::ai::{ServiceBinding, ServiceRegistry, TextEmbeddingGeneration};
///
/// let registry = ServiceRegistry::new();
/// registry.register::<TextEmbeddingGeneration>(
///     Some("local"),
///     ServiceBinding::instance(Arc::new(HashEmbeddingGenerator::default())),
///     true,
/// );
///
/// let generator = registry.resolve::<TextEmbeddingGeneration>(None)?;
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    state: RwLock<RegistryState>,
}

impl ServiceRegistry {
    /// 创建空注册中心
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册服务
    /// Register a service
    ///
    /// The binding becomes the capability's default when `set_as_default` is
    /// set, when it has no service id, or when the capability has no default
    /// yet. Registering an existing key replaces the previous binding.
    pub fn register<C: Capability>(
        &self,
        service_id: Option<&str>,
        binding: ServiceBinding<C::Service>,
        set_as_default: bool,
    ) {
        let capability = C::capability_type();
        let id = service_id.unwrap_or(UNNAMED_SERVICE_ID).to_string();
        let entry: Arc<dyn Any + Send + Sync> = Arc::new(ServiceEntry::new(binding));

        let mut state = self.state.write();
        state.entries.insert(ServiceKey::new(capability, &id), entry);

        let make_default =
            set_as_default || service_id.is_none() || !state.defaults.contains_key(&capability);
        if make_default {
            state.defaults.insert(capability, id.clone());
        }

        tracing::debug!(%capability, service_id = %id, default = make_default, "Registered AI service");
    }

    /// 解析服务
    /// Resolve a service
    ///
    /// Looks up `service_id` exactly; when no id is given, or the id is not
    /// registered, falls back to the capability's default binding.
    pub fn resolve<C: Capability>(&self, service_id: Option<&str>) -> Result<Arc<C::Service>> {
        let capability = C::capability_type();

        let (resolved_id, entry) = {
            let state = self.state.read();
            let exact = service_id.and_then(|id| {
                state
                    .entries
                    .get(&ServiceKey::new(capability, id))
                    .map(|entry| (id.to_string(), entry.clone()))
            });

            match exact {
                Some(found) => found,
                None => {
                    let default_id = state
                        .defaults
                        .get(&capability)
                        .ok_or_else(|| KernelError::service_not_found(capability, service_id))?;
                    let entry = state
                        .entries
                        .get(&ServiceKey::new(capability, default_id))
                        .ok_or_else(|| KernelError::service_not_found(capability, service_id))?;
                    if let Some(requested) = service_id {
                        tracing::debug!(
                            %capability,
                            requested,
                            fallback = %default_id,
                            "Named service not registered, using default"
                        );
                    }
                    (default_id.clone(), entry.clone())
                }
            }
        };

        let entry = entry
            .downcast::<ServiceEntry<C::Service>>()
            .map_err(|_| {
                KernelError::Internal(format!(
                    "service {resolved_id} is registered under {capability} with a different service type"
                ))
            })?;

        entry.materialize(capability, &resolved_id)
    }

    /// 检查是否存在精确绑定
    /// Whether an exact binding exists for `service_id`
    pub fn contains<C: Capability>(&self, service_id: &str) -> bool {
        self.state
            .read()
            .entries
            .contains_key(&ServiceKey::new(C::capability_type(), service_id))
    }

    /// Id of the default binding for `capability`
    pub fn default_service_id(&self, capability: CapabilityType) -> Option<String> {
        self.state.read().defaults.get(&capability).cloned()
    }

    /// All registered ids for `capability`, sorted
    pub fn service_ids(&self, capability: CapabilityType) -> Vec<String> {
        let state = self.state.read();
        let mut ids: Vec<String> = state
            .entries
            .keys()
            .filter(|key| key.capability == capability)
            .map(|key| key.service_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of registrations across all capabilities
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
