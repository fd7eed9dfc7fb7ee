//! Core functionality for resolving dependencies. An [Injector] owns a
//! [ProviderRegistry] flattened from [Modules](crate::module::Module) and a cache of constructed
//! singletons. Each dependency is created at most once per injector - on first request - by
//! recursively resolving its parameters.
//!
//! ```
//! use provide_di::injectable::Injectable;
//! use provide_di::injector::Injector;
//! use provide_di::instance_provider::{InstancePtr, TypedInstanceProvider};
//!
//! #[derive(Injectable)]
//! struct Repository;
//!
//! #[derive(Injectable)]
//! struct Service {
//!     repository: InstancePtr<Repository>,
//! }
//!
//! let injector = Injector::new([]).expect("error creating injector");
//! let service = injector
//!     .get_instance::<Service>()
//!     .expect("error creating Service");
//! let repository = injector
//!     .get_instance::<Repository>()
//!     .expect("error creating Repository");
//!
//! assert!(InstancePtr::ptr_eq(&service.repository, &repository));
//! ```
//!
//! ## Thread safety
//!
//! Injectors can be shared between threads. Already constructed instances are returned without
//! waiting for other constructions. Constructing new instances is serialized per injector, which
//! guarantees each provider is called at most once; a thread requesting an instance under
//! construction by another thread waits for it to finish and receives the same instance.

use crate::cache::{CacheSlot, InstanceCache};
use crate::error::{DependencyError, DependencyErrorKind, InjectorError};
use crate::injectable::{Injectable, InjectableDefinition, Parameter};
use crate::instance_provider::{erase, Arguments, InstanceAnyPtr, InstanceProvider, InstancePtr};
use crate::key::{DependencyKey, DependencyType};
use crate::module::ModulePtr;
use crate::provider::{ProviderDefinition, ProviderKind, ProviderOutput, TypeRedirect};
use crate::provider_registry::{ProviderRegistry, StaticProviderRegistry};
use itertools::Itertools;
use parking_lot::ReentrantMutex;
use std::fmt::{Debug, Formatter};
use std::iter;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

pub type ProviderRegistryPtr = Box<dyn ProviderRegistry + Send + Sync>;

/// What happens with a dependency which failed to resolve.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum FailedResolutionPolicy {
    /// Forget the failed attempt - the next request tries to create the dependency again.
    #[default]
    Retry,
    /// Keep the dependency marked as under construction - subsequent requests fail with a
    /// dependency cycle error.
    Poison,
}

/// Injector configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Default)]
pub struct InjectorConfig {
    pub failed_resolution_policy: FailedResolutionPolicy,
}

impl InjectorConfig {
    pub fn with_failed_resolution_policy(mut self, policy: FailedResolutionPolicy) -> Self {
        self.failed_resolution_policy = policy;
        self
    }
}

/// Builder for [Injector] with sensible defaults, for easy construction.
#[derive(Default)]
pub struct InjectorBuilder {
    modules: Vec<ModulePtr>,
    injectables: Vec<InjectableDefinition>,
    registry: Option<ProviderRegistryPtr>,
    config: InjectorConfig,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module, which is flattened together with its sub-modules.
    pub fn with_module(mut self, module: ModulePtr) -> Self {
        self.modules.push(module);
        self
    }

    /// Adds multiple modules.
    pub fn with_modules<I: IntoIterator<Item = ModulePtr>>(mut self, modules: I) -> Self {
        self.modules.extend(modules);
        self
    }

    /// Makes `T` self-constructible for the built injector, in addition to automatically
    /// registered injectables.
    pub fn with_injectable<T: Injectable>(mut self) -> Self {
        self.injectables.push(InjectableDefinition::of::<T>());
        self
    }

    /// Uses the given registry instead of one flattened from modules. Modules and injectables added
    /// to this builder are ignored when a registry is set.
    pub fn with_registry(mut self, registry: ProviderRegistryPtr) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_config(mut self, config: InjectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds resulting [Injector]. Fails if the modules contain multiple providers for the same
    /// dependency.
    pub fn build(self) -> Result<Injector, InjectorError> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                let mut registry = StaticProviderRegistry::new(self.modules)?;
                for definition in self.injectables {
                    registry.register_injectable(definition);
                }

                debug!(
                    providers = registry.provider_count(),
                    "Created provider registry."
                );

                Box::new(registry) as ProviderRegistryPtr
            }
        };

        Ok(Injector::with_registry(registry, self.config))
    }
}

struct InjectorState {
    registry: ProviderRegistryPtr,
    cache: InstanceCache,
    construction_lock: ReentrantMutex<()>,
    config: InjectorConfig,
}

/// Resolves dependencies. Cloning an injector is cheap and all clones share the same cache.
#[derive(Clone)]
pub struct Injector {
    state: Arc<InjectorState>,
}

impl Debug for Injector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("config", &self.state.config)
            .field("cached_instances", &self.state.cache.len())
            .finish()
    }
}

/// Handle to the injector which created a dependency, injected for the reserved
/// [INJECTOR](crate::key::INJECTOR) name. The handle does not keep the injector alive.
#[derive(Clone, Debug)]
pub struct InjectorRef {
    state: Weak<InjectorState>,
}

impl InjectorRef {
    /// Returns the injector, unless it has been dropped.
    pub fn upgrade(&self) -> Option<Injector> {
        self.state.upgrade().map(|state| Injector { state })
    }

    /// Checks if this handle points to given injector.
    pub fn is(&self, injector: &Injector) -> bool {
        Weak::as_ptr(&self.state) == Arc::as_ptr(&injector.state)
    }
}

enum Entry {
    Provider(ProviderDefinition),
    Constructor(InjectableDefinition),
}

impl Injector {
    /// Creates an injector from given modules and all automatically registered injectables.
    pub fn new<I: IntoIterator<Item = ModulePtr>>(modules: I) -> Result<Self, InjectorError> {
        InjectorBuilder::new().with_modules(modules).build()
    }

    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    /// Creates an injector using given registry directly.
    pub fn with_registry(registry: ProviderRegistryPtr, config: InjectorConfig) -> Self {
        let state = Arc::new_cyclic(|state| InjectorState {
            registry,
            cache: InstanceCache::with_instance(
                DependencyKey::injector(),
                erase(InstancePtr::new(InjectorRef {
                    state: state.clone(),
                })),
            ),
            construction_lock: ReentrantMutex::new(()),
            config,
        });

        Self { state }
    }

    #[inline]
    pub fn config(&self) -> &InjectorConfig {
        &self.state.config
    }

    /// Checks if a finished instance for given key is cached.
    #[inline]
    pub fn is_cached(&self, key: &DependencyKey) -> bool {
        self.state.cache.instance(key).is_some()
    }

    /// Returns a handle to this injector, which does not keep it alive.
    pub fn downgrade(&self) -> InjectorRef {
        InjectorRef {
            state: Arc::downgrade(&self.state),
        }
    }

    fn resolve(
        &self,
        key: &DependencyKey,
        parent_chain: &[DependencyType],
    ) -> Result<InstanceAnyPtr, DependencyError> {
        let chain = iter::once(key.ty())
            .chain(parent_chain.iter().copied())
            .collect_vec();

        if let Some(instance) = self.state.cache.instance(key) {
            trace!(%key, "Returning cached instance.");
            return Ok(instance);
        }

        let _guard = self.state.construction_lock.lock();

        match self.state.cache.slot(key) {
            Some(CacheSlot::Done(instance)) => return Ok(instance),
            Some(CacheSlot::InProgress) => {
                return Err(DependencyError::new(
                    DependencyErrorKind::DependencyCycle,
                    chain,
                    key.name(),
                ))
            }
            None => {}
        }

        let entry = self.entry(key).ok_or_else(|| {
            DependencyError::new(DependencyErrorKind::NoProvider, chain.clone(), key.name())
        })?;

        self.state.cache.mark_in_progress(key.clone());

        debug!(%key, "Constructing instance.");

        match self.construct(&entry, &chain) {
            Ok(instance) => {
                self.state.cache.store_instance(key.clone(), instance.clone());
                Ok(instance)
            }
            Err(error) => {
                match self.state.config.failed_resolution_policy {
                    FailedResolutionPolicy::Retry => self.state.cache.clear_in_progress(key),
                    FailedResolutionPolicy::Poison => {
                        warn!(%key, %error, "Dependency failed to resolve and stays unavailable.")
                    }
                }

                Err(error)
            }
        }
    }

    fn entry(&self, key: &DependencyKey) -> Option<Entry> {
        if let Some(definition) = self.state.registry.provider(key) {
            return Some(Entry::Provider(definition));
        }

        if key.name().is_some() {
            return None;
        }

        self.state
            .registry
            .injectable(&key.ty())
            .map(Entry::Constructor)
    }

    fn construct(
        &self,
        entry: &Entry,
        chain: &[DependencyType],
    ) -> Result<InstanceAnyPtr, DependencyError> {
        match entry {
            Entry::Constructor(definition) => self.construct_injectable(definition, chain),
            Entry::Provider(definition) => {
                let mut arguments =
                    self.resolve_arguments(&definition.name, &definition.parameters, chain)?;
                let output = (definition.provider)(&mut arguments).map_err(|error| {
                    DependencyError::new(
                        DependencyErrorKind::ProviderFailed {
                            entry: definition.name.clone(),
                            error,
                        },
                        chain.to_vec(),
                        None,
                    )
                })?;

                match (definition.kind, output) {
                    (ProviderKind::Instance, ProviderOutput::Instance(instance)) => Ok(instance),
                    (ProviderKind::Type, ProviderOutput::Redirect(redirect)) => {
                        self.follow_redirect(definition, redirect, chain)
                    }
                    (ProviderKind::Type, ProviderOutput::Instance(_)) => Err(DependencyError::new(
                        DependencyErrorKind::NonTypeRedirect {
                            provider: definition.name.clone(),
                        },
                        chain.to_vec(),
                        None,
                    )),
                    (ProviderKind::Instance, ProviderOutput::Redirect(_)) => {
                        Err(DependencyError::new(
                            DependencyErrorKind::UnexpectedRedirect {
                                provider: definition.name.clone(),
                            },
                            chain.to_vec(),
                            None,
                        ))
                    }
                }
            }
        }
    }

    fn follow_redirect(
        &self,
        provider: &ProviderDefinition,
        redirect: TypeRedirect,
        chain: &[DependencyType],
    ) -> Result<InstanceAnyPtr, DependencyError> {
        let target = self
            .state
            .registry
            .injectable(&redirect.target)
            .ok_or_else(|| {
                DependencyError::new(
                    DependencyErrorKind::UndecoratedRedirect {
                        provider: provider.name.clone(),
                        target: redirect.target,
                    },
                    chain.to_vec(),
                    None,
                )
            })?;

        let instance = self.construct_injectable(&target, chain)?;
        (redirect.cast)(instance).map_err(|_| {
            DependencyError::new(
                DependencyErrorKind::IncompatibleInstance(provider.key.ty()),
                chain.to_vec(),
                None,
            )
        })
    }

    fn construct_injectable(
        &self,
        definition: &InjectableDefinition,
        chain: &[DependencyType],
    ) -> Result<InstanceAnyPtr, DependencyError> {
        let mut arguments =
            self.resolve_arguments(definition.ty.name(), &definition.parameters, chain)?;
        (definition.constructor)(&mut arguments).map_err(|error| {
            DependencyError::new(
                DependencyErrorKind::ProviderFailed {
                    entry: definition.ty.name().to_string(),
                    error,
                },
                chain.to_vec(),
                None,
            )
        })
    }

    fn resolve_arguments(
        &self,
        entry: &str,
        parameters: &[Parameter],
        chain: &[DependencyType],
    ) -> Result<Arguments, DependencyError> {
        parameters
            .iter()
            .map(|parameter| {
                let key = parameter.key().ok_or_else(|| {
                    DependencyError::new(
                        DependencyErrorKind::MissingParameterType {
                            parameter: parameter.name.clone(),
                            entry: entry.to_string(),
                        },
                        chain.to_vec(),
                        None,
                    )
                })?;

                self.resolve(&key, chain)
            })
            .try_collect()
            .map(Arguments::new)
    }
}

impl InstanceProvider for Injector {
    #[inline]
    fn instance(&self, key: &DependencyKey) -> Result<InstanceAnyPtr, DependencyError> {
        self.resolve(key, &[])
    }
}
