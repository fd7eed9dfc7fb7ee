//! Functionality related to looking up how dependencies are created. A [ProviderRegistry] holds
//! explicit [providers](crate::provider) and [injectable](crate::injectable) type definitions,
//! which act as default providers for their own types.

use crate::error::InjectorError;
use crate::injectable::{registered_injectables, InjectableDefinition};
use crate::key::{DependencyKey, DependencyType};
use crate::module::{Module, ModulePtr, ProviderOrigin};
use crate::provider::ProviderDefinition;
use fxhash::{FxHashMap, FxHashSet};
#[cfg(test)]
use mockall::automock;

/// Source of provider and injectable definitions for an [Injector](crate::injector::Injector).
#[cfg_attr(test, automock)]
pub trait ProviderRegistry {
    /// Returns the explicit provider registered for given key.
    fn provider(&self, key: &DependencyKey) -> Option<ProviderDefinition>;

    /// Returns the definition of a self-constructible type.
    fn injectable(&self, ty: &DependencyType) -> Option<InjectableDefinition>;
}

/// Registry flattened from a forest of [Module]s, combined with all automatically registered
/// injectables. Immutable once created.
#[derive(Clone, Debug, Default)]
pub struct StaticProviderRegistry {
    providers: FxHashMap<DependencyKey, ProviderDefinition>,
    injectables: FxHashMap<DependencyType, InjectableDefinition>,
}

impl StaticProviderRegistry {
    /// Creates a registry from given modules and all automatically registered injectables. Fails
    /// listing every pair of providers for the same dependency.
    pub fn new<I: IntoIterator<Item = ModulePtr>>(modules: I) -> Result<Self, InjectorError> {
        Self::with_injectables(modules, registered_injectables())
    }

    /// Creates a registry from given modules and only the given injectables.
    pub fn with_injectables<M, I>(modules: M, injectables: I) -> Result<Self, InjectorError>
    where
        M: IntoIterator<Item = ModulePtr>,
        I: IntoIterator<Item = InjectableDefinition>,
    {
        let modules: Vec<_> = modules.into_iter().collect();
        let (providers, duplicates) = merge(&modules);

        if !duplicates.is_empty() {
            return Err(InjectorError::DuplicateProviders(duplicates));
        }

        Ok(Self {
            providers,
            injectables: injectables
                .into_iter()
                .map(|definition| (definition.ty, definition))
                .collect(),
        })
    }

    /// Adds a self-constructible type definition. Existing definitions for the same type are
    /// replaced.
    pub fn register_injectable(&mut self, definition: InjectableDefinition) {
        self.injectables.insert(definition.ty, definition);
    }

    /// Number of explicit providers.
    #[inline]
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

impl ProviderRegistry for StaticProviderRegistry {
    #[inline]
    fn provider(&self, key: &DependencyKey) -> Option<ProviderDefinition> {
        self.providers.get(key).cloned()
    }

    #[inline]
    fn injectable(&self, ty: &DependencyType) -> Option<InjectableDefinition> {
        self.injectables.get(ty).cloned()
    }
}

type DuplicateProviders = Vec<(ProviderOrigin, ProviderOrigin)>;

/// Flattens a module forest into a single provider map. Each module is visited once, even if
/// installed in multiple places. Returns all colliding provider pairs as (existing, new).
pub fn merge(
    modules: &[ModulePtr],
) -> (
    FxHashMap<DependencyKey, ProviderDefinition>,
    DuplicateProviders,
) {
    let mut merger = Merger::default();
    merger.add_modules(modules);
    (
        merger
            .providers
            .into_iter()
            .map(|(key, (_, definition))| (key, definition))
            .collect(),
        merger.duplicates,
    )
}

#[derive(Default)]
struct Merger {
    providers: FxHashMap<DependencyKey, (ProviderOrigin, ProviderDefinition)>,
    visited: FxHashSet<*const Module>,
    duplicates: DuplicateProviders,
}

impl Merger {
    fn add_modules(&mut self, modules: &[ModulePtr]) {
        for module in modules {
            if !self.visited.insert(ModulePtr::as_ptr(module)) {
                continue;
            }

            for definition in module.providers() {
                let origin = ProviderOrigin::new(module.name(), definition);
                if let Some((existing, _)) = self.providers.get(&definition.key) {
                    self.duplicates.push((existing.clone(), origin));
                } else {
                    self.providers
                        .insert(definition.key.clone(), (origin, definition.clone()));
                }
            }

            self.add_modules(module.sub_modules());
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::InjectorError;
    use crate::injectable::{Injectable, InjectableDefinition, Parameter};
    use crate::instance_provider::{Arguments, ErrorPtr, InstancePtr};
    use crate::key::{DependencyKey, DependencyType};
    use crate::module::{Module, ModulePtr};
    use crate::provider::{Provider, ProviderDefinition};
    use crate::provider_registry::{merge, ProviderRegistry, StaticProviderRegistry};

    struct TestComponent;

    impl Injectable for TestComponent {
        fn parameters() -> Vec<Parameter> {
            vec![]
        }

        fn construct(_arguments: &mut Arguments) -> Result<Self, ErrorPtr> {
            Ok(TestComponent)
        }
    }

    fn provide_u8(name: &str) -> ProviderDefinition {
        Provider::<u8>::new(name)
            .instance(|_| Ok(InstancePtr::new(0)))
    }

    fn module_with_u8(name: &str) -> ModulePtr {
        Module::builder(name)
            .provider(provide_u8(&format!("provide_u8_{name}")))
            .build()
            .unwrap()
    }

    #[test]
    fn should_merge_module_tree() {
        let leaf = Module::builder("Leaf")
            .provider(
                Provider::<u16>::new("provide_u16")
                    .instance(|_| Ok(InstancePtr::new(0))),
            )
            .build()
            .unwrap();
        let root = Module::builder("Root")
            .provider(provide_u8("provide_u8"))
            .install([leaf])
            .build()
            .unwrap();

        let (providers, duplicates) = merge(&[root]);

        assert!(duplicates.is_empty());
        assert!(providers.contains_key(&DependencyKey::of::<u8>()));
        assert!(providers.contains_key(&DependencyKey::of::<u16>()));
    }

    #[test]
    fn should_visit_shared_modules_once() {
        let shared = module_with_u8("Shared");
        let first = Module::builder("First")
            .install([shared.clone()])
            .build()
            .unwrap();
        let second = Module::builder("Second")
            .install([shared.clone()])
            .build()
            .unwrap();

        let (providers, duplicates) = merge(&[first, second, shared]);

        assert!(duplicates.is_empty());
        assert_eq!(providers.len(), 1);
    }

    #[test]
    fn should_report_all_duplicates() {
        let error = StaticProviderRegistry::with_injectables(
            [
                module_with_u8("A"),
                module_with_u8("B"),
                module_with_u8("C"),
            ],
            [],
        )
        .unwrap_err();

        let InjectorError::DuplicateProviders(duplicates) = error;
        let pairs: Vec<_> = duplicates
            .iter()
            .map(|(existing, new)| (existing.module.as_str(), new.module.as_str()))
            .collect();
        assert_eq!(pairs, [("A", "B"), ("A", "C")]);
    }

    #[test]
    fn should_register_injectables() {
        let mut registry = StaticProviderRegistry::with_injectables(
            [module_with_u8("A")],
            [InjectableDefinition::of::<TestComponent>()],
        )
        .unwrap();

        assert_eq!(registry.provider_count(), 1);
        assert!(registry.provider(&DependencyKey::of::<u8>()).is_some());
        assert!(registry
            .injectable(&DependencyType::of::<TestComponent>())
            .is_some());
        assert!(registry.injectable(&DependencyType::of::<u8>()).is_none());

        registry.register_injectable(InjectableDefinition::of::<TestComponent>());
        assert!(registry
            .injectable(&DependencyType::of::<TestComponent>())
            .is_some());
    }
}
