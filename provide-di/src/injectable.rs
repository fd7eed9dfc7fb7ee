//! Self-constructible types are called [Injectable]s. An injectable type declares the ordered list
//! of its constructor [Parameter]s, and an [Injector](crate::injector::Injector) can create it
//! without any explicit provider, by resolving the parameters first.
//!
//! ## Declaring injectables
//!
//! With the `derive` feature enabled, the metadata is generated from struct fields. Each field
//! holding an [InstancePtr] becomes a parameter:
//!
//! ```
//! use provide_di::injectable::Injectable;
//! use provide_di::injector::{Injector, InjectorRef};
//! use provide_di::instance_provider::InstancePtr;
//!
//! #[derive(Injectable)]
//! struct Repository;
//!
//! #[derive(Injectable)]
//! struct Service {
//!     // unnamed dependency
//!     repository: InstancePtr<Repository>,
//!     // named dependency
//!     #[inject(name = "replica")]
//!     replica: InstancePtr<Repository>,
//!     // the injector doing the injection
//!     #[inject(injector)]
//!     injector: InstancePtr<InjectorRef>,
//!     // not injected at all
//!     #[inject(default)]
//!     retries: u8,
//!     #[inject(default = "default_timeout")]
//!     timeout: u64,
//! }
//!
//! fn default_timeout() -> u64 {
//!     30
//! }
//! ```
//!
//! ### Supported `#[inject]` field configuration
//!
//! * `name = "name"` - inject the dependency registered with given name
//! * `injector` - inject the [InjectorRef](crate::injector::InjectorRef) of the current injector
//! * `default` - use `Default::default()` initialization
//! * `default = "expr"` - call `expr()` for initialization
//!
//! Derived injectables are registered automatically and are visible to every injector. Types
//! implementing [Injectable] by hand can be added to a single injector with
//! [InjectorBuilder::with_injectable](crate::injector::InjectorBuilder::with_injectable).

use crate::instance_provider::{erase, Arguments, ErrorPtr, InstanceAnyPtr, InstancePtr};
use crate::key::{DependencyKey, DependencyType, INJECTOR};
use derivative::Derivative;

#[cfg(feature = "derive")]
pub use provide_di_derive::Injectable;

/// A single declared dependency of a constructor or provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Parameter {
    /// Parameter name, used for diagnostics.
    pub name: String,

    /// Type of the required dependency. A parameter without a type cannot be resolved.
    pub ty: Option<DependencyType>,

    /// Name of the required dependency, if a named one is requested.
    pub dependency_name: Option<String>,
}

impl Parameter {
    /// Parameter requiring an unnamed instance of `T`.
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: Some(DependencyType::of::<T>()),
            dependency_name: None,
        }
    }

    /// Parameter requiring an instance of `T` registered with given dependency name.
    pub fn named<T: ?Sized + 'static>(
        name: impl Into<String>,
        dependency_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: Some(DependencyType::of::<T>()),
            dependency_name: Some(dependency_name.into()),
        }
    }

    /// Parameter requiring the current [InjectorRef](crate::injector::InjectorRef).
    pub fn injector(name: impl Into<String>) -> Self {
        Self::named::<crate::injector::InjectorRef>(name, INJECTOR)
    }

    /// Key of the required dependency, if the type is known.
    pub fn key(&self) -> Option<DependencyKey> {
        self.ty
            .map(|ty| DependencyKey::new(ty, self.dependency_name.clone()))
    }
}

/// A type which can be created by an injector from its declared dependencies. Typically derived
/// with `#[derive(Injectable)]`. Please see the module-level documentation for more information.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Ordered dependencies of this type.
    fn parameters() -> Vec<Parameter>;

    /// Creates an instance from [Arguments] resolved according to [Injectable::parameters].
    fn construct(arguments: &mut Arguments) -> Result<Self, ErrorPtr>;
}

/// Constructor function for type-erased instances.
pub type ConstructorFunction = fn(arguments: &mut Arguments) -> Result<InstanceAnyPtr, ErrorPtr>;

/// Definition of an [Injectable] type registered in a
/// [ProviderRegistry](crate::provider_registry::ProviderRegistry).
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct InjectableDefinition {
    pub ty: DependencyType,

    pub parameters: Vec<Parameter>,

    #[derivative(Debug = "ignore")]
    pub constructor: ConstructorFunction,
}

impl InjectableDefinition {
    pub fn of<T: Injectable>() -> Self {
        Self {
            ty: DependencyType::of::<T>(),
            parameters: T::parameters(),
            constructor: construct_erased::<T>,
        }
    }
}

fn construct_erased<T: Injectable>(
    arguments: &mut Arguments,
) -> Result<InstanceAnyPtr, ErrorPtr> {
    T::construct(arguments).map(|instance| erase(InstancePtr::new(instance)))
}

/// Returns definitions of all automatically registered injectables.
pub fn registered_injectables() -> impl Iterator<Item = InjectableDefinition> {
    inventory::iter::<internal::InjectableRegisterer>
        .into_iter()
        .map(|registerer| (registerer.register)())
}

#[doc(hidden)]
pub mod internal {
    use crate::injectable::InjectableDefinition;
    use inventory::collect;
    pub use inventory::submit;

    pub struct InjectableRegisterer {
        pub register: fn() -> InjectableDefinition,
    }

    collect!(InjectableRegisterer);
}
