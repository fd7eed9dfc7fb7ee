//! Providers are explicit entry points producing dependencies, registered in
//! [Modules](crate::module::Module). There are two kinds of providers:
//!
//! * instance providers - return a ready instance of the provided type
//! * type providers - return a [Redirect] to another, [Injectable](crate::injectable::Injectable)
//! type, which the injector then constructs with its own dependencies; this allows choosing an
//! implementation of an abstract type at runtime
//!
//! ```
//! use provide_di::injectable::Injectable;
//! use provide_di::instance_provider::InstancePtr;
//! use provide_di::provider::{Provider, Redirect};
//!
//! trait Storage: Send + Sync {}
//!
//! #[derive(Injectable)]
//! struct MemoryStorage;
//!
//! impl Storage for MemoryStorage {}
//!
//! struct Settings {
//!     url: String,
//! }
//!
//! let settings = Provider::<Settings>::new("provide_settings")
//!     .instance(|_| Ok(InstancePtr::new(Settings { url: "memory://".to_string() })));
//!
//! let storage = Provider::<dyn Storage>::new("provide_storage")
//!     .parameter::<Settings>("settings")
//!     .redirect(|arguments| {
//!         let _settings = arguments.next::<Settings>()?;
//!         Ok(Redirect::to::<MemoryStorage>(|storage| storage as InstancePtr<dyn Storage>))
//!     });
//! ```

use crate::injectable::Parameter;
use crate::instance_provider::{downcast, erase, Arguments, ErrorPtr, InstanceAnyPtr, InstancePtr};
use crate::key::{DependencyKey, DependencyType};
use derivative::Derivative;
use std::marker::PhantomData;
use std::sync::Arc;

/// Distinguishes providers returning instances from providers returning types.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProviderKind {
    Instance,
    Type,
}

/// Converts an erased instance of a redirect target into an erased instance of the provided type.
/// Gives the instance back on type mismatch.
pub type CastFunction =
    Arc<dyn Fn(InstanceAnyPtr) -> Result<InstanceAnyPtr, InstanceAnyPtr> + Send + Sync>;

/// Type-erased [Redirect].
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct TypeRedirect {
    /// Type which should be constructed instead of the provided one.
    pub target: DependencyType,

    #[derivative(Debug = "ignore")]
    pub cast: CastFunction,
}

/// Result of calling a provider.
#[derive(Clone, Debug)]
pub enum ProviderOutput {
    Instance(InstanceAnyPtr),
    Redirect(TypeRedirect),
}

/// Entry point of a provider.
pub type ProviderFunction =
    Arc<dyn Fn(&mut Arguments) -> Result<ProviderOutput, ErrorPtr> + Send + Sync>;

/// Definition of a provider registered in a [Module](crate::module::Module).
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct ProviderDefinition {
    /// Provider name, used for diagnostics.
    pub name: String,

    /// Key of the provided dependency.
    pub key: DependencyKey,

    pub kind: ProviderKind,

    /// Ordered dependencies of the provider.
    pub parameters: Vec<Parameter>,

    #[derivative(Debug = "ignore")]
    pub provider: ProviderFunction,
}

/// Redirect from the provided type `T` to an injectable type `S`, returned from type providers.
pub struct Redirect<T: ?Sized> {
    redirect: TypeRedirect,
    _phantom: PhantomData<fn() -> InstancePtr<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Redirect<T> {
    /// Redirects to `S`, using given cast to convert the constructed `S` into the provided type.
    pub fn to<S: Send + Sync + 'static>(cast: fn(InstancePtr<S>) -> InstancePtr<T>) -> Self {
        Self {
            redirect: TypeRedirect {
                target: DependencyType::of::<S>(),
                cast: Arc::new(move |instance| match downcast::<S>(&instance) {
                    Some(instance) => Ok(erase(cast(instance))),
                    None => Err(instance),
                }),
            },
            _phantom: PhantomData,
        }
    }

    /// Returns the type this redirect points to.
    #[inline]
    pub fn target(&self) -> DependencyType {
        self.redirect.target
    }
}

impl<T: Send + Sync + 'static> Redirect<T> {
    /// Redirects to the provided type itself.
    pub fn to_self() -> Self {
        Self::to::<T>(|instance| instance)
    }
}

impl<T: ?Sized> From<Redirect<T>> for TypeRedirect {
    #[inline]
    fn from(value: Redirect<T>) -> Self {
        value.redirect
    }
}

/// Builder for [ProviderDefinition]s of type `T`.
pub struct Provider<T: ?Sized> {
    name: String,
    dependency_name: Option<String>,
    parameters: Vec<Parameter>,
    _phantom: PhantomData<fn() -> InstancePtr<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Provider<T> {
    /// Starts a provider with given name, which is used in diagnostic messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependency_name: None,
            parameters: vec![],
            _phantom: PhantomData,
        }
    }

    /// Provides a named dependency, instead of the unnamed one.
    pub fn named(mut self, dependency_name: impl Into<String>) -> Self {
        self.dependency_name = Some(dependency_name.into());
        self
    }

    /// Adds a parameter requiring an unnamed `P`.
    pub fn parameter<P: ?Sized + 'static>(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::of::<P>(name));
        self
    }

    /// Adds a parameter requiring a `P` with given dependency name.
    pub fn named_parameter<P: ?Sized + 'static>(
        mut self,
        name: impl Into<String>,
        dependency_name: impl Into<String>,
    ) -> Self {
        self.parameters
            .push(Parameter::named::<P>(name, dependency_name));
        self
    }

    /// Adds a parameter requiring the current [InjectorRef](crate::injector::InjectorRef).
    pub fn injector_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::injector(name));
        self
    }

    /// Finishes an instance provider.
    pub fn instance<F>(self, provider: F) -> ProviderDefinition
    where
        F: Fn(&mut Arguments) -> Result<InstancePtr<T>, ErrorPtr> + Send + Sync + 'static,
    {
        self.finish(ProviderKind::Instance, move |arguments| {
            provider(arguments).map(|instance| ProviderOutput::Instance(erase(instance)))
        })
    }

    /// Finishes a type provider.
    pub fn redirect<F>(self, provider: F) -> ProviderDefinition
    where
        F: Fn(&mut Arguments) -> Result<Redirect<T>, ErrorPtr> + Send + Sync + 'static,
    {
        self.finish(ProviderKind::Type, move |arguments| {
            provider(arguments).map(|redirect| ProviderOutput::Redirect(redirect.into()))
        })
    }

    fn finish<F>(self, kind: ProviderKind, provider: F) -> ProviderDefinition
    where
        F: Fn(&mut Arguments) -> Result<ProviderOutput, ErrorPtr> + Send + Sync + 'static,
    {
        ProviderDefinition {
            name: self.name,
            key: DependencyKey::new(DependencyType::of::<T>(), self.dependency_name),
            kind,
            parameters: self.parameters,
            provider: Arc::new(provider),
        }
    }
}
