//! Dependencies are identified by a [DependencyKey] - a pair of the requested type and an optional
//! name. Keys are used both to find providers in a registry and to store constructed instances in
//! an [Injector](crate::injector::Injector) cache.
//!
//! Names make it possible to have multiple, independent instances of the same type:
//!
//! ```
//! use provide_di::key::DependencyKey;
//!
//! struct Database;
//!
//! assert_ne!(
//!     DependencyKey::named::<Database>("primary"),
//!     DependencyKey::named::<Database>("replica")
//! );
//! assert_eq!(DependencyKey::of::<Database>(), DependencyKey::of::<Database>());
//! ```

use std::any::{type_name, TypeId};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Reserved dependency name which, combined with the
/// [InjectorRef](crate::injector::InjectorRef) type, resolves to the injector performing the
/// resolution.
pub const INJECTOR: &str = "__injector__";

/// Runtime identifier of a type which can be requested from an injector. The type name is carried
/// along only for diagnostics and does not take part in comparisons.
#[derive(Copy, Clone, Debug)]
pub struct DependencyType {
    id: TypeId,
    name: &'static str,
}

impl DependencyType {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for DependencyType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DependencyType {}

impl Hash for DependencyType {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for DependencyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Identifies a requested or provided dependency. Two keys are equal when both the types and the
/// names are equal.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DependencyKey {
    ty: DependencyType,
    name: Option<String>,
}

impl DependencyKey {
    #[inline]
    pub fn new(ty: DependencyType, name: Option<String>) -> Self {
        Self { ty, name }
    }

    /// Key for an unnamed dependency of type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(DependencyType::of::<T>(), None)
    }

    /// Key for a dependency of type `T` with given name.
    #[inline]
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(DependencyType::of::<T>(), Some(name.into()))
    }

    /// The reserved key under which every injector stores a handle to itself.
    #[inline]
    pub fn injector() -> Self {
        Self::named::<crate::injector::InjectorRef>(INJECTOR)
    }

    #[inline]
    pub fn ty(&self) -> DependencyType {
        self.ty
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Display for DependencyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} (named {name})", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}
