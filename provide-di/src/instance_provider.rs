//! Instance pointers and the generic [InstanceProvider] abstraction implemented by
//! [Injector](crate::injector::Injector).

use crate::error::{ArgumentError, DependencyError, DependencyErrorKind};
use crate::key::{DependencyKey, DependencyType};
use std::any::Any;
use std::error::Error;
use std::sync::Arc;
use std::vec::IntoIter;

/// Pointer to a resolved instance. Singletons are shared, so all instances are reference counted.
pub type InstancePtr<T> = Arc<T>;

/// Type-erased [InstancePtr]. Holds an `InstancePtr<T>`, which makes it possible to erase
/// unsized types such as `dyn Trait`.
pub type InstanceAnyPtr = Arc<dyn Any + Send + Sync + 'static>;

/// Error returned from providers and constructors.
pub type ErrorPtr = Arc<dyn Error + Send + Sync + 'static>;

/// Erases the type of given instance.
#[inline]
pub fn erase<T: ?Sized + Send + Sync + 'static>(instance: InstancePtr<T>) -> InstanceAnyPtr {
    Arc::new(instance)
}

/// Recovers the typed pointer from an erased instance, if it holds `InstancePtr<T>`.
#[inline]
pub fn downcast<T: ?Sized + Send + Sync + 'static>(
    instance: &InstanceAnyPtr,
) -> Option<InstancePtr<T>> {
    instance.downcast_ref::<InstancePtr<T>>().cloned()
}

/// Resolved arguments for a constructor or provider, in declaration order.
#[derive(Debug)]
pub struct Arguments {
    values: IntoIter<InstanceAnyPtr>,
    position: usize,
}

impl Arguments {
    pub fn new(values: Vec<InstanceAnyPtr>) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Takes the next argument, which should be an instance of `T`.
    pub fn next<T: ?Sized + Send + Sync + 'static>(
        &mut self,
    ) -> Result<InstancePtr<T>, ErrorPtr> {
        let position = self.position;
        let value = self
            .values
            .next()
            .ok_or_else(|| Arc::new(ArgumentError::MissingArgument(position)) as ErrorPtr)?;

        self.position += 1;

        downcast(&value).ok_or_else(|| {
            Arc::new(ArgumentError::IncompatibleArgument {
                position,
                expected: DependencyType::of::<T>(),
            }) as ErrorPtr
        })
    }

    /// Number of arguments not taken yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

/// Generic provider for dependency instances.
pub trait InstanceProvider {
    /// Returns an instance for given key, creating it if needed.
    fn instance(&self, key: &DependencyKey) -> Result<InstanceAnyPtr, DependencyError>;
}

/// Helper trait for [InstanceProvider] providing strongly-typed access.
pub trait TypedInstanceProvider {
    /// Returns the unnamed instance of `T`.
    fn get_instance<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<InstancePtr<T>, DependencyError>;

    /// Returns the instance of `T` registered with given name.
    fn get_named_instance<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<InstancePtr<T>, DependencyError>;
}

impl<IP: InstanceProvider + ?Sized> TypedInstanceProvider for IP {
    #[inline]
    fn get_instance<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<InstancePtr<T>, DependencyError> {
        typed_instance(self, DependencyKey::of::<T>())
    }

    #[inline]
    fn get_named_instance<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<InstancePtr<T>, DependencyError> {
        typed_instance(self, DependencyKey::named::<T>(name))
    }
}

fn typed_instance<T: ?Sized + Send + Sync + 'static, IP: InstanceProvider + ?Sized>(
    instance_provider: &IP,
    key: DependencyKey,
) -> Result<InstancePtr<T>, DependencyError> {
    let instance = instance_provider.instance(&key)?;
    downcast(&instance).ok_or_else(|| {
        DependencyError::new(
            DependencyErrorKind::IncompatibleInstance(key.ty()),
            vec![key.ty()],
            key.name(),
        )
    })
}

#[cfg(test)]
mod tests {
    use crate::error::ArgumentError;
    use crate::instance_provider::{erase, Arguments, InstancePtr};

    trait TestTrait: Send + Sync {
        fn value(&self) -> i8;
    }

    struct TestDependency;

    impl TestTrait for TestDependency {
        fn value(&self) -> i8 {
            7
        }
    }

    #[test]
    fn should_take_arguments_in_order() {
        let mut arguments = Arguments::new(vec![
            erase(InstancePtr::new(1u8)),
            erase(InstancePtr::new(TestDependency) as InstancePtr<dyn TestTrait>),
        ]);

        assert_eq!(*arguments.next::<u8>().unwrap(), 1);
        assert_eq!(arguments.next::<dyn TestTrait>().unwrap().value(), 7);
        assert_eq!(arguments.remaining(), 0);
    }

    #[test]
    fn should_reject_incompatible_argument() {
        let mut arguments = Arguments::new(vec![erase(InstancePtr::new(1u8))]);

        let error = arguments.next::<i64>().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ArgumentError>(),
            Some(ArgumentError::IncompatibleArgument { position: 0, .. })
        ));
    }

    #[test]
    fn should_reject_missing_argument() {
        let mut arguments = Arguments::new(vec![]);

        let error = arguments.next::<u8>().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ArgumentError>(),
            Some(ArgumentError::MissingArgument(0))
        ));
    }
}
