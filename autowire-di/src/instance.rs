//! Pointer types shared by every part of the injector, along with the key convention used to bind
//! Rust types.
//!
//! Instances handed out by the injector are reference-counted [InstancePtr]s. Since a single
//! key can be bound to arbitrary types, the registry stores them type-erased as [AnyPtr] and
//! turns them back into concrete or `dyn Trait` pointers with [CastFunction]s registered as
//! contracts (see [crate::type_catalog]).

use std::any::{type_name, Any};
use std::error::Error;
use std::rc::Rc;

/// Abstract key under which bindings are registered and looked up. Any string is a valid key,
/// but types are conventionally bound under [key_of].
pub type Key = String;

pub type InstancePtr<T> = Rc<T>;

pub type AnyPtr = InstancePtr<dyn Any + 'static>;

/// Error returned by user constructors and methods.
pub type ErrorPtr = InstancePtr<dyn Error + 'static>;

/// Function used to cast a type-erased instance to a `Box<dyn Any>` containing an
/// `InstancePtr<Target>`, where `Target` is the type associated with a contract. Returns the
/// original pointer when the instance does not satisfy the contract.
pub type CastFunction = fn(instance: AnyPtr) -> Result<Box<dyn Any>, AnyPtr>;

/// Marker trait for types which can be requested by key - inspectable types and `dyn Trait`s
/// marked with `#[injectable]`.
pub trait Injectable: 'static {}

/// Returns the conventional key for given type.
#[inline]
pub fn key_of<T: Injectable + ?Sized>() -> &'static str {
    type_name::<T>()
}

/// Wraps a plain value, so it can be passed as an explicit parameter.
#[inline]
pub fn param<T: 'static>(value: T) -> AnyPtr {
    InstancePtr::new(value) as AnyPtr
}

/// Casts a type-erased instance to its concrete type.
#[inline]
pub fn downcast<T: Injectable>(instance: AnyPtr) -> Result<Box<dyn Any>, AnyPtr> {
    instance
        .downcast::<T>()
        .map(|instance| Box::new(instance) as Box<dyn Any>)
}

#[cfg(test)]
mod tests {
    use crate::instance::{downcast, key_of, param, Injectable};

    struct TestType;

    impl Injectable for TestType {}

    #[test]
    fn should_generate_type_keys() {
        assert!(key_of::<TestType>().ends_with("TestType"));
    }

    #[test]
    fn should_downcast_matching_instances() {
        assert!(downcast::<TestType>(param(TestType)).is_ok());
        assert!(downcast::<TestType>(param(1)).is_err());
    }
}
