//! Factories which generate instances for other keys. A [DependencyFactory] is a regular
//! injectable service: bind it with
//! [Injector::register_factory_delegate](crate::injector::Injector::register_factory_delegate)
//! and the injector will retrieve the factory itself (autowiring and caching it like any other
//! instance) and ask it to generate instances for the bound key.
//!
//! ```
//! use autowire_di::binding::Mode;
//! use autowire_di::factory::DependencyFactory;
//! use autowire_di::injector::InjectorBuilder;
//! use autowire_di::instance::{key_of, param, AnyPtr};
//! use autowire_di::{contract, Inspectable};
//!
//! #[derive(Inspectable)]
//! struct NumberFactory;
//!
//! #[contract]
//! impl DependencyFactory for NumberFactory {
//!     fn generate(&self, key: &str, params: &[AnyPtr]) -> Option<AnyPtr> {
//!         Some(param(key.len() + params.len()))
//!     }
//! }
//!
//! let mut injector = InjectorBuilder::new().build();
//! injector.register_factory_delegate("number", key_of::<NumberFactory>(), Mode::Mutable);
//!
//! let number = injector.retrieve("number", &[]).unwrap();
//! assert_eq!(*number.downcast::<usize>().unwrap(), 6);
//! ```

use crate::instance::{AnyPtr, Injectable};

/// Generator of instances for abstract keys.
pub trait DependencyFactory {
    /// Generates an instance for given key, or `None` if the key is not supported.
    fn generate(&self, key: &str, params: &[AnyPtr]) -> Option<AnyPtr>;
}

impl Injectable for dyn DependencyFactory {}
