//! Dependency injection container with autowiring, based on abstract keys.
//!
//! Instances are requested from an [Injector](injector::Injector) by key. A key can be bound to a
//! shared instance, a factory or another key (an alias). Keys without any binding, which name a
//! type known to the [TypeCatalog](type_catalog::TypeCatalog), get constructed automatically, with
//! their dependencies resolved recursively.
//!
//! Since Rust has no runtime reflection, types describe their constructors and methods via the
//! [inspectable] capability, typically derived with `#[derive(Inspectable)]` and
//! `#[inspectable_methods]`. Trait objects become injectable with `#[injectable]` and
//! implementations are registered for them with `#[contract]`.
//!
//! ```
//! use autowire_di::injector::{InjectorBuilder, TypedInjector};
//! use autowire_di::instance::InstancePtr;
//! use autowire_di::{contract, injectable, Inspectable};
//!
//! #[injectable]
//! trait Greeter {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Inspectable)]
//! struct EnglishGreeter;
//!
//! #[contract]
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         "Hello".to_string()
//!     }
//! }
//!
//! #[derive(Inspectable)]
//! struct Welcome {
//!     greeter: InstancePtr<EnglishGreeter>,
//! }
//!
//! let mut injector = InjectorBuilder::new().build();
//! let welcome = injector.retrieve_typed::<Welcome>(&[]).unwrap();
//! assert_eq!(welcome.greeter.greet(), "Hello");
//! ```
//!
//! ### Features
//!
//! * `derive` - automatically import helper proc macros

pub mod binding;
pub mod config;
mod error;
pub mod factory;
pub mod injector;
pub mod inspectable;
pub mod instance;
pub mod interrupt;
pub mod observer;
pub mod type_catalog;

pub use error::InjectorError;

#[cfg(feature = "derive")]
pub use autowire_di_derive::{contract, injectable, inspectable_methods, Inspectable};
