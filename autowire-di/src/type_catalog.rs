//! Functionality related to knowing which types exist. The [Injector](crate::injector::Injector)
//! falls back to constructing a type when a key has no binding but names a type known to its
//! [TypeCatalog], and uses contracts registered here to check and cast instances.
//!
//! Types, method tables and contracts can be registered automatically by the derive macros or
//! manually on a [StaticTypeCatalog].

use crate::inspectable::{Constructible, Invocable, MethodDeclaration, MethodTable, TypeToken};
use crate::instance::{AnyPtr, CastFunction, Injectable, InstancePtr, Key};
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;
use std::any::{type_name, TypeId};
use tracing::trace;

/// A catalog of types known to the injector.
#[cfg_attr(test, automock)]
pub trait TypeCatalog {
    /// Returns a type known under given key.
    fn type_token(&self, key: &str) -> Option<TypeToken>;

    /// Returns a method declared by type with given id.
    fn method(&self, type_id: TypeId, name: &str) -> Option<MethodDeclaration>;

    /// Returns all cast functions forming the contract for given key.
    fn casts(&self, key: &str) -> Vec<CastFunction>;

    /// Checks if given key names a known type.
    fn is_constructible(&self, key: &str) -> bool;
}

/// Helper trait for [TypeCatalog] providing contract checks and strongly-typed casts.
pub trait TypedTypeCatalog {
    /// Checks if the instance satisfies the contract of given key. Keys without any contract are
    /// not satisfied by anything.
    fn satisfies(&self, key: &str, instance: &AnyPtr) -> bool;

    /// Casts the instance to `T` using the contract of `T`.
    fn cast_typed<T: Injectable + ?Sized>(&self, instance: &AnyPtr) -> Option<InstancePtr<T>>;
}

impl<C: TypeCatalog + ?Sized> TypedTypeCatalog for C {
    fn satisfies(&self, key: &str, instance: &AnyPtr) -> bool {
        self.casts(key)
            .iter()
            .any(|cast| cast(instance.clone()).is_ok())
    }

    fn cast_typed<T: Injectable + ?Sized>(&self, instance: &AnyPtr) -> Option<InstancePtr<T>> {
        self.casts(type_name::<T>()).iter().find_map(|cast| {
            cast(instance.clone())
                .ok()
                .and_then(|cast| cast.downcast::<InstancePtr<T>>().ok())
                .map(|cast| *cast)
        })
    }
}

/// Catalog initialized from statically registered types, method tables and contracts.
#[derive(Clone, Debug, Default)]
pub struct StaticTypeCatalog {
    types: FxHashMap<Key, TypeToken>,
    methods: FxHashMap<TypeId, Vec<MethodDeclaration>>,
    contracts: FxHashMap<Key, Vec<CastFunction>>,
}

impl StaticTypeCatalog {
    /// Creates a catalog containing everything registered by the derive macros.
    pub fn new() -> Self {
        let mut catalog = Self::default();

        for registerer in inventory::iter::<internal::TypeRegisterer> {
            catalog.register_token((registerer.register)());
        }

        for registerer in inventory::iter::<internal::MethodRegisterer> {
            catalog.register_method_table((registerer.register)());
        }

        for registerer in inventory::iter::<internal::ContractRegisterer> {
            let definition = (registerer.register)();
            catalog.register_contract(definition.key, definition.cast);
        }

        catalog
    }

    /// Registers a type along with its own contract. Registering the same key again replaces the
    /// previous type, including its own cast.
    pub fn register_token(&mut self, token: TypeToken) {
        trace!("Registering type: {}", token.name);
        self.types.insert(token.name.to_string(), token);
    }

    #[inline]
    pub fn register_type<T: Constructible>(&mut self) {
        self.register_token(TypeToken::of::<T>());
    }

    /// Registers methods for a type. Methods with names already registered for the type are
    /// replaced.
    pub fn register_method_table(&mut self, table: MethodTable) {
        let methods = self.methods.entry(table.type_id).or_default();
        for declaration in table.methods {
            methods.retain(|existing| existing.name != declaration.name);
            methods.push(declaration);
        }
    }

    #[inline]
    pub fn register_methods<T: Invocable>(&mut self) {
        self.register_method_table(MethodTable::of::<T>());
    }

    /// Adds a cast function to the contract for given key.
    pub fn register_contract(&mut self, key: &str, cast: CastFunction) {
        self.contracts.entry(key.to_string()).or_default().push(cast);
    }
}

impl TypeCatalog for StaticTypeCatalog {
    #[inline]
    fn type_token(&self, key: &str) -> Option<TypeToken> {
        self.types.get(key).cloned()
    }

    fn method(&self, type_id: TypeId, name: &str) -> Option<MethodDeclaration> {
        self.methods
            .get(&type_id)
            .and_then(|methods| methods.iter().find(|method| method.name == name))
            .cloned()
    }

    #[inline]
    fn casts(&self, key: &str) -> Vec<CastFunction> {
        // own cast of a registered type goes first
        self.types
            .get(key)
            .map(|token| token.cast)
            .into_iter()
            .chain(self.contracts.get(key).into_iter().flatten().copied())
            .collect()
    }

    #[inline]
    fn is_constructible(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }
}

#[doc(hidden)]
pub mod internal {
    use crate::inspectable::{MethodTable, TypeToken};
    use crate::instance::CastFunction;
    use inventory::collect;
    pub use inventory::submit;

    pub struct TypeRegisterer {
        pub register: fn() -> TypeToken,
    }

    pub struct MethodRegisterer {
        pub register: fn() -> MethodTable,
    }

    #[derive(Clone)]
    pub struct ContractDefinition {
        pub key: &'static str,
        pub cast: CastFunction,
    }

    pub struct ContractRegisterer {
        pub register: fn() -> ContractDefinition,
    }

    collect!(TypeRegisterer);
    collect!(MethodRegisterer);
    collect!(ContractRegisterer);
}

#[cfg(test)]
mod tests {
    use crate::error::InjectorError;
    use crate::inspectable::{
        receiver, Arguments, Constructible, Invocable, MethodDeclaration, Parameter,
    };
    use crate::instance::{key_of, param, AnyPtr, Injectable, InstancePtr};
    use crate::type_catalog::{StaticTypeCatalog, TypeCatalog, TypedTypeCatalog};
    use std::any::{Any, TypeId};

    trait TestTrait {
        fn value(&self) -> i8;
    }

    impl Injectable for dyn TestTrait {}

    struct TestType;

    impl Injectable for TestType {}

    impl TestTrait for TestType {
        fn value(&self) -> i8 {
            5
        }
    }

    impl Constructible for TestType {
        fn constructor() -> Option<Vec<Parameter>> {
            None
        }

        fn construct(_arguments: &mut Arguments<'_>) -> Result<Self, InjectorError> {
            Ok(TestType)
        }
    }

    fn invoke_value(
        instance: &AnyPtr,
        _arguments: &mut Arguments<'_>,
    ) -> Result<Option<AnyPtr>, InjectorError> {
        Ok(Some(param(receiver::<TestType>(instance)?.value())))
    }

    impl Invocable for TestType {
        fn methods() -> Vec<MethodDeclaration> {
            vec![MethodDeclaration {
                name: "value",
                markers: &[],
                parameters: vec![],
                invoke: invoke_value,
            }]
        }
    }

    fn cast_trait(instance: AnyPtr) -> Result<Box<dyn Any>, AnyPtr> {
        instance
            .downcast::<TestType>()
            .map(|p| Box::new(p as InstancePtr<dyn TestTrait>) as Box<dyn Any>)
    }

    #[test]
    fn should_register_types() {
        let mut catalog = StaticTypeCatalog::default();
        catalog.register_type::<TestType>();

        assert!(catalog.is_constructible(key_of::<TestType>()));
        assert!(!catalog.is_constructible("unknown"));
        assert_eq!(
            catalog.type_token(key_of::<TestType>()).unwrap().type_id,
            TypeId::of::<TestType>()
        );
    }

    #[test]
    fn should_register_own_contract_for_types() {
        let mut catalog = StaticTypeCatalog::default();
        catalog.register_type::<TestType>();

        assert!(catalog.satisfies(key_of::<TestType>(), &param(TestType)));
        assert!(!catalog.satisfies(key_of::<TestType>(), &param(1)));
        assert!(catalog.cast_typed::<TestType>(&param(TestType)).is_some());
    }

    #[test]
    fn should_replace_own_contract_when_registering_again() {
        let mut catalog = StaticTypeCatalog::default();
        catalog.register_type::<TestType>();
        catalog.register_type::<TestType>();
        catalog.register_contract(key_of::<TestType>(), cast_trait);

        assert_eq!(catalog.casts(key_of::<TestType>()).len(), 2);
        assert!(catalog.cast_typed::<TestType>(&param(TestType)).is_some());
    }

    #[test]
    fn should_cast_to_trait_contracts() {
        let mut catalog = StaticTypeCatalog::default();
        catalog.register_contract(key_of::<dyn TestTrait>(), cast_trait);

        let instance = catalog
            .cast_typed::<dyn TestTrait>(&param(TestType))
            .unwrap();
        assert_eq!(instance.value(), 5);
        assert!(catalog.cast_typed::<dyn TestTrait>(&param(1)).is_none());
    }

    #[test]
    fn should_not_satisfy_unknown_contracts() {
        let catalog = StaticTypeCatalog::default();
        assert!(!catalog.satisfies("unknown", &param(TestType)));
    }

    #[test]
    fn should_register_methods() {
        let mut catalog = StaticTypeCatalog::default();
        catalog.register_methods::<TestType>();
        catalog.register_methods::<TestType>();

        let method = catalog
            .method(TypeId::of::<TestType>(), "value")
            .unwrap();
        let result = (method.invoke)(&param(TestType), &mut Arguments::new(vec![], &catalog))
            .unwrap()
            .unwrap();
        assert_eq!(*result.downcast::<i8>().unwrap(), 5);
        assert!(catalog.method(TypeId::of::<TestType>(), "other").is_none());
        assert!(catalog.method(TypeId::of::<i8>(), "value").is_none());
    }
}
