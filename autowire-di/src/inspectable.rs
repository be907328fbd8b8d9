//! The inspectable capability replaces runtime reflection: every type which the injector should be
//! able to construct or call into describes its constructor and methods with ordered
//! [Parameter] descriptors.
//!
//! ## Deriving
//!
//! With the `derive` feature enabled, struct fields become constructor parameters:
//!
//! ```
//! use autowire_di::instance::InstancePtr;
//! use autowire_di::{contract, injectable, inspectable_methods, Inspectable};
//!
//! #[injectable]
//! trait Service {
//!     fn process(&self) -> bool;
//! }
//!
//! #[derive(Inspectable)]
//! struct ServiceImpl;
//!
//! #[contract]
//! impl Service for ServiceImpl {
//!     fn process(&self) -> bool {
//!         true
//!     }
//! }
//!
//! #[derive(Inspectable)]
//! #[inspectable(markers = ["controller"])]
//! struct TestComponent {
//!     // required dependency - resolution fails when missing
//!     service: InstancePtr<dyn Service>,
//!     // optional dependency - `None` when missing
//!     optional: Option<InstancePtr<ServiceImpl>>,
//!     // built-in types are never autowired and need to be passed explicitly
//!     #[inspectable(default)]
//!     name: String,
//!     #[inspectable(default = "default_limit")]
//!     limit: u32,
//! }
//!
//! fn default_limit() -> u32 {
//!     10
//! }
//!
//! #[inspectable_methods]
//! impl TestComponent {
//!     fn describe(&self, service: InstancePtr<dyn Service>, suffix: String) -> String {
//!         format!("{} {} {}", self.name, service.process(), suffix)
//!     }
//! }
//! ```
//!
//! ### Supported `#[inspectable]` struct configuration
//!
//! * `markers = ["marker"]` - markers attached to the type declaration, visible to
//! [ReflectionObserver](crate::observer::ReflectionObserver)s
//! * `constructor = "path"` - build instances with `path`, called with field values in
//! declaration order and returning `Result<Self, ErrorPtr>`; errors are reported as
//! [InjectorError::Construction]
//!
//! Exposed methods returning `Result<T, ErrorPtr>` report errors the same way.
//!
//! ### Supported `#[inspectable]` field and method parameter configuration
//!
//! * `default` - use `Default::default()` when no explicit value is passed
//! * `default = "expr"` - call `expr()` when no explicit value is passed
//!
//! ### Parameter classification
//!
//! * `InstancePtr<T>` - required dependency of type `T`
//! * `Option<InstancePtr<T>>` - optional dependency of type `T`
//! * `Option<T>` - optional built-in value
//! * anything else - required built-in value
//!
//! Autowired dependencies are resolved in declaration order and placed before explicitly passed
//! parameters, so explicit parameters should be declared after dependencies.

use crate::error::InjectorError;
use crate::instance::{downcast, AnyPtr, CastFunction, Injectable, InstancePtr};
use crate::type_catalog::{TypeCatalog, TypedTypeCatalog};
use derivative::Derivative;
use std::any::{type_name, Any, TypeId};

/// Name of the method called on freshly constructed instances and by
/// [Injector::resolved](crate::injector::Injector::resolved), if declared.
pub const RESOLVE_WITH: &str = "resolve_with";

/// Descriptor of a single declared constructor or method parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Parameter {
    pub name: &'static str,
    /// Key of the declared type, if any.
    pub declared_type: Option<&'static str>,
    /// Does the declared type accept absence.
    pub nullable: bool,
    /// Built-in types are never autowired.
    pub builtin: bool,
}

impl Parameter {
    /// Parameter autowired with an instance of `T`.
    pub fn injected<T: Injectable + ?Sized>(name: &'static str, nullable: bool) -> Self {
        Self {
            name,
            declared_type: Some(type_name::<T>()),
            nullable,
            builtin: false,
        }
    }

    /// Parameter which needs to be passed explicitly.
    pub fn builtin<T: ?Sized + 'static>(name: &'static str, nullable: bool) -> Self {
        Self {
            name,
            declared_type: Some(type_name::<T>()),
            nullable,
            builtin: true,
        }
    }

    pub fn untyped(name: &'static str) -> Self {
        Self {
            name,
            declared_type: None,
            nullable: true,
            builtin: false,
        }
    }

    /// Returns the key to autowire, if this parameter should be autowired at all.
    #[inline]
    pub fn autowired_type(&self) -> Option<&'static str> {
        self.declared_type.filter(|_| !self.builtin)
    }
}

/// Positional arguments for a constructor or method. Values are consumed in declaration order.
pub struct Arguments<'a> {
    values: std::vec::IntoIter<Option<AnyPtr>>,
    position: usize,
    catalog: &'a dyn TypeCatalog,
}

impl<'a> Arguments<'a> {
    pub fn new(values: Vec<Option<AnyPtr>>, catalog: &'a dyn TypeCatalog) -> Self {
        Self {
            values: values.into_iter(),
            position: 0,
            catalog,
        }
    }

    /// Number of remaining arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_value(&mut self) -> (usize, Option<AnyPtr>) {
        let position = self.position;
        self.position += 1;
        (position, self.values.next().flatten())
    }

    fn cast<T: Injectable + ?Sized>(
        &self,
        position: usize,
        value: AnyPtr,
    ) -> Result<InstancePtr<T>, InjectorError> {
        self.catalog
            .cast_typed::<T>(&value)
            .ok_or(InjectorError::IncompatibleArgument {
                position,
                expected: type_name::<T>(),
            })
    }

    fn extract<T: Clone + 'static>(
        position: usize,
        value: AnyPtr,
    ) -> Result<T, InjectorError> {
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or(InjectorError::IncompatibleArgument {
                position,
                expected: type_name::<T>(),
            })
    }

    /// Takes the next argument as a required dependency.
    pub fn dependency<T: Injectable + ?Sized>(&mut self) -> Result<InstancePtr<T>, InjectorError> {
        match self.next_value() {
            (position, Some(value)) => self.cast(position, value),
            (position, None) => Err(InjectorError::MissingArgument { position }),
        }
    }

    /// Takes the next argument as an optional dependency.
    pub fn optional_dependency<T: Injectable + ?Sized>(
        &mut self,
    ) -> Result<Option<InstancePtr<T>>, InjectorError> {
        let (position, value) = self.next_value();
        value.map(|value| self.cast(position, value)).transpose()
    }

    /// Takes a copy of the next explicitly passed value.
    pub fn value<T: Clone + 'static>(&mut self) -> Result<T, InjectorError> {
        match self.next_value() {
            (position, Some(value)) => Self::extract(position, value),
            (position, None) => Err(InjectorError::MissingArgument { position }),
        }
    }

    pub fn optional_value<T: Clone + 'static>(&mut self) -> Result<Option<T>, InjectorError> {
        let (position, value) = self.next_value();
        value
            .map(|value| Self::extract(position, value))
            .transpose()
    }

    /// Takes a copy of the next explicitly passed value or calls `default` when absent.
    pub fn value_or_else<T: Clone + 'static, F: FnOnce() -> T>(
        &mut self,
        default: F,
    ) -> Result<T, InjectorError> {
        Ok(self.optional_value()?.unwrap_or_else(default))
    }

    /// Takes all remaining present arguments.
    pub fn rest(&mut self) -> Vec<AnyPtr> {
        self.position += self.values.len();
        self.values.by_ref().flatten().collect()
    }
}

/// Types which can be constructed by the injector. Typically derived with
/// `#[derive(Inspectable)]`.
pub trait Constructible: Injectable + Sized {
    /// Returns constructor parameters or `None`, if the type has no constructor and should be
    /// created without arguments.
    fn constructor() -> Option<Vec<Parameter>>;

    fn construct(arguments: &mut Arguments<'_>) -> Result<Self, InjectorError>;

    /// Markers attached to the type declaration.
    fn markers() -> &'static [&'static str] {
        &[]
    }
}

/// Types exposing methods to the injector. Typically generated by `#[inspectable_methods]`.
pub trait Invocable: Injectable + Sized {
    fn methods() -> Vec<MethodDeclaration>;
}

pub type ConstructFunction = fn(arguments: &mut Arguments<'_>) -> Result<AnyPtr, InjectorError>;

pub type InvokeFunction = fn(
    instance: &AnyPtr,
    arguments: &mut Arguments<'_>,
) -> Result<Option<AnyPtr>, InjectorError>;

/// Type-erased description of a [Constructible] type.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct TypeToken {
    /// Key under which the type is known.
    pub name: &'static str,
    pub type_id: TypeId,
    pub markers: &'static [&'static str],
    pub constructor: Option<Vec<Parameter>>,
    #[derivative(Debug = "ignore")]
    pub construct: ConstructFunction,
    /// Contract of the type itself.
    #[derivative(Debug = "ignore")]
    pub cast: CastFunction,
}

fn construct_erased<T: Constructible>(
    arguments: &mut Arguments<'_>,
) -> Result<AnyPtr, InjectorError> {
    T::construct(arguments).map(|instance| InstancePtr::new(instance) as AnyPtr)
}

impl TypeToken {
    pub fn of<T: Constructible>() -> Self {
        Self {
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            markers: T::markers(),
            constructor: T::constructor(),
            construct: construct_erased::<T>,
            cast: downcast::<T>,
        }
    }
}

/// Type-erased description of a method which can be called by the injector.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct MethodDeclaration {
    pub name: &'static str,
    pub markers: &'static [&'static str],
    pub parameters: Vec<Parameter>,
    #[derivative(Debug = "ignore")]
    pub invoke: InvokeFunction,
}

/// All methods declared by a single type.
#[derive(Clone, Debug)]
pub struct MethodTable {
    pub type_id: TypeId,
    pub methods: Vec<MethodDeclaration>,
}

impl MethodTable {
    pub fn of<T: Invocable>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            methods: T::methods(),
        }
    }
}

/// A declaration introspected by the injector.
#[derive(Clone, Debug)]
pub enum Declaration {
    Type(TypeToken),
    Method(MethodDeclaration),
}

impl Declaration {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Declaration::Type(token) => token.name,
            Declaration::Method(declaration) => declaration.name,
        }
    }

    #[inline]
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            Declaration::Type(token) => token.markers,
            Declaration::Method(declaration) => declaration.markers,
        }
    }

    /// Checks if the declaration carries given marker.
    #[inline]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers().contains(&marker)
    }
}

/// Helper for generated code: downcasts the receiver of a method call.
pub fn receiver<T: Any>(instance: &AnyPtr) -> Result<&T, InjectorError> {
    instance
        .downcast_ref::<T>()
        .ok_or(InjectorError::IncompatibleArgument {
            position: 0,
            expected: type_name::<T>(),
        })
}

#[cfg(test)]
mod tests {
    use crate::error::InjectorError;
    use crate::inspectable::{Arguments, Constructible, Declaration, Parameter, TypeToken};
    use crate::instance::{downcast, key_of, param, Injectable, InstancePtr};
    use crate::type_catalog::StaticTypeCatalog;

    struct TestDependency;

    impl Injectable for TestDependency {}

    struct TestType {
        dependency: Option<InstancePtr<TestDependency>>,
        name: String,
        count: usize,
    }

    impl Injectable for TestType {}

    impl Constructible for TestType {
        fn constructor() -> Option<Vec<Parameter>> {
            Some(vec![
                Parameter::injected::<TestDependency>("dependency", true),
                Parameter::builtin::<String>("name", false),
                Parameter::builtin::<usize>("count", false),
            ])
        }

        fn construct(arguments: &mut Arguments<'_>) -> Result<Self, InjectorError> {
            Ok(Self {
                dependency: arguments.optional_dependency()?,
                name: arguments.value()?,
                count: arguments.value_or_else(|| 7)?,
            })
        }

        fn markers() -> &'static [&'static str] {
            &["test"]
        }
    }

    fn create_catalog() -> StaticTypeCatalog {
        let mut catalog = StaticTypeCatalog::default();
        catalog.register_contract(key_of::<TestDependency>(), downcast::<TestDependency>);
        catalog
    }

    #[test]
    fn should_only_autowire_non_builtin_typed_parameters() {
        assert_eq!(
            Parameter::injected::<TestDependency>("a", false).autowired_type(),
            Some(key_of::<TestDependency>())
        );
        assert!(Parameter::builtin::<String>("a", false)
            .autowired_type()
            .is_none());
        assert!(Parameter::untyped("a").autowired_type().is_none());
    }

    #[test]
    fn should_construct_from_arguments() {
        let catalog = create_catalog();
        let mut arguments = Arguments::new(
            vec![
                Some(param(TestDependency)),
                Some(param("name".to_string())),
            ],
            &catalog,
        );

        let instance = TestType::construct(&mut arguments).unwrap();
        assert!(instance.dependency.is_some());
        assert_eq!(instance.name, "name");
        assert_eq!(instance.count, 7);
    }

    #[test]
    fn should_accept_missing_optional_dependency() {
        let catalog = create_catalog();
        let mut arguments =
            Arguments::new(vec![None, Some(param("name".to_string()))], &catalog);

        let instance = TestType::construct(&mut arguments).unwrap();
        assert!(instance.dependency.is_none());
    }

    #[test]
    fn should_reject_misplaced_arguments() {
        let catalog = create_catalog();
        let mut arguments = Arguments::new(
            vec![Some(param("name".to_string())), Some(param(TestDependency))],
            &catalog,
        );

        assert!(matches!(
            TestType::construct(&mut arguments),
            Err(InjectorError::IncompatibleArgument { position: 0, .. })
        ));
    }

    #[test]
    fn should_report_missing_arguments() {
        let catalog = create_catalog();
        let mut arguments = Arguments::new(vec![None], &catalog);

        assert!(matches!(
            TestType::construct(&mut arguments),
            Err(InjectorError::MissingArgument { position: 1 })
        ));
    }

    #[test]
    fn should_collect_rest_arguments() {
        let catalog = create_catalog();
        let mut arguments = Arguments::new(
            vec![Some(param(1)), None, Some(param(2)), Some(param(3))],
            &catalog,
        );

        assert_eq!(arguments.value::<i32>().unwrap(), 1);
        assert_eq!(arguments.rest().len(), 2);
        assert!(arguments.is_empty());
    }

    #[test]
    fn should_expose_type_markers() {
        let token = TypeToken::of::<TestType>();
        assert_eq!(token.name, key_of::<TestType>());
        assert_eq!(token.constructor.as_ref().map(Vec::len), Some(3));

        let declaration = Declaration::Type(token);
        assert!(declaration.has_marker("test"));
        assert!(!declaration.has_marker("other"));
    }
}
