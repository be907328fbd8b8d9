#[cfg(feature = "derive")]
mod inspectable_derive_test {
    use autowire_di::injector::{InjectorBuilder, TypedInjector};
    use autowire_di::inspectable::{Constructible, Invocable, Parameter};
    use autowire_di::instance::{key_of, param, AnyPtr, ErrorPtr, InstancePtr};
    use autowire_di::observer::AttributeWatcher;
    use autowire_di::type_catalog::{StaticTypeCatalog, TypeCatalog, TypedTypeCatalog};
    use autowire_di::{contract, injectable, inspectable_methods, InjectorError, Inspectable};
    use std::any::TypeId;
    use std::cell::Cell;
    use std::fmt;
    use std::rc::Rc;

    #[injectable]
    trait TestTrait {
        fn value(&self) -> i8;
    }

    #[derive(Inspectable)]
    #[inspectable(markers = ["abc", "def", "xyz"])]
    struct TestDependency;

    #[contract]
    impl TestTrait for TestDependency {
        fn value(&self) -> i8 {
            3
        }
    }

    fn dummy_expr() -> i8 {
        -1
    }

    #[derive(Inspectable)]
    struct TestComponent {
        dependency: InstancePtr<TestDependency>,
        trait_dependency: InstancePtr<dyn TestTrait>,
        optional_dependency: Option<InstancePtr<dyn TestTrait>>,
        optional_value: Option<String>,
        #[inspectable(default)]
        default: i8,
        #[inspectable(default = "dummy_expr")]
        default_expr: i8,
    }

    #[inspectable_methods]
    impl TestComponent {
        #[inspectable(markers = ["One", "Two"])]
        fn sum(&self, offset: i8) -> i8 {
            self.dependency.value() + self.default + self.default_expr + offset
        }

        #[allow(dead_code)]
        fn mutate(&mut self) {}

        #[allow(dead_code)]
        fn associated() {}
    }

    #[allow(dead_code)]
    #[derive(Inspectable)]
    struct TestTuple(InstancePtr<TestDependency>, #[inspectable(default = "dummy_expr")] i8);

    fn default_limit() -> u32 {
        10
    }

    #[derive(Inspectable)]
    #[inspectable(constructor = "LimitedComponent::checked")]
    struct LimitedComponent {
        #[inspectable(default = "default_limit")]
        limit: u32,
    }

    impl LimitedComponent {
        fn checked(limit: u32) -> Result<Self, ErrorPtr> {
            if limit > 100 {
                Err(Rc::new(fmt::Error))
            } else {
                Ok(Self { limit })
            }
        }
    }

    #[inspectable_methods]
    impl LimitedComponent {
        fn halve(&self) -> Result<u32, ErrorPtr> {
            if self.limit % 2 == 0 {
                Ok(self.limit / 2)
            } else {
                Err(Rc::new(fmt::Error))
            }
        }

        fn validate(&self) -> Result<(), ErrorPtr> {
            Ok(())
        }
    }

    #[test]
    fn should_describe_constructors() {
        assert!(TestDependency::constructor().is_none());
        assert_eq!(TestDependency::markers(), &["abc", "def", "xyz"]);

        let parameters = TestComponent::constructor().unwrap();
        assert_eq!(
            parameters,
            vec![
                Parameter::injected::<TestDependency>("dependency", false),
                Parameter::injected::<dyn TestTrait>("trait_dependency", false),
                Parameter::injected::<dyn TestTrait>("optional_dependency", true),
                Parameter::builtin::<String>("optional_value", true),
                Parameter::builtin::<i8>("default", false),
                Parameter::builtin::<i8>("default_expr", false),
            ]
        );
        assert!(TestComponent::markers().is_empty());

        let parameters = TestTuple::constructor().unwrap();
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "0");
        assert_eq!(parameters[1].name, "1");
    }

    #[test]
    fn should_describe_only_shared_methods() {
        let methods = TestComponent::methods();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "sum");
        assert_eq!(methods[0].markers, &["One", "Two"]);
        assert_eq!(
            methods[0].parameters,
            vec![Parameter::builtin::<i8>("offset", false)]
        );
    }

    #[test]
    fn should_register_statically() {
        let catalog = StaticTypeCatalog::new();
        assert!(catalog.is_constructible(key_of::<TestDependency>()));
        assert!(catalog.is_constructible(key_of::<TestComponent>()));
        assert!(!catalog.is_constructible(key_of::<dyn TestTrait>()));
        assert!(catalog
            .method(TypeId::of::<TestComponent>(), "sum")
            .is_some());

        let instance = param(TestDependency);
        assert!(catalog.satisfies(key_of::<dyn TestTrait>(), &instance));
        assert_eq!(
            catalog
                .cast_typed::<dyn TestTrait>(&instance)
                .unwrap()
                .value(),
            3
        );
    }

    #[test]
    fn should_construct_derived_types() {
        let mut injector = InjectorBuilder::new().build();
        injector.alias(key_of::<dyn TestTrait>(), key_of::<TestDependency>());

        let component = injector.retrieve_typed::<TestComponent>(&[]).unwrap();
        assert_eq!(component.trait_dependency.value(), 3);
        assert!(component.optional_dependency.is_some());
        assert!(component.optional_value.is_none());
        assert_eq!(component.default, 0);
        assert_eq!(component.default_expr, -1);

        let component: AnyPtr = component;
        let sum = injector
            .resolve_method(&component, "sum", vec![param(10i8)])
            .unwrap()
            .unwrap();
        assert_eq!(*sum.downcast::<i8>().unwrap(), 12);
    }

    #[test]
    fn should_report_failing_constructors() {
        let mut injector = InjectorBuilder::new().build();

        let component = injector.retrieve_typed::<LimitedComponent>(&[]).unwrap();
        assert_eq!(component.limit, 10);

        let component = injector
            .resolve_typed::<LimitedComponent>(vec![param(50u32)])
            .unwrap();
        assert_eq!(component.limit, 50);

        assert!(matches!(
            injector.resolve_typed::<LimitedComponent>(vec![param(150u32)]),
            Err(InjectorError::Construction(_))
        ));
    }

    #[test]
    fn should_report_failing_methods() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut injector = InjectorBuilder::new()
            .with_post_resolve_hook(move |_| counter.set(counter.get() + 1))
            .build();

        let component: AnyPtr = injector.retrieve_typed::<LimitedComponent>(&[]).unwrap();
        assert_eq!(calls.get(), 1);

        let half = injector
            .resolve_method(&component, "halve", vec![])
            .unwrap()
            .unwrap();
        assert_eq!(*half.downcast::<u32>().unwrap(), 5);
        assert_eq!(calls.get(), 2);

        assert!(injector
            .resolve_method(&component, "validate", vec![])
            .unwrap()
            .is_none());

        let component: AnyPtr = injector
            .resolve_typed::<LimitedComponent>(vec![param(7u32)])
            .unwrap();
        let calls_before = calls.get();
        assert!(matches!(
            injector.resolve_method(&component, "halve", vec![]),
            Err(InjectorError::Construction(_))
        ));
        assert_eq!(calls.get(), calls_before);
    }

    #[test]
    fn should_watch_declaration_markers() {
        let watcher = Rc::new(AttributeWatcher::default());
        let mut injector = InjectorBuilder::new()
            .with_observer(watcher.clone())
            .build();
        injector.alias(key_of::<dyn TestTrait>(), key_of::<TestDependency>());
        assert!(watcher.attributes().is_empty());

        injector.retrieve_typed::<TestDependency>(&[]).unwrap();
        assert_eq!(watcher.attributes(), vec!["abc", "def", "xyz"]);

        watcher.clear();
        assert!(watcher.attributes().is_empty());

        let component: AnyPtr = injector.retrieve_typed::<TestComponent>(&[]).unwrap();
        watcher.clear();

        injector
            .resolve_method(&component, "sum", vec![param(0i8)])
            .unwrap();
        assert_eq!(watcher.attributes(), vec!["One", "Two"]);
        assert!(watcher.has_attribute("One"));
    }
}
