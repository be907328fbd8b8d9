use autowire_di::injector::{InjectorBuilder, TypedInjector};
use autowire_di::instance::{key_of, InstancePtr};
use autowire_di::{contract, injectable, Inspectable};

// this is a trait we would like to use in our type
#[injectable]
trait TestTrait {
    fn foo(&self);
}

// this is a dependency which implements the above trait and can be constructed by the injector
#[derive(Inspectable)]
struct TestDependency;

// we're telling the injector TestDependency can be used where dyn TestTrait is expected
#[contract]
impl TestTrait for TestDependency {
    fn foo(&self) {
        println!("Hello world!");
    }
}

// this is another type, but with a dependency
#[derive(Inspectable)]
struct TestComponent {
    // the injector will retrieve whatever is bound to dyn TestTrait, when asked for TestComponent
    dependency: InstancePtr<dyn TestTrait>,
    // alternatively, you can inject the concrete type
    // dependency: InstancePtr<TestDependency>,
}

impl TestComponent {
    fn call_foo(&self) {
        self.dependency.foo();
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // for convenience, InjectorBuilder can be used to create the injector with all types
    // registered by the derive macros and a reasonable default configuration
    let mut injector = InjectorBuilder::new().build();

    // traits are abstract keys - we need to tell the injector what to use for them
    injector.alias(key_of::<dyn TestTrait>(), key_of::<TestDependency>());

    let component = injector
        .retrieve_typed::<TestComponent>(&[])
        .expect("error creating TestComponent");

    // prints "Hello world!"
    component.call_foo();
}
