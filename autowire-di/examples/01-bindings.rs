use autowire_di::binding::{BindingTarget, Mode};
use autowire_di::injector::{InjectorBuilder, TypedInjector};
use autowire_di::instance::{key_of, param, AnyPtr, InstancePtr};
use autowire_di::{contract, injectable, Inspectable};
use std::cell::Cell;

#[injectable]
trait Counter {
    fn next(&self) -> usize;
}

#[derive(Inspectable)]
struct SimpleCounter {
    // built-in values are never autowired - they need to be passed explicitly or defaulted
    #[inspectable(default)]
    current: Cell<usize>,
}

#[contract]
impl Counter for SimpleCounter {
    fn next(&self) -> usize {
        self.current.set(self.current.get() + 1);
        self.current.get()
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let mut injector = InjectorBuilder::new().build();

    // shared instances are returned as-is on every retrieval
    injector.share(
        "counter",
        BindingTarget::instance(InstancePtr::new(SimpleCounter {
            current: Cell::new(10),
        })),
        Mode::Mutable,
    );
    injector.alias(key_of::<dyn Counter>(), "counter");

    let counter = injector.retrieve_typed::<dyn Counter>(&[]).unwrap();
    // prints "11 12"
    println!("{} {}", counter.next(), counter.next());

    // immutable instances cannot be replaced nor removed
    injector.share(
        "limit",
        BindingTarget::Instance(param(100usize)),
        Mode::Immutable,
    );
    injector.share(
        "limit",
        BindingTarget::Instance(param(5usize)),
        Mode::Mutable,
    );
    injector.remove_shared("limit");

    let limit = injector.retrieve("limit", &[]).unwrap();
    // prints "100"
    println!("{}", limit.downcast_ref::<usize>().unwrap());

    // factories receive explicit parameters; their results become shared instances, unless
    // retrieved without sharing
    injector.register_factory(
        "sum",
        |params: &[AnyPtr]| {
            Some(param(
                params
                    .iter()
                    .filter_map(|param| param.downcast_ref::<usize>())
                    .sum::<usize>(),
            ))
        },
        Mode::Mutable,
    );

    let fresh = injector
        .retrieve_with("sum", &[param(1usize), param(2usize)], false)
        .unwrap();
    let cached = injector.retrieve("sum", &[param(5usize)]).unwrap();
    let again = injector.retrieve("sum", &[param(4usize)]).unwrap();

    // prints "3 5 5"
    println!(
        "{} {} {}",
        fresh.downcast_ref::<usize>().unwrap(),
        cached.downcast_ref::<usize>().unwrap(),
        again.downcast_ref::<usize>().unwrap()
    );
}
