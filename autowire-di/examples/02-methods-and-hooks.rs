use autowire_di::injector::{InjectorBuilder, TypedInjector};
use autowire_di::instance::{key_of, param, InstancePtr};
use autowire_di::observer::AttributeWatcher;
use autowire_di::{contract, injectable, inspectable_methods, Inspectable};
use std::cell::RefCell;
use std::rc::Rc;

#[injectable]
trait Theme {
    fn is_dark(&self) -> bool;
}

#[derive(Inspectable)]
struct NightTheme;

#[contract]
impl Theme for NightTheme {
    fn is_dark(&self) -> bool {
        true
    }
}

#[derive(Inspectable)]
#[inspectable(markers = ["controller"])]
struct Greeter {
    theme: InstancePtr<dyn Theme>,
    #[inspectable(default)]
    greetings: RefCell<Vec<String>>,
}

fn default_name() -> String {
    "moon".to_string()
}

// all &self methods become callable by the injector, with their parameters autowired
#[inspectable_methods]
impl Greeter {
    #[inspectable(markers = ["action"])]
    fn greet(&self, #[inspectable(default = "default_name")] name: String) -> String {
        let greeting = format!(
            "{} {}",
            if self.theme.is_dark() {
                "dark"
            } else {
                "light"
            },
            name
        );
        self.greetings.borrow_mut().push(greeting.clone());
        greeting
    }

    // called right after construction, with its own parameters autowired
    fn resolve_with(&self, theme: Option<InstancePtr<dyn Theme>>) {
        if theme.is_some() {
            self.greetings.borrow_mut().push("resolved".to_string());
        }
    }
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    let watcher = Rc::new(AttributeWatcher::default());
    let mut injector = InjectorBuilder::new()
        .with_observer(watcher.clone())
        .build();

    injector.alias(key_of::<dyn Theme>(), key_of::<NightTheme>());

    // hooks see every freshly created instance
    injector.add_post_resolve_hook(|instance| {
        if let Some(greeter) = instance.downcast_ref::<Greeter>() {
            greeter.greetings.borrow_mut().push("hooked".to_string());
        }
    });

    // "Type:method" resolves the type and calls the method on it
    let greeting = injector
        .resolve(
            &format!("{}:greet", key_of::<Greeter>()),
            vec![param("apple".to_string())],
        )
        .unwrap()
        .unwrap();

    // prints "dark apple"
    println!("{}", greeting.downcast_ref::<String>().unwrap());

    let greeter = injector.retrieve_typed::<Greeter>(&[]).unwrap();
    // prints "["resolved", "hooked"]"
    println!("{:?}", greeter.greetings.borrow());

    // prints "["controller", "action", "controller"]"
    println!("{:?}", watcher.attributes());
}
