//! Bindings associate abstract keys with ways of obtaining instances. Each key can have at most
//! one factory, one shared instance and one alias at the same time; the
//! [Injector](crate::injector::Injector) decides which one wins.
//!
//! Shared instances and factory results carry a [Mode]. An [Immutable](Mode::Immutable) shared
//! instance is write-once - it can never be replaced or removed. Factories themselves are never
//! protected and can always be replaced, even if they produce immutable instances.

use crate::inspectable::{Constructible, TypeToken};
use crate::instance::{AnyPtr, InstancePtr, Key};
use derivative::Derivative;
use fxhash::FxHashMap;
use std::any::Any;
use std::rc::Rc;
use tracing::debug;

/// Write policy for shared instances.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Mode {
    #[default]
    Mutable,
    Immutable,
}

pub type GeneratorFn = dyn Fn(&[AnyPtr]) -> Option<AnyPtr>;

pub type PostResolveHook = Box<dyn Fn(&AnyPtr)>;

/// Source of instances for a factory binding.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub enum Generator {
    /// Closure called with explicit parameters.
    Closure(#[derivative(Debug = "ignore")] Rc<GeneratorFn>),
    /// Key of a [DependencyFactory](crate::factory::DependencyFactory) which should generate
    /// instances.
    Delegate(Key),
}

#[derive(Clone, Debug)]
pub struct FactoryBinding {
    pub generator: Generator,
    /// Mode used when caching generated instances.
    pub mode: Mode,
}

/// Value bound as a shared instance.
#[derive(Clone, Debug)]
pub enum BindingTarget {
    /// Live instance returned as-is.
    Instance(AnyPtr),
    /// Type constructed anew from explicit parameters on each retrieval.
    Type(TypeToken),
}

impl BindingTarget {
    #[inline]
    pub fn instance<T: Any>(instance: InstancePtr<T>) -> Self {
        Self::Instance(instance)
    }

    #[inline]
    pub fn of_type<T: Constructible>() -> Self {
        Self::Type(TypeToken::of::<T>())
    }
}

#[derive(Clone, Debug)]
pub struct SharedInstance {
    pub target: BindingTarget,
    pub mode: Mode,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AliasBinding {
    pub target: Key,
    /// Should the resolved instance satisfy the contract of the aliased key.
    pub strict: bool,
}

/// Storage for all bindings and post-resolve hooks.
#[derive(Default, Derivative)]
#[derivative(Debug)]
pub struct BindingRegistry {
    factories: FxHashMap<Key, FactoryBinding>,
    instances: FxHashMap<Key, SharedInstance>,
    aliases: FxHashMap<Key, AliasBinding>,
    #[derivative(Debug = "ignore")]
    hooks: Vec<PostResolveHook>,
}

impl BindingRegistry {
    /// Binds a factory to given key, replacing any previous one.
    pub fn register_factory<K: Into<Key>>(&mut self, key: K, generator: Generator, mode: Mode) {
        let key = key.into();
        debug!("Registering {:?} factory for: {}", mode, key);
        self.factories.insert(key, FactoryBinding { generator, mode });
    }

    pub fn remove_factory(&mut self, key: &str) {
        self.factories.remove(key);
    }

    /// Binds a shared instance to given key. Does nothing for `None` or when an immutable
    /// instance is already bound.
    pub fn share<K: Into<Key>, T: Into<Option<BindingTarget>>>(
        &mut self,
        key: K,
        target: T,
        mode: Mode,
    ) {
        let target: Option<BindingTarget> = target.into();
        let Some(target) = target else {
            return;
        };

        let key = key.into();
        if self.has_shared(&key, Some(Mode::Immutable)) {
            debug!("Ignoring attempt to replace immutable instance: {}", key);
            return;
        }

        debug!("Sharing {:?} instance as: {}", mode, key);
        self.instances.insert(key, SharedInstance { target, mode });
    }

    /// Removes a mutable shared instance. Immutable instances are left intact.
    pub fn remove_shared(&mut self, key: &str) {
        if self.has_shared(key, Some(Mode::Mutable)) {
            self.instances.remove(key);
        }
    }

    /// Checks if a shared instance exists, optionally with given mode.
    pub fn has_shared(&self, key: &str, mode: Option<Mode>) -> bool {
        self.instances
            .get(key)
            .map(|instance| mode.map(|mode| instance.mode == mode).unwrap_or(true))
            .unwrap_or(false)
    }

    /// With `shared` set to `Some(false)` checks only for a factory, otherwise checks for either
    /// a factory or a shared instance.
    pub fn is_available(&self, key: &str, shared: Option<bool>) -> bool {
        self.factories.contains_key(key)
            || (shared != Some(false) && self.instances.contains_key(key))
    }

    /// Redirects resolution of `from` to `to`. Aliasing a key to itself does nothing.
    pub fn alias<F: Into<Key>, T: Into<Key>>(&mut self, from: F, to: T, strict: bool) {
        let (from, to) = (from.into(), to.into());
        if from == to {
            return;
        }

        debug!("Aliasing {} to: {}", from, to);
        self.aliases.insert(from, AliasBinding { target: to, strict });
    }

    pub fn add_post_resolve_hook(&mut self, hook: PostResolveHook) {
        self.hooks.push(hook);
    }

    #[inline]
    pub fn shared(&self, key: &str) -> Option<&SharedInstance> {
        self.instances.get(key)
    }

    #[inline]
    pub fn factory(&self, key: &str) -> Option<&FactoryBinding> {
        self.factories.get(key)
    }

    #[inline]
    pub fn alias_target(&self, key: &str) -> Option<&AliasBinding> {
        self.aliases.get(key)
    }

    /// Passes a freshly created instance through all post-resolve hooks, in registration order.
    pub fn post_resolve(&self, instance: &AnyPtr) {
        for hook in &self.hooks {
            hook(instance);
        }
    }
}
