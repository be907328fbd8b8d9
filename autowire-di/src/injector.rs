//! Core functionality for retrieving and resolving instances.
//!
//! An [Injector] combines a [BindingRegistry] with a [TypeCatalog]. Retrieving a key checks, in
//! order: a shared instance, a factory, an alias and finally a type known under that key, which
//! gets constructed with its constructor parameters autowired.
//!
//! Note: there is no dependency cycle detection. A dependency chain which leads back to itself
//! recurses until the stack overflows, which aborts the process.

use crate::binding::{BindingRegistry, BindingTarget, Generator, Mode, PostResolveHook};
use crate::config::{ConfigError, InjectorConfig};
use crate::error::InjectorError;
use crate::factory::DependencyFactory;
use crate::inspectable::{
    Arguments, Constructible, Declaration, MethodDeclaration, Parameter, TypeToken, RESOLVE_WITH,
};
use crate::instance::{key_of, AnyPtr, Injectable, InstancePtr, Key};
use crate::interrupt::ReflectionInterruptPtr;
use crate::observer::ReflectionObserverPtr;
use crate::type_catalog::{StaticTypeCatalog, TypeCatalog, TypedTypeCatalog};
use fxhash::FxHashSet;
use itertools::Itertools;
use std::rc::Rc;
use tracing::{debug, trace};

pub type TypeCatalogPtr = Box<dyn TypeCatalog>;

/// A single request for [Injector::retrieve_all].
#[derive(Clone, Debug)]
pub enum RetrieveRequest {
    Key(Key),
    WithParameters(Key, Vec<AnyPtr>),
}

impl From<&str> for RetrieveRequest {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<String> for RetrieveRequest {
    fn from(value: String) -> Self {
        Self::Key(value)
    }
}

impl<K: Into<Key>> From<(K, Vec<AnyPtr>)> for RetrieveRequest {
    fn from((key, params): (K, Vec<AnyPtr>)) -> Self {
        Self::WithParameters(key.into(), params)
    }
}

/// Builder for [Injector] with sensible defaults, for easy construction.
pub struct InjectorBuilder {
    catalog: TypeCatalogPtr,
    config: InjectorConfig,
    hooks: Vec<PostResolveHook>,
    observers: Vec<ReflectionObserverPtr>,
    interrupt: Option<ReflectionInterruptPtr>,
}

impl Default for InjectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InjectorBuilder {
    /// Creates a new builder with a default configuration and all statically registered types.
    pub fn new() -> Self {
        Self {
            catalog: Box::new(StaticTypeCatalog::new()),
            config: Default::default(),
            hooks: vec![],
            observers: vec![],
            interrupt: None,
        }
    }

    /// Creates a new builder with configuration read from the environment.
    pub fn from_environment() -> Result<Self, ConfigError> {
        InjectorConfig::init_from_environment().map(|config| Self::new().with_config(config))
    }

    /// Sets new [TypeCatalog].
    pub fn with_catalog(mut self, catalog: TypeCatalogPtr) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: InjectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a new post-resolve hook.
    pub fn with_post_resolve_hook<F: Fn(&AnyPtr) + 'static>(mut self, hook: F) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Adds a new observer.
    pub fn with_observer(mut self, observer: ReflectionObserverPtr) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn with_interrupt(mut self, interrupt: ReflectionInterruptPtr) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    /// Builds resulting [Injector].
    pub fn build(self) -> Injector {
        let mut injector = Injector::new(self.catalog, self.config);
        for hook in self.hooks {
            injector.registry.add_post_resolve_hook(hook);
        }

        injector.observers = self.observers;
        injector.interrupt = self.interrupt;
        injector
    }
}

/// Registry of bindings able to retrieve instances for keys and autowire dependencies of
/// constructed types and called methods. See module documentation for the resolution order.
pub struct Injector {
    registry: BindingRegistry,
    catalog: TypeCatalogPtr,
    config: InjectorConfig,
    observers: Vec<ReflectionObserverPtr>,
    interrupt: Option<ReflectionInterruptPtr>,
    // keys of services used by delegate factories
    factory_services: FxHashSet<Key>,
}

impl Default for Injector {
    fn default() -> Self {
        InjectorBuilder::new().build()
    }
}

impl Injector {
    pub fn new(catalog: TypeCatalogPtr, config: InjectorConfig) -> Self {
        Self {
            registry: Default::default(),
            catalog,
            config,
            observers: vec![],
            interrupt: None,
            factory_services: Default::default(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    #[inline]
    pub fn catalog(&self) -> &dyn TypeCatalog {
        self.catalog.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    /// Binds a factory closure, called with explicit parameters, to given key.
    pub fn register_factory<K, F>(&mut self, key: K, generator: F, mode: Mode)
    where
        K: Into<Key>,
        F: Fn(&[AnyPtr]) -> Option<AnyPtr> + 'static,
    {
        self.registry
            .register_factory(key, Generator::Closure(Rc::new(generator)), mode);
    }

    /// Binds a [DependencyFactory] retrieved under `factory_key` to given key. The factory service
    /// is built once and shared under `factory_key`, whether it is first retrieved directly or
    /// through the delegation.
    pub fn register_factory_delegate<K: Into<Key>, F: Into<Key>>(
        &mut self,
        key: K,
        factory_key: F,
        mode: Mode,
    ) {
        let factory_key = factory_key.into();
        self.factory_services.insert(factory_key.clone());
        self.registry
            .register_factory(key, Generator::Delegate(factory_key), mode);
    }

    #[inline]
    pub fn remove_factory(&mut self, key: &str) {
        self.registry.remove_factory(key);
    }

    /// See [BindingRegistry::share].
    #[inline]
    pub fn share<K: Into<Key>, T: Into<Option<BindingTarget>>>(
        &mut self,
        key: K,
        target: T,
        mode: Mode,
    ) {
        self.registry.share(key, target, mode);
    }

    #[inline]
    pub fn remove_shared(&mut self, key: &str) {
        self.registry.remove_shared(key);
    }

    #[inline]
    pub fn has_shared(&self, key: &str, mode: Option<Mode>) -> bool {
        self.registry.has_shared(key, mode)
    }

    /// See [BindingRegistry::is_available].
    #[inline]
    pub fn is_available(&self, key: &str, shared: Option<bool>) -> bool {
        self.registry.is_available(key, shared)
    }

    /// Aliases `from` to `to`, with strictness taken from the config.
    #[inline]
    pub fn alias<F: Into<Key>, T: Into<Key>>(&mut self, from: F, to: T) {
        self.registry.alias(from, to, self.config.strict_aliases);
    }

    #[inline]
    pub fn alias_with<F: Into<Key>, T: Into<Key>>(&mut self, from: F, to: T, strict: bool) {
        self.registry.alias(from, to, strict);
    }

    /// Adds a hook called with every freshly created instance. Hooks are not called for
    /// instances returned from the shared cache.
    pub fn add_post_resolve_hook<F: Fn(&AnyPtr) + 'static>(&mut self, hook: F) {
        self.registry.add_post_resolve_hook(Box::new(hook));
    }

    pub fn add_observer(&mut self, observer: ReflectionObserverPtr) {
        self.observers.push(observer);
    }

    pub fn set_interrupt(&mut self, interrupt: ReflectionInterruptPtr) {
        self.interrupt = Some(interrupt);
    }

    /// Retrieves an instance for given key, using shared instances according to the config.
    #[inline]
    pub fn retrieve(&mut self, key: &str, params: &[AnyPtr]) -> Result<AnyPtr, InjectorError> {
        self.retrieve_with(key, params, self.config.use_shared)
    }

    /// Retrieves an instance for given key. With `use_shared` set, existing shared instances are
    /// returned and factory results get cached as new shared instances.
    pub fn retrieve_with(
        &mut self,
        key: &str,
        params: &[AnyPtr],
        use_shared: bool,
    ) -> Result<AnyPtr, InjectorError> {
        trace!("Retrieving: {}", key);

        if use_shared {
            if let Some(shared) = self.registry.shared(key) {
                return match &shared.target {
                    BindingTarget::Instance(instance) => Ok(instance.clone()),
                    BindingTarget::Type(token) => {
                        self.construct(token, params.iter().cloned().map(Some).collect())
                    }
                };
            }
        }

        if let Some(factory) = self.registry.factory(key).cloned() {
            let instance = self
                .generate(key, &factory.generator, params)?
                .ok_or_else(|| InjectorError::NotFound(key.to_string()))?;

            self.registry.post_resolve(&instance);

            if use_shared {
                self.registry.share(
                    key,
                    BindingTarget::Instance(instance.clone()),
                    factory.mode,
                );
            }

            return Ok(instance);
        }

        if let Some(alias) = self.registry.alias_target(key).cloned() {
            trace!("Following alias {} to: {}", key, alias.target);

            let instance = self.retrieve_with(&alias.target, params, use_shared)?;
            if alias.strict && !self.catalog.satisfies(key, &instance) {
                return Err(InjectorError::BindingMismatch(key.to_string()));
            }

            self.share_factory_service(key, &instance, use_shared);
            return Ok(instance);
        }

        if self.catalog.is_constructible(key) {
            let instance = self.resolve_object(key, params.to_vec())?;
            self.share_factory_service(key, &instance, use_shared);
            return Ok(instance);
        }

        Err(InjectorError::NotFound(key.to_string()))
    }

    fn share_factory_service(&mut self, key: &str, instance: &AnyPtr, use_shared: bool) {
        if use_shared && self.factory_services.contains(key) {
            debug!("Sharing factory service: {}", key);
            self.registry
                .share(key, BindingTarget::Instance(instance.clone()), Mode::Mutable);
        }
    }

    /// Retrieves instances for all requests, in order, using shared instances according to the
    /// config. The first error is returned immediately.
    #[inline]
    pub fn retrieve_all<I, R>(&mut self, requests: I) -> Result<Vec<AnyPtr>, InjectorError>
    where
        I: IntoIterator<Item = R>,
        R: Into<RetrieveRequest>,
    {
        self.retrieve_all_with(requests, self.config.use_shared)
    }

    /// Retrieves instances for all requests, in order, with the same sharing rules as
    /// [Injector::retrieve_with].
    pub fn retrieve_all_with<I, R>(
        &mut self,
        requests: I,
        use_shared: bool,
    ) -> Result<Vec<AnyPtr>, InjectorError>
    where
        I: IntoIterator<Item = R>,
        R: Into<RetrieveRequest>,
    {
        requests
            .into_iter()
            .map(|request| {
                let request: RetrieveRequest = request.into();
                match request {
                    RetrieveRequest::Key(key) => self.retrieve_with(&key, &[], use_shared),
                    RetrieveRequest::WithParameters(key, params) => {
                        self.retrieve_with(&key, &params, use_shared)
                    }
                }
            })
            .try_collect()
    }

    /// Computes final arguments for given declared parameters. When explicit parameters cover
    /// all declared ones, they are used as they are. Otherwise, dependencies are autowired and
    /// explicit parameters are appended after them.
    pub fn resolve_parameters(
        &mut self,
        parameters: &[Parameter],
        params: Vec<AnyPtr>,
    ) -> Result<Vec<Option<AnyPtr>>, InjectorError> {
        if parameters.len() <= params.len() {
            return Ok(params.into_iter().map(Some).collect());
        }

        let mut arguments = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let Some(key) = parameter.autowired_type() else {
                continue;
            };

            match self.retrieve(key, &[]) {
                Ok(instance) => arguments.push(Some(instance)),
                Err(error) if parameter.nullable => {
                    debug!(
                        "Injecting nothing for optional parameter {} of type {}: {}",
                        parameter.name, key, error
                    );
                    arguments.push(None);
                }
                Err(error) => return Err(error),
            }
        }

        arguments.extend(params.into_iter().map(Some));
        Ok(arguments)
    }

    /// Constructs a type known under given key, autowiring its constructor.
    pub fn resolve_object(
        &mut self,
        key: &str,
        params: Vec<AnyPtr>,
    ) -> Result<AnyPtr, InjectorError> {
        let token = self
            .catalog
            .type_token(key)
            .ok_or_else(|| InjectorError::NotFound(key.to_string()))?;

        self.resolve_token(&token, params)
    }

    fn resolve_token(
        &mut self,
        token: &TypeToken,
        params: Vec<AnyPtr>,
    ) -> Result<AnyPtr, InjectorError> {
        trace!("Resolving type: {}", token.name);

        self.notify(|| Declaration::Type(token.clone()));

        let interrupted = self
            .interrupt
            .as_ref()
            .and_then(|interrupt| interrupt.interrupt_type(token));

        let instance = if let Some(instance) = interrupted {
            debug!("Construction of {} interrupted", token.name);
            instance
        } else {
            let arguments = match &token.constructor {
                Some(parameters) => self.resolve_parameters(parameters, params)?,
                None => vec![],
            };

            let instance = self.construct(token, arguments)?;
            self.resolved(instance)?
        };

        self.registry.post_resolve(&instance);
        Ok(instance)
    }

    /// Calls a method on given instance, autowiring its parameters.
    pub fn resolve_method(
        &mut self,
        instance: &AnyPtr,
        method: &str,
        params: Vec<AnyPtr>,
    ) -> Result<Option<AnyPtr>, InjectorError> {
        let type_id = (**instance).type_id();
        let declaration =
            self.catalog
                .method(type_id, method)
                .ok_or_else(|| InjectorError::UnknownMethod {
                    type_id,
                    method: method.to_string(),
                })?;

        let result = self.call(instance, &declaration, params)?;
        if let Some(result) = &result {
            self.registry.post_resolve(result);
        }

        Ok(result)
    }

    /// Resolves either a type key or a `Type:method` key, in which case the method is called on a
    /// newly resolved instance of the type.
    pub fn resolve(
        &mut self,
        key: &str,
        params: Vec<AnyPtr>,
    ) -> Result<Option<AnyPtr>, InjectorError> {
        if let Some((type_key, method)) = split_method(key) {
            let instance = self.resolve_object(type_key, vec![])?;
            return self.resolve_method(&instance, method, params);
        }

        self.resolve_object(key, params).map(Some)
    }

    /// Autowires and calls the `resolve_with` method of an existing instance, if declared.
    pub fn resolved(&mut self, instance: AnyPtr) -> Result<AnyPtr, InjectorError> {
        if let Some(declaration) = self.catalog.method((*instance).type_id(), RESOLVE_WITH) {
            self.call(&instance, &declaration, vec![])?;
        }

        Ok(instance)
    }

    fn call(
        &mut self,
        instance: &AnyPtr,
        declaration: &MethodDeclaration,
        params: Vec<AnyPtr>,
    ) -> Result<Option<AnyPtr>, InjectorError> {
        trace!("Calling method: {}", declaration.name);

        self.notify(|| Declaration::Method(declaration.clone()));

        if let Some(result) = self
            .interrupt
            .as_ref()
            .and_then(|interrupt| interrupt.interrupt_method(instance, declaration))
        {
            debug!("Call to {} interrupted", declaration.name);
            return Ok(result);
        }

        let arguments = self.resolve_parameters(&declaration.parameters, params)?;
        (declaration.invoke)(
            instance,
            &mut Arguments::new(arguments, self.catalog.as_ref()),
        )
    }

    fn construct(
        &self,
        token: &TypeToken,
        arguments: Vec<Option<AnyPtr>>,
    ) -> Result<AnyPtr, InjectorError> {
        (token.construct)(&mut Arguments::new(arguments, self.catalog.as_ref()))
    }

    fn generate(
        &mut self,
        key: &str,
        generator: &Generator,
        params: &[AnyPtr],
    ) -> Result<Option<AnyPtr>, InjectorError> {
        match generator {
            Generator::Closure(generator) => Ok(generator(params)),
            Generator::Delegate(factory_key) => {
                let factory = self.retrieve_with(factory_key, &[], true)?;
                let factory = self
                    .catalog
                    .cast_typed::<dyn DependencyFactory>(&factory)
                    .ok_or_else(|| InjectorError::IncompatibleInstance(factory_key.clone()))?;

                Ok(factory.generate(key, params))
            }
        }
    }

    fn notify<F: FnOnce() -> Declaration>(&self, declaration: F) {
        if self.observers.is_empty() {
            return;
        }

        let declaration = declaration();
        for observer in &self.observers {
            observer.observe(&declaration);
        }
    }
}

/// Splits `Type:method` keys. Double colons are treated as path separators, not method
/// separators.
fn split_method(key: &str) -> Option<(&str, &str)> {
    let (type_key, method) = key.rsplit_once(':')?;
    if type_key.is_empty() || type_key.ends_with(':') || method.is_empty() {
        None
    } else {
        Some((type_key, method))
    }
}

/// Helper trait for [Injector] providing strongly-typed access.
pub trait TypedInjector {
    /// Typesafe version of [Injector::retrieve] for types bound under [key_of].
    fn retrieve_typed<T: Injectable + ?Sized>(
        &mut self,
        params: &[AnyPtr],
    ) -> Result<InstancePtr<T>, InjectorError>;

    /// Typesafe version of [Injector::resolve_object], which doesn't require `T` to be registered
    /// in the catalog.
    fn resolve_typed<T: Constructible>(
        &mut self,
        params: Vec<AnyPtr>,
    ) -> Result<InstancePtr<T>, InjectorError>;

    /// Casts an instance using the contract of `T`.
    fn cast<T: Injectable + ?Sized>(&self, instance: &AnyPtr)
        -> Result<InstancePtr<T>, InjectorError>;
}

impl TypedInjector for Injector {
    fn retrieve_typed<T: Injectable + ?Sized>(
        &mut self,
        params: &[AnyPtr],
    ) -> Result<InstancePtr<T>, InjectorError> {
        self.retrieve(key_of::<T>(), params)
            .and_then(|instance| self.cast(&instance))
    }

    fn resolve_typed<T: Constructible>(
        &mut self,
        params: Vec<AnyPtr>,
    ) -> Result<InstancePtr<T>, InjectorError> {
        self.resolve_token(&TypeToken::of::<T>(), params)
            .and_then(|instance| {
                instance
                    .downcast::<T>()
                    .map_err(|_| InjectorError::IncompatibleInstance(key_of::<T>().to_string()))
            })
    }

    fn cast<T: Injectable + ?Sized>(
        &self,
        instance: &AnyPtr,
    ) -> Result<InstancePtr<T>, InjectorError> {
        self.catalog
            .cast_typed(instance)
            .ok_or_else(|| InjectorError::IncompatibleInstance(key_of::<T>().to_string()))
    }
}
