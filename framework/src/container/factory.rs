//! Service factories and the capabilities they satisfy
//!
//! A [`ServiceFactory`] describes one way to build a service: its concrete type,
//! its name, whether it is a singleton, the capabilities it can be used as, and
//! a constructor that receives the [`Container`].
//!
//! Capabilities are declared explicitly. A factory for `PrintLog` only answers
//! `make::<dyn Log>()` if it was registered with a [`Support`] for `dyn Log`.

use crate::container::Container;
use crate::error::BoxError;
use crate::naming;
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// A constructed, type-erased service instance (an `Arc<S>` behind `dyn Any`)
pub type Instance = Arc<dyn Any + Send + Sync>;

type Constructor = Arc<dyn Fn(&Container) -> Result<Option<Instance>, BoxError> + Send + Sync>;

type Caster = Arc<dyn Fn(Instance) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Something a service can be resolved as
///
/// Implement this for the trait objects your services are looked up by, and for
/// concrete service types that should be resolvable directly. The config keys
/// are consulted when several factories support the same capability.
///
/// # Example
///
/// ```rust
/// use servicekit::Capability;
///
/// pub trait Log: Send + Sync {
///     fn log(&self, message: &str);
/// }
///
/// // `app.log` picks one, `app.logs` orders the array form
/// impl Capability for dyn Log {}
/// ```
pub trait Capability: Send + Sync + 'static {
    /// Key under the `app` config section naming the service to use
    fn config_key() -> Cow<'static, str> {
        Cow::Owned(naming::service_name_of::<Self>())
    }

    /// Key under the `app` config section listing the services for array requests
    fn config_plural_key() -> Cow<'static, str> {
        Cow::Owned(format!("{}s", Self::config_key()))
    }
}

/// Explicit tag for a capability type
#[derive(Clone, Copy)]
pub struct CapabilityId {
    type_id: TypeId,
    name: &'static str,
}

impl CapabilityId {
    /// Tag for the capability `C`
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: naming::short_type_name::<C>(),
        }
    }

    /// Short type name, used in diagnostics
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapabilityId").field(&self.name).finish()
    }
}

/// Identity of a factory's output: concrete type plus service name
///
/// Singleton instances are cached under this key.
#[derive(Clone)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Cow<'static, str>,
}

impl ServiceKey {
    fn new<S: 'static>(name: Cow<'static, str>) -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            type_name: naming::short_type_name::<S>(),
            name,
        }
    }

    /// The service name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short name of the concrete type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.type_name, self.name)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Declares that service `S` can be used as capability `C`
///
/// The cast is an ordinary unsizing coercion, so `|s| s` is all it takes.
///
/// # Example
///
/// ```rust,ignore
/// Support::<PrintLog>::of::<dyn Log, _>(|s| s)
/// ```
pub struct Support<S> {
    capability: CapabilityId,
    cast: Caster,
    _service: PhantomData<fn() -> S>,
}

impl<S: Send + Sync + 'static> Support<S> {
    /// Declare support for `C`, converting the built `Arc<S>` with `cast`
    pub fn of<C, F>(cast: F) -> Self
    where
        C: ?Sized + Capability,
        F: Fn(Arc<S>) -> Arc<C> + Send + Sync + 'static,
    {
        let cast: Caster = Arc::new(move |instance: Instance| {
            let concrete = instance.downcast::<S>().ok()?;
            Some(Box::new(cast(concrete)) as Box<dyn Any + Send + Sync>)
        });

        Self {
            capability: CapabilityId::of::<C>(),
            cast,
            _service: PhantomData,
        }
    }

    /// The capability this declaration covers
    pub fn capability(&self) -> CapabilityId {
        self.capability
    }

    fn identity() -> Self {
        Self {
            capability: CapabilityId::of::<S>(),
            cast: Arc::new(|instance: Instance| {
                let concrete = instance.downcast::<S>().ok()?;
                Some(Box::new(concrete) as Box<dyn Any + Send + Sync>)
            }),
            _service: PhantomData,
        }
    }
}

/// A service type that knows how to describe and build itself
///
/// Every method but [`make_service`](ServiceType::make_service) has a default,
/// and `#[derive(ServiceType)]` fills in the rest from `Default`.
///
/// # Example
///
/// ```rust,ignore
/// struct PrintLog;
///
/// impl Capability for PrintLog {}
///
/// impl ServiceType for PrintLog {
///     fn service_name() -> Cow<'static, str> {
///         "print".into()
///     }
///
///     fn service_supports() -> Vec<Support<Self>> {
///         vec![Support::<Self>::of::<dyn Log, _>(|s| s)]
///     }
///
///     fn make_service(_: &Container) -> Result<Self, BoxError> {
///         Ok(PrintLog)
///     }
/// }
/// ```
pub trait ServiceType: Capability + Sized {
    /// Name distinguishing this service among others of the same capability
    fn service_name() -> Cow<'static, str> {
        Cow::Owned(naming::service_name_of::<Self>())
    }

    /// If true, the service is built once per container
    fn service_is_singleton() -> bool {
        true
    }

    /// Capabilities, besides the type itself, this service can be resolved as
    fn service_supports() -> Vec<Support<Self>> {
        Vec::new()
    }

    /// Build a new instance using the container
    fn make_service(container: &Container) -> Result<Self, BoxError>;
}

/// A registered description of how to build one service
#[derive(Clone)]
pub struct ServiceFactory {
    key: ServiceKey,
    is_singleton: bool,
    supports: Vec<(CapabilityId, Caster)>,
    constructor: Constructor,
}

impl ServiceFactory {
    /// Start building a factory from a constructor
    ///
    /// # Example
    /// ```rust,ignore
    /// let factory = ServiceFactory::builder(|_| Ok(PrintLog))
    ///     .name("print")
    ///     .supports::<dyn Log, _>(|s| s)
    ///     .build();
    /// ```
    pub fn builder<S, F>(make: F) -> ServiceFactoryBuilder<S>
    where
        S: Send + Sync + 'static,
        F: Fn(&Container) -> Result<S, BoxError> + Send + Sync + 'static,
    {
        Self::builder_optional(move |container| make(container).map(Some))
    }

    /// Start building a factory whose constructor may decline to produce a service
    ///
    /// A constructor returning `Ok(None)` makes the request fail as unknown.
    pub fn builder_optional<S, F>(make: F) -> ServiceFactoryBuilder<S>
    where
        S: Send + Sync + 'static,
        F: Fn(&Container) -> Result<Option<S>, BoxError> + Send + Sync + 'static,
    {
        let constructor: Constructor = Arc::new(move |container: &Container| {
            Ok(make(container)?.map(|service| Arc::new(service) as Instance))
        });

        ServiceFactoryBuilder {
            name: None,
            singleton: None,
            supports: Vec::new(),
            constructor,
            _service: PhantomData,
        }
    }

    /// Factory for a [`ServiceType`]
    pub fn of<S: ServiceType>() -> Self {
        Self::builder(S::make_service)
            .name(S::service_name())
            .singleton(S::service_is_singleton())
            .supports_all(S::service_supports())
            .build()
    }

    /// Factory handing out an already built instance
    pub fn instance<S: Send + Sync + 'static>(
        name: impl Into<Cow<'static, str>>,
        service: S,
    ) -> ServiceFactoryBuilder<S> {
        let service = Arc::new(service);
        let constructor: Constructor =
            Arc::new(move |_: &Container| Ok(Some(service.clone() as Instance)));

        ServiceFactoryBuilder {
            name: Some(name.into()),
            singleton: Some(true),
            supports: Vec::new(),
            constructor,
            _service: PhantomData,
        }
    }

    /// The service name
    pub fn service_name(&self) -> &str {
        self.key.name()
    }

    /// Short name of the concrete type produced
    pub fn service_type_name(&self) -> &'static str {
        self.key.type_name()
    }

    /// Whether instances are cached for the container's lifetime
    pub fn is_singleton(&self) -> bool {
        self.is_singleton
    }

    /// Cache key of this factory's instances
    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    /// Whether this factory can be resolved as `capability`
    pub fn supports(&self, capability: &CapabilityId) -> bool {
        self.supports.iter().any(|(id, _)| id == capability)
    }

    /// Every capability this factory satisfies, the concrete type first
    pub fn capabilities(&self) -> impl Iterator<Item = &CapabilityId> {
        self.supports.iter().map(|(id, _)| id)
    }

    pub(crate) fn construct(&self, container: &Container) -> Result<Option<Instance>, BoxError> {
        (self.constructor)(container)
    }

    pub(crate) fn cast(
        &self,
        capability: &CapabilityId,
        instance: Instance,
    ) -> Option<Box<dyn Any + Send + Sync>> {
        let (_, cast) = self.supports.iter().find(|(id, _)| id == capability)?;
        cast(instance)
    }
}

impl fmt::Debug for ServiceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceFactory")
            .field("key", &self.key)
            .field("is_singleton", &self.is_singleton)
            .field("supports", &self.capabilities().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ServiceFactory`]
///
/// Unset fields take their defaults at [`build`](ServiceFactoryBuilder::build):
/// the name is derived from the type (`PrintLog` → `print-log`) and the
/// service is a singleton.
pub struct ServiceFactoryBuilder<S> {
    name: Option<Cow<'static, str>>,
    singleton: Option<bool>,
    supports: Vec<Support<S>>,
    constructor: Constructor,
    _service: PhantomData<fn() -> S>,
}

impl<S: Send + Sync + 'static> ServiceFactoryBuilder<S> {
    /// Override the service name
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set whether the service is built once per container
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = Some(singleton);
        self
    }

    /// Declare that the service can be resolved as `C`
    pub fn supports<C, F>(mut self, cast: F) -> Self
    where
        C: ?Sized + Capability,
        F: Fn(Arc<S>) -> Arc<C> + Send + Sync + 'static,
    {
        self.supports.push(Support::of::<C, F>(cast));
        self
    }

    /// Add several capability declarations at once
    pub fn supports_all(mut self, supports: impl IntoIterator<Item = Support<S>>) -> Self {
        self.supports.extend(supports);
        self
    }

    /// Build the factory
    pub fn build(self) -> ServiceFactory {
        let name = self
            .name
            .unwrap_or_else(|| Cow::Owned(naming::service_name_of::<S>()));

        let mut supports = vec![Support::<S>::identity()];
        for support in self.supports {
            if !supports.iter().any(|s| s.capability == support.capability) {
                supports.push(support);
            }
        }

        ServiceFactory {
            key: ServiceKey::new::<S>(name),
            is_singleton: self.singleton.unwrap_or(true),
            supports: supports.into_iter().map(|s| (s.capability, s.cast)).collect(),
            constructor: self.constructor,
        }
    }
}
