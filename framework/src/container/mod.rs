//! The service container
//!
//! This module provides Vapor-style lazy service resolution:
//! - Factories: registered descriptions of how to build a service
//! - Capabilities: trait objects (or concrete types) services are resolved as
//! - Disambiguation: config picks among several services of one capability
//! - Singletons: built once per container, on first resolution
//! - Providers: register services and hook into a two-phase boot
//!
//! # Example
//!
//! ```rust,ignore
//! use servicekit::{Config, Container, Environment, Services};
//!
//! let mut services = Services::new();
//! services.register::<PrintLog>();
//! services.register::<AllCapsLog>();
//!
//! let mut config = Config::new();
//! config.set("app", "log", "all-caps");
//!
//! let container = Container::new(config, Environment::detect(), services);
//! let log: Arc<dyn Log> = container.make::<dyn Log>()?;
//! let logs: Vec<Arc<dyn Log>> = container.make_all::<dyn Log>()?;
//! ```

pub mod factory;
pub mod provider;
pub mod resolver;
pub mod services;
pub mod testing;

use crate::config::{Config, Environment};
use crate::error::{ServiceError, ServiceResult};
use factory::{Capability, CapabilityId, Instance, ServiceFactory, ServiceKey};
use resolver::Resolver;
pub use services::Services;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock, TryLockError};
use std::thread::{self, ThreadId};
use tracing::{debug, trace};

/// Global application container
static APP_CONTAINER: OnceLock<Arc<Container>> = OnceLock::new();

// Thread-local test overrides for isolated testing
thread_local! {
    pub(crate) static TEST_CONTAINER: RefCell<Option<Arc<Container>>> = const { RefCell::new(None) };
}

// Services under construction on this thread, tagged with their container
thread_local! {
    static RESOLVING: RefCell<Vec<(usize, ServiceKey)>> = const { RefCell::new(Vec::new()) };
}

/// Lifecycle of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Providers' boot hooks are still running; services can be resolved
    Booting,
    /// Boot completed
    Ready,
    /// Boot aborted; every resolution fails
    Failed,
}

type Slot = Arc<Mutex<Option<Instance>>>;

/// Singleton instances keyed by (concrete type, service name)
///
/// Each key gets its own slot, locked for the duration of construction, so
/// concurrent first resolutions build the instance at most once. Slot holders
/// and waiters are tracked so a thread about to wait on a slot held by a
/// thread that (transitively) waits on it gets a circular dependency error.
#[derive(Default)]
struct SingletonCache {
    slots: RwLock<HashMap<ServiceKey, Slot>>,
    ownership: Mutex<Ownership>,
}

/// Which thread holds each locked slot, and which slot each thread waits on
#[derive(Default)]
struct Ownership {
    owners: HashMap<ServiceKey, ThreadId>,
    waiting: HashMap<ThreadId, ServiceKey>,
}

impl Ownership {
    /// Keys from `key` back to one held by `me`, if waiting on `key` would never end
    fn cycle(&self, me: ThreadId, key: &ServiceKey) -> Option<Vec<String>> {
        let mut chain = vec![key.to_string()];
        let mut wanted = key;

        for _ in 0..=self.waiting.len() {
            let owner = self.owners.get(wanted)?;
            if *owner == me {
                chain.push(key.to_string());
                return Some(chain);
            }
            wanted = self.waiting.get(owner)?;
            chain.push(wanted.to_string());
        }
        None
    }
}

/// Releases a thread's ownership of a slot when dropped
struct SlotOwner<'c> {
    cache: &'c SingletonCache,
    key: ServiceKey,
    thread: ThreadId,
}

impl Drop for SlotOwner<'_> {
    fn drop(&mut self) {
        let mut ownership = self.cache.ownership();
        // The slot may already belong to the next thread
        if ownership.owners.get(&self.key) == Some(&self.thread) {
            ownership.owners.remove(&self.key);
        }
    }
}

impl SingletonCache {
    fn slot(&self, key: &ServiceKey) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return slot.clone();
        }

        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone()
    }

    fn ownership(&self) -> MutexGuard<'_, Ownership> {
        self.ownership.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock `slot` for the current thread
    ///
    /// Fails instead of blocking when the holder is, directly or through other
    /// threads, waiting on a slot this thread holds.
    fn lock<'c, 's>(
        &'c self,
        key: &ServiceKey,
        slot: &'s Slot,
    ) -> ServiceResult<(MutexGuard<'s, Option<Instance>>, SlotOwner<'c>)> {
        let me = thread::current().id();
        let owner = || SlotOwner {
            cache: self,
            key: key.clone(),
            thread: me,
        };

        {
            let mut ownership = self.ownership();
            let free = match slot.try_lock() {
                Ok(cached) => Some(cached),
                Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => None,
            };

            if let Some(cached) = free {
                ownership.owners.insert(key.clone(), me);
                return Ok((cached, owner()));
            }

            if let Some(chain) = ownership.cycle(me, key) {
                return Err(ServiceError::CircularDependency { chain });
            }
            ownership.waiting.insert(me, key.clone());
        }

        let cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let mut ownership = self.ownership();
        ownership.waiting.remove(&me);
        ownership.owners.insert(key.clone(), me);
        drop(ownership);

        Ok((cached, owner()))
    }

    fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.try_lock().map(|s| s.is_some()).unwrap_or(false))
            .count()
    }
}

/// Marks a service as under construction on this thread until dropped
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(container: &Container, key: &ServiceKey) -> ServiceResult<Self> {
        let id = container as *const Container as usize;

        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack.iter().position(|(c, k)| *c == id && k == key) {
                let chain = stack[start..]
                    .iter()
                    .map(|(_, k)| k.to_string())
                    .chain(std::iter::once(key.to_string()))
                    .collect();
                return Err(ServiceError::CircularDependency { chain });
            }
            stack.push((id, key.clone()));
            Ok(ResolutionGuard)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// The service container
///
/// Owns the frozen registry, the configuration used to disambiguate requests,
/// the environment providers detected, and the singleton cache.
pub struct Container {
    config: Config,
    environment: Environment,
    services: Services,
    singletons: SingletonCache,
    state: RwLock<ContainerState>,
}

impl Container {
    /// Create a ready container over a registry
    ///
    /// Providers still queued in `services` are not run; boot them through
    /// [`Application`](crate::Application) instead.
    pub fn new(config: Config, environment: Environment, services: Services) -> Self {
        Self::with_state(config, environment, services, ContainerState::Ready)
    }

    pub(crate) fn booting(config: Config, environment: Environment, services: Services) -> Self {
        Self::with_state(config, environment, services, ContainerState::Booting)
    }

    fn with_state(
        config: Config,
        environment: Environment,
        services: Services,
        state: ContainerState,
    ) -> Self {
        if services.provider_count() > 0 {
            tracing::warn!(
                providers = services.provider_count(),
                "Container created with unbooted providers; they will not run"
            );
        }

        Self {
            config,
            environment,
            services,
            singletons: SingletonCache::default(),
            state: RwLock::new(state),
        }
    }

    /// Resolve a single service usable as `C`
    ///
    /// # Example
    /// ```rust,ignore
    /// let log: Arc<dyn Log> = container.make::<dyn Log>()?;
    /// let caps: Arc<AllCapsLog> = container.make::<AllCapsLog>()?;
    /// ```
    pub fn make<C: ?Sized + Capability>(&self) -> ServiceResult<Arc<C>> {
        self.make_one::<C>(None)
    }

    /// Resolve the service named `name` usable as `C`
    pub fn make_named<C: ?Sized + Capability>(&self, name: &str) -> ServiceResult<Arc<C>> {
        self.make_one::<C>(Some(name))
    }

    /// Resolve every service usable as `C`
    ///
    /// Order follows `app.<plural key>` when configured, registration order
    /// otherwise. Each service is still subject to singleton caching.
    pub fn make_all<C: ?Sized + Capability>(&self) -> ServiceResult<Vec<Arc<C>>> {
        self.ensure_usable()?;
        let capability = CapabilityId::of::<C>();

        self.resolver()
            .all::<C>()?
            .into_iter()
            .map(|factory| self.build::<C>(&capability, factory))
            .collect()
    }

    /// Check if any registered service is usable as `C`
    pub fn supports<C: ?Sized + Capability>(&self) -> bool {
        !self
            .services
            .factories_supporting(&CapabilityId::of::<C>())
            .is_empty()
    }

    /// The configuration used for disambiguation
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The environment as left by providers' `detect` hooks
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The frozen registry
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Current lifecycle state
    pub fn state(&self) -> ContainerState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of singletons built so far
    pub fn cached_singletons(&self) -> usize {
        self.singletons.len()
    }

    pub(crate) fn set_state(&self, state: ContainerState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.services, &self.config)
    }

    fn ensure_usable(&self) -> ServiceResult<()> {
        match self.state() {
            ContainerState::Failed => Err(ServiceError::ContainerFailed),
            ContainerState::Booting | ContainerState::Ready => Ok(()),
        }
    }

    fn make_one<C: ?Sized + Capability>(&self, name: Option<&str>) -> ServiceResult<Arc<C>> {
        self.ensure_usable()?;
        let capability = CapabilityId::of::<C>();
        let factory = self.resolver().one::<C>(name)?;
        self.build::<C>(&capability, factory)
    }

    /// Instantiate `factory` and view the result as `C`
    fn build<C: ?Sized + Capability>(
        &self,
        capability: &CapabilityId,
        factory: &ServiceFactory,
    ) -> ServiceResult<Arc<C>> {
        let instance = self.instantiate(capability, factory)?;
        let invalid = || ServiceError::InvalidCast {
            service: factory.service_name().to_string(),
            capability: capability.name(),
        };

        factory
            .cast(capability, instance)
            .ok_or_else(invalid)?
            .downcast::<Arc<C>>()
            .map(|service| *service)
            .map_err(|_| invalid())
    }

    fn instantiate(
        &self,
        capability: &CapabilityId,
        factory: &ServiceFactory,
    ) -> ServiceResult<Instance> {
        let _guard = ResolutionGuard::enter(self, factory.key())?;

        if !factory.is_singleton() {
            return self.construct(capability, factory);
        }

        let slot = self.singletons.slot(factory.key());
        let (mut cached, _owner) = self.singletons.lock(factory.key(), &slot)?;
        if let Some(instance) = cached.as_ref() {
            trace!(service = factory.service_name(), "Singleton cache hit");
            return Ok(instance.clone());
        }

        let instance = self.construct(capability, factory)?;
        *cached = Some(instance.clone());
        Ok(instance)
    }

    fn construct(
        &self,
        capability: &CapabilityId,
        factory: &ServiceFactory,
    ) -> ServiceResult<Instance> {
        debug!(
            capability = capability.name(),
            service = factory.service_name(),
            service_type = factory.service_type_name(),
            singleton = factory.is_singleton(),
            "Constructing service"
        );

        match factory.construct(self) {
            Ok(Some(instance)) => Ok(instance),
            Ok(None) => Err(ServiceError::unknown(
                capability.name(),
                Some(factory.service_name()),
            )),
            Err(source) => Err(ServiceError::construction(factory.service_name(), source)),
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("state", &self.state())
            .field("services", &self.services.len())
            .field("cached_singletons", &self.cached_singletons())
            .finish()
    }
}

/// Application container facade
///
/// Holds the process-wide container once boot has completed, with
/// thread-local overrides for tests (see [`TestContainer`](testing::TestContainer)).
///
/// # Example
///
/// ```rust,ignore
/// let container = Application::new().provider(LogProvider).boot().await?;
/// App::init(container)?;
///
/// // Anywhere else
/// let log = App::make::<dyn Log>()?;
/// ```
pub struct App;

impl App {
    /// Install the application container
    ///
    /// Fails if one has already been installed.
    pub fn init(container: Arc<Container>) -> ServiceResult<()> {
        APP_CONTAINER
            .set(container)
            .map_err(|_| ServiceError::AlreadyInitialized)
    }

    /// The container in effect on this thread
    ///
    /// Checks test overrides first, then falls back to the global container.
    pub fn container() -> ServiceResult<Arc<Container>> {
        let overridden = TEST_CONTAINER.with(|c| c.borrow().clone());
        if let Some(container) = overridden {
            return Ok(container);
        }

        APP_CONTAINER
            .get()
            .cloned()
            .ok_or(ServiceError::NotInitialized)
    }

    /// Check if a container is available on this thread
    pub fn is_initialized() -> bool {
        Self::container().is_ok()
    }

    /// Resolve a single service usable as `C`
    pub fn make<C: ?Sized + Capability>() -> ServiceResult<Arc<C>> {
        Self::container()?.make::<C>()
    }

    /// Resolve the service named `name` usable as `C`
    pub fn make_named<C: ?Sized + Capability>(name: &str) -> ServiceResult<Arc<C>> {
        Self::container()?.make_named::<C>(name)
    }

    /// Resolve every service usable as `C`
    pub fn make_all<C: ?Sized + Capability>() -> ServiceResult<Vec<Arc<C>>> {
        Self::container()?.make_all::<C>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentName;
    use crate::error::BoxError;
    use crate::testing::TestContainer;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    trait Log: Send + Sync {
        fn format(&self, message: &str) -> String;
    }
    impl Capability for dyn Log {}

    struct PrintLog;
    impl Log for PrintLog {
        fn format(&self, message: &str) -> String {
            message.to_string()
        }
    }

    struct AllCapsLog;
    impl Log for AllCapsLog {
        fn format(&self, message: &str) -> String {
            message.to_uppercase()
        }
    }
    impl Capability for AllCapsLog {}

    struct Greeter {
        log: Arc<dyn Log>,
    }
    impl Capability for Greeter {}

    fn print() -> ServiceFactory {
        ServiceFactory::builder(|_| Ok(PrintLog))
            .name("print")
            .supports::<dyn Log, _>(|s| s)
            .build()
    }

    fn all_caps(built: Arc<AtomicUsize>, singleton: bool) -> ServiceFactory {
        ServiceFactory::builder(move |_| {
            built.fetch_add(1, Ordering::SeqCst);
            Ok(AllCapsLog)
        })
        .name("all-caps")
        .singleton(singleton)
        .supports::<dyn Log, _>(|s| s)
        .build()
    }

    fn container(config: Config, factories: Vec<ServiceFactory>) -> Container {
        let mut services = Services::new();
        for factory in factories {
            services.register_factory(factory);
        }
        Container::new(config, Environment::new(EnvironmentName::Testing), services)
    }

    #[test]
    fn test_make_single_service() {
        let container = container(Config::new(), vec![print()]);

        let log = container.make::<dyn Log>().unwrap();
        assert_eq!(log.format("hello!"), "hello!");
        assert!(container.supports::<dyn Log>());
        assert!(!container.supports::<Greeter>());
    }

    #[test]
    fn test_make_uses_configured_service() {
        let built = Arc::new(AtomicUsize::new(0));
        let mut config = Config::new();
        config.set("app", "log", "all-caps");
        let container = container(config, vec![print(), all_caps(built, true)]);

        let log = container.make::<dyn Log>().unwrap();
        assert_eq!(log.format("hello!"), "HELLO!");
    }

    #[test]
    fn test_make_without_config_is_ambiguous() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(Config::new(), vec![print(), all_caps(built.clone(), true)]);

        let err = container.make::<dyn Log>().err().unwrap();
        assert!(matches!(err, ServiceError::Ambiguous { .. }));
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_make_named_and_concrete() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(Config::new(), vec![print(), all_caps(built, true)]);

        let log = container.make_named::<dyn Log>("print").unwrap();
        assert_eq!(log.format("hi"), "hi");

        let caps = container.make::<AllCapsLog>().unwrap();
        assert_eq!(caps.format("hi"), "HI");
    }

    #[test]
    fn test_make_all_in_configured_order() {
        let built = Arc::new(AtomicUsize::new(0));
        let mut config = Config::new();
        config.set("app", "logs", ["all-caps", "print"]);
        let container = container(config, vec![print(), all_caps(built, true)]);

        let logs = container.make_all::<dyn Log>().unwrap();
        let formatted: Vec<_> = logs.iter().map(|log| log.format("hi")).collect();
        assert_eq!(formatted, vec!["HI", "hi"]);
    }

    #[test]
    fn test_singleton_built_once_across_capabilities() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(Config::new(), vec![all_caps(built.clone(), true)]);

        let first = container.make::<AllCapsLog>().unwrap();
        let second = container.make::<AllCapsLog>().unwrap();
        let _as_log = container.make::<dyn Log>().unwrap();
        let _all = container.make_all::<dyn Log>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(container.cached_singletons(), 1);
    }

    #[test]
    fn test_non_singleton_built_every_time() {
        let built = Arc::new(AtomicUsize::new(0));
        let container = container(Config::new(), vec![all_caps(built.clone(), false)]);

        let first = container.make::<AllCapsLog>().unwrap();
        let second = container.make::<AllCapsLog>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_eq!(container.cached_singletons(), 0);
    }

    #[test]
    fn test_singleton_built_once_under_concurrent_first_resolution() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let slow = ServiceFactory::builder(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(AllCapsLog)
        })
        .build();
        let container = Arc::new(container(Config::new(), vec![slow]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let container = container.clone();
                thread::spawn(move || container.make::<AllCapsLog>().unwrap())
            })
            .collect();
        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
    }

    #[test]
    fn test_constructor_resolves_dependencies() {
        let greeter = ServiceFactory::builder(|container: &Container| {
            Ok(Greeter {
                log: container.make::<dyn Log>()?,
            })
        })
        .build();
        let container = container(Config::new(), vec![print(), greeter]);

        let greeter = container.make::<Greeter>().unwrap();
        assert_eq!(greeter.log.format("hey"), "hey");
    }

    #[test]
    fn test_constructor_failure_is_wrapped() {
        let failing = ServiceFactory::builder(|_| -> Result<PrintLog, BoxError> {
            Err("no terminal attached".into())
        })
        .name("print")
        .supports::<dyn Log, _>(|s| s)
        .build();
        let container = container(Config::new(), vec![failing]);

        match container.make::<dyn Log>() {
            Err(ServiceError::ConstructionFailed { service, source }) => {
                assert_eq!(service, "print");
                assert_eq!(source.to_string(), "no terminal attached");
            }
            other => panic!("expected construction failure, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_constructor_declining_is_unknown() {
        let declining = ServiceFactory::builder_optional(|_| Ok(None::<PrintLog>))
            .name("print")
            .supports::<dyn Log, _>(|s| s)
            .build();
        let container = container(Config::new(), vec![declining]);

        let err = container.make::<dyn Log>().err().unwrap();
        assert!(err.is_unknown());
    }

    #[test]
    fn test_circular_dependency_is_reported() {
        let cyclic = ServiceFactory::builder(|container: &Container| {
            Ok(Greeter {
                log: container.make::<dyn Log>()?,
            })
        })
        .name("greeter")
        .build();
        let looping_log = ServiceFactory::builder(|container: &Container| {
            container.make::<Greeter>()?;
            Ok(PrintLog)
        })
        .name("print")
        .supports::<dyn Log, _>(|s| s)
        .build();
        let container = container(Config::new(), vec![cyclic, looping_log]);

        let err = container.make::<Greeter>().err().unwrap();
        let message = err.to_string();
        assert!(message.contains("greeter -> print -> greeter"), "{}", message);

        // Nothing is left marked as under construction
        assert!(container.make::<Greeter>().is_err());
        RESOLVING.with(|stack| assert!(stack.borrow().is_empty()));
    }

    struct Left;
    impl Capability for Left {}

    struct Right;
    impl Capability for Right {}

    #[test]
    fn test_cycle_across_threads_fails_instead_of_deadlocking() {
        let left = ServiceFactory::builder(|container: &Container| {
            thread::sleep(Duration::from_millis(100));
            container.make::<Right>()?;
            Ok(Left)
        })
        .name("left")
        .build();
        let right = ServiceFactory::builder(|container: &Container| {
            thread::sleep(Duration::from_millis(100));
            container.make::<Left>()?;
            Ok(Right)
        })
        .name("right")
        .build();
        let container = Arc::new(container(Config::new(), vec![left, right]));

        let (tx, rx) = std::sync::mpsc::channel();
        let from_left = {
            let (container, tx) = (container.clone(), tx.clone());
            thread::spawn(move || tx.send(container.make::<Left>().err().map(|e| e.to_string())))
        };
        let from_right = {
            let container = container.clone();
            thread::spawn(move || tx.send(container.make::<Right>().err().map(|e| e.to_string())))
        };

        for _ in 0..2 {
            let err = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("resolution deadlocked")
                .expect("a cyclic resolution succeeded");
            assert!(err.contains("Circular dependency"), "{}", err);
        }
        from_left.join().unwrap().unwrap();
        from_right.join().unwrap().unwrap();
        assert_eq!(container.cached_singletons(), 0);
    }

    #[test]
    fn test_ownership_cycle_follows_waiting_threads() {
        let (me, other) = (
            thread::current().id(),
            thread::spawn(|| thread::current().id()).join().unwrap(),
        );
        let left = ServiceFactory::builder(|_| Ok(Left)).name("left").build();
        let right = ServiceFactory::builder(|_| Ok(Right)).name("right").build();

        let mut ownership = Ownership::default();
        ownership.owners.insert(left.key().clone(), me);
        ownership.owners.insert(right.key().clone(), other);
        assert_eq!(ownership.cycle(me, right.key()), None);

        ownership.waiting.insert(other, left.key().clone());
        assert_eq!(
            ownership.cycle(me, right.key()),
            Some(vec!["right".to_string(), "left".to_string(), "right".to_string()])
        );
    }

    #[test]
    fn test_failed_container_refuses_resolution() {
        let container = container(Config::new(), vec![print()]);
        container.set_state(ContainerState::Failed);

        assert!(matches!(
            container.make::<dyn Log>().err(),
            Some(ServiceError::ContainerFailed)
        ));
        assert!(matches!(
            container.make_all::<dyn Log>().err(),
            Some(ServiceError::ContainerFailed)
        ));
    }

    #[test]
    fn test_app_facade_uses_thread_local_override() {
        let mut services = Services::new();
        services.register_factory(print());

        {
            let _guard = TestContainer::fake(TestContainer::build(Config::new(), services));
            let log = App::make::<dyn Log>().unwrap();
            assert_eq!(log.format("x"), "x");
            assert!(App::is_initialized());
        }

        if APP_CONTAINER.get().is_none() {
            assert!(matches!(App::container().err(), Some(ServiceError::NotInitialized)));
        }
    }
}
