//! The service registry
//!
//! [`Services`] collects factories and providers while the application is being
//! configured. Once handed to a [`Container`](crate::Container) it is frozen:
//! the container never exposes it mutably.

use crate::container::factory::{CapabilityId, ServiceFactory, ServiceType};
use crate::container::provider::Provider;
use std::borrow::Cow;
use std::fmt;
use tracing::trace;

/// Ordered collection of registered service factories and providers
///
/// Registration order is preserved and becomes the order of array resolutions
/// when no configuration says otherwise. Duplicates are accepted here and
/// sorted out at resolution time.
///
/// # Example
///
/// ```rust,ignore
/// let mut services = Services::new();
/// services.register::<PrintLog>();
/// services.register::<AllCapsLog>();
/// services.provider(DatabaseProvider::default());
/// ```
#[derive(Default)]
pub struct Services {
    factories: Vec<ServiceFactory>,
    providers: Vec<Box<dyn Provider>>,
}

impl Services {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a [`ServiceType`]
    pub fn register<S: ServiceType>(&mut self) -> &mut Self {
        self.register_factory(ServiceFactory::of::<S>())
    }

    /// Register a factory
    pub fn register_factory(&mut self, factory: ServiceFactory) -> &mut Self {
        trace!(
            service = factory.service_name(),
            service_type = factory.service_type_name(),
            singleton = factory.is_singleton(),
            "Registered service factory"
        );
        self.factories.push(factory);
        self
    }

    /// Register an already built instance as a singleton of its concrete type
    ///
    /// Use [`ServiceFactory::instance`] instead when the instance should also
    /// answer for trait capabilities.
    pub fn register_instance<S: Send + Sync + 'static>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        service: S,
    ) -> &mut Self {
        self.register_factory(ServiceFactory::instance(name, service).build())
    }

    /// Register a provider to run during bootstrap
    pub fn provider<P: Provider>(&mut self, provider: P) -> &mut Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Every factory that can be resolved as `capability`, in registration order
    pub fn factories_supporting(&self, capability: &CapabilityId) -> Vec<&ServiceFactory> {
        self.factories
            .iter()
            .filter(|factory| factory.supports(capability))
            .collect()
    }

    /// All registered factories, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ServiceFactory> {
        self.factories.iter()
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if no factories are registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Number of providers waiting to be booted
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Append another registry's factories and providers, keeping their order
    pub fn extend(&mut self, other: Services) -> &mut Self {
        self.factories.extend(other.factories);
        self.providers.extend(other.providers);
        self
    }

    pub(crate) fn push_provider(&mut self, provider: Box<dyn Provider>) {
        self.providers.push(provider);
    }

    pub(crate) fn take_providers(&mut self) -> Vec<Box<dyn Provider>> {
        std::mem::take(&mut self.providers)
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("factories", &self.factories)
            .field("providers", &self.providers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::factory::Capability;
    use crate::error::BoxError;
    use crate::Container;
    use pretty_assertions::assert_eq;

    trait Log: Send + Sync {}
    impl Capability for dyn Log {}

    #[derive(Default)]
    struct PrintLog;
    impl Log for PrintLog {}
    impl Capability for PrintLog {}
    impl ServiceType for PrintLog {
        fn service_name() -> Cow<'static, str> {
            "print".into()
        }

        fn service_supports() -> Vec<crate::Support<Self>> {
            vec![crate::Support::<Self>::of::<dyn Log, _>(|s| s)]
        }

        fn make_service(_: &Container) -> Result<Self, BoxError> {
            Ok(PrintLog)
        }
    }

    struct Counter;

    #[test]
    fn test_register_preserves_order_and_duplicates() {
        let mut services = Services::new();
        services
            .register::<PrintLog>()
            .register_instance("counter", Counter)
            .register::<PrintLog>();

        let names: Vec<_> = services.iter().map(|f| f.service_name()).collect();
        assert_eq!(names, vec!["print", "counter", "print"]);
        assert_eq!(services.len(), 3);
    }

    #[test]
    fn test_factories_supporting_filters_by_capability() {
        let mut services = Services::new();
        services
            .register_instance("counter", Counter)
            .register::<PrintLog>();

        let logs = services.factories_supporting(&CapabilityId::of::<dyn Log>());
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].service_name(), "print");

        let counters = services.factories_supporting(&CapabilityId::of::<Counter>());
        assert_eq!(counters.len(), 1);
        assert!(services
            .factories_supporting(&CapabilityId::of::<String>())
            .is_empty());
    }

    #[test]
    fn test_empty_registry() {
        let services = Services::new();
        assert!(services.is_empty());
        assert_eq!(services.provider_count(), 0);
    }
}
