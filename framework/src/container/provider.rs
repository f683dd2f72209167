//! Service providers and their boot lifecycle
//!
//! A provider bundles the registration of one or more services and gets two
//! asynchronous hooks once the registry is frozen. The bootstrap driver
//! ([`Application`](crate::Application)) moves every provider through
//! [`ProviderState`] in lockstep.
//!
//! # Example
//!
//! ```rust,ignore
//! use servicekit::{async_trait, BoxError, Container, Provider, Services};
//!
//! #[derive(Default)]
//! pub struct LogProvider;
//!
//! #[async_trait]
//! impl Provider for LogProvider {
//!     fn register(&self, services: &mut Services) -> Result<(), BoxError> {
//!         services.register::<PrintLog>();
//!         services.register::<AllCapsLog>();
//!         Ok(())
//!     }
//!
//!     async fn did_boot(&self, container: &Arc<Container>) -> Result<(), BoxError> {
//!         container.make::<dyn Log>()?.log("logging ready");
//!         Ok(())
//!     }
//! }
//!
//! // Picked up by `Application::discover_providers()`
//! servicekit::register_provider!(LogProvider);
//! ```

use crate::config::Environment;
use crate::container::services::Services;
use crate::container::Container;
use crate::error::BoxError;
use crate::naming;
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Integrates a set of services into the application's container
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Name of the package providing the services
    ///
    /// Defaults to the kebab-cased type name: `LogProvider` → `log-provider`.
    fn repository_name(&self) -> Cow<'static, str> {
        Cow::Owned(naming::service_name_of::<Self>())
    }

    /// Public directory, relative to the provider package root
    fn public_dir(&self) -> &str {
        "Public"
    }

    /// Views directory, relative to the provider package root
    fn views_dir(&self) -> &str {
        "Resources/Views"
    }

    /// Inspect or adjust the environment before anything is registered
    fn detect(&self, _env: &mut Environment) -> Result<(), BoxError> {
        Ok(())
    }

    /// Register all services provided by the provider
    ///
    /// Must not block or perform I/O.
    fn register(&self, services: &mut Services) -> Result<(), BoxError>;

    /// Called once the registry is frozen, before any provider's `did_boot`
    ///
    /// The container can already resolve services. Keep a clone of it to use
    /// it beyond the hook.
    async fn will_boot(&self, _container: &Arc<Container>) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after every provider's `will_boot` has completed
    async fn did_boot(&self, _container: &Arc<Container>) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Step of the bootstrap sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPhase {
    Detect,
    Register,
    WillBoot,
    DidBoot,
}

impl fmt::Display for BootPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Detect => "detect",
            Self::Register => "register",
            Self::WillBoot => "will-boot",
            Self::DidBoot => "did-boot",
        })
    }
}

/// Where a provider is in its lifecycle
///
/// Transitions only move forward, one step at a time:
/// `Created → Registered → WillBoot → DidBoot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProviderState {
    Created,
    Registered,
    WillBoot,
    DidBoot,
}

impl ProviderState {
    /// The state following this one
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Created => Some(Self::Registered),
            Self::Registered => Some(Self::WillBoot),
            Self::WillBoot => Some(Self::DidBoot),
            Self::DidBoot => None,
        }
    }

    /// The state reached by completing `phase`, if the phase moves the state
    pub fn after(phase: BootPhase) -> Option<Self> {
        match phase {
            BootPhase::Detect => None,
            BootPhase::Register => Some(Self::Registered),
            BootPhase::WillBoot => Some(Self::WillBoot),
            BootPhase::DidBoot => Some(Self::DidBoot),
        }
    }
}

/// A provider together with its lifecycle state
pub(crate) struct ProviderSlot {
    provider: Box<dyn Provider>,
    name: String,
    state: ProviderState,
}

impl ProviderSlot {
    pub(crate) fn new(provider: Box<dyn Provider>) -> Self {
        let name = provider.repository_name().into_owned();
        Self {
            provider,
            name,
            state: ProviderState::Created,
        }
    }

    pub(crate) fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn state(&self) -> ProviderState {
        self.state
    }

    /// Record completion of `phase`; out-of-order transitions are refused
    pub(crate) fn complete(&mut self, phase: BootPhase) -> bool {
        match ProviderState::after(phase) {
            None => self.state == ProviderState::Created,
            Some(next) if self.state.next() == Some(next) => {
                self.state = next;
                true
            }
            Some(_) => false,
        }
    }
}

/// Entry for providers registered at link time with [`register_provider!`]
///
/// [`register_provider!`]: crate::register_provider
pub struct ProviderEntry {
    /// Type name of the provider, used to order discovered providers
    pub name: &'static str,
    /// Build a fresh provider
    pub make: fn() -> Box<dyn Provider>,
}

inventory::collect!(ProviderEntry);

/// Every provider registered with [`register_provider!`], ordered by name
///
/// [`register_provider!`]: crate::register_provider
pub fn discovered_providers() -> Vec<&'static ProviderEntry> {
    let mut entries: Vec<_> = inventory::iter::<ProviderEntry>.into_iter().collect();
    entries.sort_by_key(|entry| entry.name);
    entries
}

/// Register a `Default` provider for [`Application::discover_providers`]
///
/// [`Application::discover_providers`]: crate::Application::discover_providers
///
/// # Example
/// ```rust,ignore
/// servicekit::register_provider!(LogProvider);
/// ```
#[macro_export]
macro_rules! register_provider {
    ($provider:ty) => {
        $crate::inventory::submit! {
            $crate::ProviderEntry {
                name: stringify!($provider),
                make: || ::std::boxed::Box::new(<$provider as ::std::default::Default>::default()),
            }
        }
    };
}
