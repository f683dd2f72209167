//! Application bootstrap for servicekit
//!
//! Provides a fluent builder that runs every provider through the boot
//! sequence and hands back a ready [`Container`].
//!
//! 1. `detect`: each provider, in order, may adjust the [`Environment`]
//! 2. `register`: each provider, in order, adds its services; the registry is
//!    then frozen inside the container
//! 3. `will_boot`: all providers concurrently
//! 4. `did_boot`: all providers concurrently, only once every `will_boot` is done
//!
//! The first failure aborts the sequence. A container that already exists is
//! marked [`ContainerState::Failed`] so nothing keeps using it.
//!
//! # Example
//!
//! ```rust,ignore
//! use servicekit::Application;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServiceError> {
//!     let container = Application::new()
//!         .config(Config::from_env("SERVICEKIT"))
//!         .provider(LogProvider)
//!         .discover_providers()
//!         .boot()
//!         .await?;
//!
//!     container.make::<dyn Log>()?.log("hello!");
//!     Ok(())
//! }
//! ```

use crate::config::{Config, Environment};
use crate::container::provider::{discovered_providers, BootPhase, Provider, ProviderSlot};
use crate::container::{Container, ContainerState, Services};
use crate::error::{ServiceError, ServiceResult};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Application builder for servicekit
///
/// Use this to assemble configuration, services and providers, then boot.
pub struct Application {
    config: Config,
    environment: Environment,
    services: Services,
}

impl Application {
    /// Create a new application builder
    pub fn new() -> Self {
        Application {
            config: Config::new(),
            environment: Environment::detect(),
            services: Services::new(),
        }
    }

    /// Set the configuration used to disambiguate services
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the environment handed to providers' `detect` hooks
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Append a prepared registry's factories and providers
    pub fn services(mut self, services: Services) -> Self {
        self.services.extend(services);
        self
    }

    /// Register services directly, without a provider
    pub fn register<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Services),
    {
        f(&mut self.services);
        self
    }

    /// Add a provider
    pub fn provider<P: Provider>(mut self, provider: P) -> Self {
        self.services.provider(provider);
        self
    }

    /// Add every provider registered with [`register_provider!`](crate::register_provider)
    ///
    /// Discovered providers follow the ones already added, ordered by type name.
    pub fn discover_providers(mut self) -> Self {
        for entry in discovered_providers() {
            debug!(provider = entry.name, "Discovered provider");
            self.services.push_provider((entry.make)());
        }
        self
    }

    /// Run the boot sequence
    pub async fn boot(self) -> ServiceResult<Arc<Container>> {
        let Application {
            config,
            mut environment,
            mut services,
        } = self;

        let mut slots: Vec<ProviderSlot> = services
            .take_providers()
            .into_iter()
            .map(ProviderSlot::new)
            .collect();

        info!(
            providers = slots.len(),
            environment = %environment.name(),
            "Booting application"
        );

        for slot in slots.iter_mut() {
            slot.provider()
                .detect(&mut environment)
                .map_err(|e| fail(slot.name(), BootPhase::Detect, e))?;
            advance(slot, BootPhase::Detect)?;
        }

        for slot in slots.iter_mut() {
            slot.provider()
                .register(&mut services)
                .map_err(|e| fail(slot.name(), BootPhase::Register, e))?;
            advance(slot, BootPhase::Register)?;
        }

        if services.provider_count() > 0 {
            warn!(
                providers = services.provider_count(),
                "Providers added during registration are ignored"
            );
            services.take_providers();
        }

        info!(services = services.len(), "Registry frozen");
        let container = Arc::new(Container::booting(config, environment, services));

        for phase in [BootPhase::WillBoot, BootPhase::DidBoot] {
            if let Err(e) = run_phase(&container, &mut slots, phase).await {
                container.set_state(ContainerState::Failed);
                return Err(e);
            }
        }

        container.set_state(ContainerState::Ready);
        info!("Application booted");
        Ok(container)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one asynchronous hook of every provider, concurrently
///
/// Resolves once all hooks finish, or with the first error.
async fn run_phase(
    container: &Arc<Container>,
    slots: &mut [ProviderSlot],
    phase: BootPhase,
) -> ServiceResult<()> {
    debug!(%phase, providers = slots.len(), "Running boot phase");

    let hooks = slots.iter().map(|slot| async move {
        let result = match phase {
            BootPhase::WillBoot => slot.provider().will_boot(container).await,
            BootPhase::DidBoot => slot.provider().did_boot(container).await,
            BootPhase::Detect | BootPhase::Register => Ok(()),
        };
        result.map_err(|e| fail(slot.name(), phase, e))
    });
    try_join_all(hooks).await?;

    for slot in slots.iter_mut() {
        advance(slot, phase)?;
    }
    Ok(())
}

fn advance(slot: &mut ProviderSlot, phase: BootPhase) -> ServiceResult<()> {
    if slot.complete(phase) {
        return Ok(());
    }
    Err(fail(
        slot.name(),
        phase,
        format!("provider is in state {:?}", slot.state()),
    ))
}

fn fail(
    provider: &str,
    phase: BootPhase,
    source: impl Into<crate::error::BoxError>,
) -> ServiceError {
    let err = ServiceError::boot(provider, phase, source);
    error!(provider, %phase, error = %err, "Boot aborted");
    err
}
