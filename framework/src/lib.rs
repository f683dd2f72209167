//! A lazily-resolving service container
//!
//! Services are registered as factories that declare the capabilities (trait
//! objects) they satisfy. The container builds them on demand, caches
//! singletons, and uses configuration to choose when several services offer
//! the same capability. Providers bundle registrations and take part in a
//! two-phase asynchronous boot.
//!
//! # Example
//!
//! ```rust,ignore
//! use servicekit::{Application, Capability, Config, ServiceType};
//!
//! pub trait Log: Send + Sync {
//!     fn log(&self, message: &str);
//! }
//! impl Capability for dyn Log {}
//!
//! #[derive(Default, ServiceType)]
//! #[service(name = "print", supports(dyn Log))]
//! pub struct PrintLog;
//!
//! impl Log for PrintLog {
//!     fn log(&self, message: &str) {
//!         println!("{}", message);
//!     }
//! }
//!
//! let container = Application::new()
//!     .register(|services| {
//!         services.register::<PrintLog>();
//!     })
//!     .boot()
//!     .await?;
//!
//! container.make::<dyn Log>()?.log("hello!");
//! ```

extern crate self as servicekit;

pub mod app;
pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod naming;
pub mod testing;

pub use app::Application;
pub use config::{Config, ConfigValue, Environment, EnvironmentName, APP_SECTION};
pub use container::factory::{
    Capability, CapabilityId, ServiceFactory, ServiceFactoryBuilder, ServiceKey, ServiceType,
    Support,
};
pub use container::provider::{BootPhase, Provider, ProviderEntry, ProviderState};
pub use container::resolver::Resolver;
pub use container::services::Services;
pub use container::{App, Container, ContainerState};
pub use error::{BoxError, ServiceError, ServiceResult};
pub use logging::LoggingConfig;

// Re-export for macro-generated code and provider implementations
pub use async_trait::async_trait;
pub use inventory;
pub use servicekit_macros::ServiceType;
