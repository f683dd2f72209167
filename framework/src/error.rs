//! Container-wide error types
//!
//! Every resolution and boot failure surfaces as a [`ServiceError`]. Errors
//! raised by user code (service constructors, provider hooks) travel as a
//! [`BoxError`] and are wrapped, never swallowed.

use crate::container::provider::BootPhase;
use thiserror::Error;

/// Error type returned by service constructors and provider hooks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the container
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors produced while resolving services or booting the container
///
/// # Example
///
/// ```rust,ignore
/// use servicekit::{Container, ServiceError};
///
/// match container.make::<dyn Log>() {
///     Ok(log) => log.log("hello!"),
///     Err(ServiceError::Ambiguous { candidates, .. }) => {
///         eprintln!("set `app.log` to one of {:?}", candidates);
///     }
///     Err(e) => return Err(e.into()),
/// }
/// ```
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No registered factory satisfies the request
    #[error("No service supports '{capability}'{}", describe_name(.name))]
    Unknown {
        /// The requested capability
        capability: &'static str,
        /// The requested or configured service name, if any
        name: Option<String>,
    },

    /// Several factories match and nothing singles one out
    #[error(
        "Multiple services support '{capability}': {}. Set `app.{config_key}` to choose one",
        .candidates.join(", ")
    )]
    Ambiguous {
        /// The requested capability
        capability: &'static str,
        /// Config key that would disambiguate the request
        config_key: String,
        /// Names of every matching factory, in registration order
        candidates: Vec<String>,
    },

    /// A name was requested that the only available candidate does not carry
    #[error("Service '{name}' does not support '{capability}' (available: {})", .available.join(", "))]
    UnsupportedName {
        /// The requested capability
        capability: &'static str,
        /// The requested name
        name: String,
        /// Names of the factories that do support the capability
        available: Vec<String>,
    },

    /// The selected factory's constructor failed
    #[error("Failed to construct service '{service}': {source}")]
    ConstructionFailed {
        /// Name of the service being built
        service: String,
        /// The constructor's error
        #[source]
        source: BoxError,
    },

    /// A service constructor requested itself, directly or through others
    #[error("Circular dependency while resolving services: {}", .chain.join(" -> "))]
    CircularDependency {
        /// Services under construction, outermost first, ending with the repeat
        chain: Vec<String>,
    },

    /// The built instance could not be viewed as the requested capability
    #[error("Service '{service}' cannot be used as '{capability}'")]
    InvalidCast {
        /// Name of the service
        service: String,
        /// The requested capability
        capability: &'static str,
    },

    /// A provider hook failed during bootstrap
    #[error("Provider '{provider}' failed during {phase}: {source}")]
    BootFailed {
        /// Repository name of the provider
        provider: String,
        /// Phase in which the failure happened
        phase: BootPhase,
        /// The hook's error
        #[source]
        source: BoxError,
    },

    /// The container's boot sequence aborted; it can no longer resolve services
    #[error("Container failed to boot and cannot resolve services")]
    ContainerFailed,

    /// The global container has already been installed
    #[error("Application container is already initialized")]
    AlreadyInitialized,

    /// No global container has been installed yet
    #[error("Application container is not initialized")]
    NotInitialized,

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },
}

fn describe_name(name: &Option<String>) -> String {
    match name {
        Some(name) => format!(" with name '{}'", name),
        None => String::new(),
    }
}

impl ServiceError {
    /// Create an Unknown error for a capability with no matching factory
    pub fn unknown(capability: &'static str, name: Option<&str>) -> Self {
        Self::Unknown {
            capability,
            name: name.map(str::to_string),
        }
    }

    /// Create a ConstructionFailed error wrapping the constructor's error
    pub fn construction(service: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ConstructionFailed {
            service: service.into(),
            source: source.into(),
        }
    }

    /// Create a BootFailed error for a provider hook
    pub fn boot(
        provider: impl Into<String>,
        phase: BootPhase,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::BootFailed {
            provider: provider.into(),
            phase,
            source: source.into(),
        }
    }

    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error means no factory could be found for the request
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}
