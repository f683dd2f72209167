use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Which environment the application runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentName {
    Local,
    Development,
    Staging,
    Production,
    Testing,
    Custom(String),
}

impl EnvironmentName {
    /// Detect environment from APP_ENV or default to Local
    pub fn detect() -> Self {
        Self::parse(std::env::var("APP_ENV").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            Some("staging") => Self::Staging,
            Some("development") => Self::Development,
            Some("testing") => Self::Testing,
            Some("local") | None => Self::Local,
            Some(other) => Self::Custom(other.to_string()),
        }
    }

    /// Get the .env file suffix for this environment
    pub fn env_file_suffix(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Custom(name) => name.as_str(),
        }
    }

    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment (local or development)
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Local | Self::Development)
    }
}

impl std::fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.env_file_suffix())
    }
}

/// Mutable bag of flags and variables handed to providers before registration
///
/// Providers inspect and adjust it in [`Provider::detect`](crate::Provider::detect);
/// the resolver never reads it.
#[derive(Debug, Clone)]
pub struct Environment {
    name: EnvironmentName,
    variables: BTreeMap<String, String>,
    flags: BTreeSet<String>,
}

impl Environment {
    /// Create an empty environment with the given name
    pub fn new(name: EnvironmentName) -> Self {
        Self {
            name,
            variables: BTreeMap::new(),
            flags: BTreeSet::new(),
        }
    }

    /// Environment named after APP_ENV, with no variables or flags yet
    pub fn detect() -> Self {
        Self::new(EnvironmentName::detect())
    }

    /// The environment's name
    pub fn name(&self) -> &EnvironmentName {
        &self.name
    }

    /// Rename the environment
    pub fn set_name(&mut self, name: EnvironmentName) {
        self.name = name;
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.name.is_production()
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.name.is_development()
    }

    /// Look up a variable
    pub fn var(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Set a variable, returning the previous value
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.variables.insert(key.into(), value.into())
    }

    /// Check if a flag is set
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Set a flag
    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    /// Clear a flag, returning whether it was set
    pub fn clear_flag(&mut self, flag: &str) -> bool {
        self.flags.remove(flag)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::detect()
    }
}

/// Load environment variables from .env files with proper precedence
///
/// Precedence (later files override earlier):
/// 1. .env (base defaults)
/// 2. .env.local (local overrides, not committed)
/// 3. .env.{environment} (environment-specific)
/// 4. .env.{environment}.local (environment-specific local overrides)
/// 5. Actual system environment variables (highest priority)
pub fn load_dotenv(project_root: &Path) -> EnvironmentName {
    let env = EnvironmentName::detect();
    let suffix = env.env_file_suffix();

    // dotenvy never overwrites, so load the most specific file first
    let _ = dotenvy::from_path(project_root.join(format!(".env.{}.local", suffix)));
    let _ = dotenvy::from_path(project_root.join(format!(".env.{}", suffix)));
    let _ = dotenvy::from_path(project_root.join(".env.local"));
    let _ = dotenvy::from_path(project_root.join(".env"));

    env
}

/// Get an environment variable with a default value
///
/// # Example
/// ```
/// use servicekit::config::env;
///
/// let level = env("LOG_LEVEL", "info".to_string());
/// ```
pub fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_optional(key).unwrap_or(default)
}

/// Get an optional environment variable
pub fn env_optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
