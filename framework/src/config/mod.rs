//! Configuration for service resolution
//!
//! The container reads a two-level `(section, key)` namespace. Under the `app`
//! section, a capability's key names the service to use when several could
//! satisfy it, and its plural key orders the services of an array request:
//!
//! ```json
//! {
//!     "app": {
//!         "log": "all-caps",
//!         "logs": ["all-caps", "print"]
//!     }
//! }
//! ```
//!
//! # Example
//!
//! ```rust
//! use servicekit::Config;
//!
//! let mut config = Config::new();
//! config.set("app", "log", "all-caps");
//! config.set("app", "logs", ["all-caps", "print"]);
//!
//! assert_eq!(config.get("app", "log").and_then(|v| v.as_single()), Some("all-caps"));
//! ```

pub mod env;

pub use env::{env, env_optional, load_dotenv, Environment, EnvironmentName};

use crate::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Section holding the service selection keys
pub const APP_SECTION: &str = "app";

/// A configured value: one name or an ordered list of names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// A single string
    Single(String),
    /// An ordered list of strings
    List(Vec<String>),
}

impl ConfigValue {
    /// The value if it is a single string
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::List(_) => None,
        }
    }

    /// The value as a list; a single string becomes a one-element list
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Parse an environment-variable style value: commas separate list entries
    fn parse(raw: &str) -> Self {
        if raw.contains(',') {
            Self::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            Self::Single(raw.trim().to_string())
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ConfigValue {
    fn from(values: [&str; N]) -> Self {
        Self::List(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Read-only `(section, key)` lookup used by the resolver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    sections: BTreeMap<String, BTreeMap<String, ConfigValue>>,
}

impl Config {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one
    pub fn set(
        &mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> &mut Self {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Look up a value
    pub fn get(&self, section: &str, key: &str) -> Option<&ConfigValue> {
        self.sections.get(section)?.get(key)
    }

    /// Check if a value is set
    pub fn has(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// Overlay `other` on top of this configuration, key by key
    pub fn merge(&mut self, other: Config) -> &mut Self {
        for (section, values) in other.sections {
            self.sections.entry(section).or_default().extend(values);
        }
        self
    }

    /// Parse a JSON object of sections
    pub fn from_json_str(json: &str) -> ServiceResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ServiceError::config(format!("invalid JSON config: {}", e)))
    }

    /// Read a JSON config file
    pub fn from_json_file(path: &Path) -> ServiceResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&contents)
    }

    /// Build configuration from environment variables named `PREFIX__SECTION__KEY`
    ///
    /// Section and key are lowercased and `_` becomes `-`, so
    /// `SERVICEKIT__APP__HTTP_CLIENT=curl` sets `("app", "http-client")`.
    /// Comma-separated values become lists.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// Load `.env` files from `project_root`, then read [`Config::from_env`]
    pub fn load(project_root: &Path, prefix: &str) -> (Self, EnvironmentName) {
        let environment = env::load_dotenv(project_root);
        (Self::from_env(prefix), environment)
    }

    fn from_vars(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let marker = format!("{}__", prefix);
        let mut config = Self::new();

        for (name, raw) in vars {
            let Some(rest) = name.strip_prefix(&marker) else {
                continue;
            };
            let Some((section, key)) = rest.split_once("__") else {
                continue;
            };
            if section.is_empty() || key.is_empty() {
                continue;
            }
            config.set(normalize(section), normalize(key), ConfigValue::parse(&raw));
        }

        config
    }
}

fn normalize(part: &str) -> String {
    part.to_lowercase().replace('_', "-")
}
