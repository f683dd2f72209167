//! Command line and configuration loading

use clap::Parser;
use servicekit::{BoxError, Config, Environment, LoggingConfig, APP_SECTION};
use std::path::PathBuf;

/// Prefix for configuration environment variables: `SERVICEKIT__APP__LOG=print`
pub const ENV_PREFIX: &str = "SERVICEKIT";

/// Log service used when `app.log` is not configured
pub const DEFAULT_LOG: &str = "print";

#[derive(Debug, Parser)]
#[command(name = "app", about = "Boot the service container and write through the configured logs")]
pub struct Cli {
    /// JSON configuration file, e.g. {"app": {"log": "all-caps"}}
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Message to write through every configured log
    #[arg(default_value = "hello from servicekit")]
    pub message: String,
}

impl Cli {
    /// Load `.env` files and build configuration
    ///
    /// Environment variables are merged over the file, so they win. `app.log`
    /// falls back to [`DEFAULT_LOG`].
    pub fn load(&self) -> Result<(Config, Environment), BoxError> {
        let root = std::env::current_dir()?;
        let (env_config, name) = Config::load(&root, ENV_PREFIX);

        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::new(),
        };
        config.merge(env_config);

        if !config.has(APP_SECTION, "log") {
            config.set(APP_SECTION, "log", DEFAULT_LOG);
        }

        let mut environment = Environment::detect();
        environment.set_name(name);

        Ok((config, environment))
    }

    pub fn logging(&self) -> LoggingConfig {
        let logging = LoggingConfig::from_env();
        match &self.log_level {
            Some(level) => logging.level(level.clone()),
            None => logging,
        }
    }
}
