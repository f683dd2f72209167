//! Registers the log services and announces the boot through them

use crate::services::{AllCapsLog, Log, PrintLog};
use servicekit::{async_trait, register_provider, BoxError, Container, Provider, Services};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
pub struct LogProvider;

#[async_trait]
impl Provider for LogProvider {
    fn register(&self, services: &mut Services) -> Result<(), BoxError> {
        services.register::<PrintLog>();
        services.register::<AllCapsLog>();
        Ok(())
    }

    async fn did_boot(&self, container: &Arc<Container>) -> Result<(), BoxError> {
        let log = container.make::<dyn Log>()?;
        log.log("log provider booted");
        info!(provider = %self.repository_name(), "Log services ready");
        Ok(())
    }
}

register_provider!(LogProvider);
