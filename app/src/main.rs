use clap::Parser;
use servicekit::{logging, App, Application, BoxError};

mod config;
mod providers;
mod services;

use services::Log;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = config::Cli::parse();
    let (config, environment) = cli.load()?;
    logging::init(&cli.logging())?;

    let container = Application::new()
        .config(config)
        .environment(environment)
        .discover_providers()
        .boot()
        .await?;
    App::init(container)?;

    for log in App::make_all::<dyn Log>()? {
        log.log(&cli.message);
    }

    Ok(())
}
