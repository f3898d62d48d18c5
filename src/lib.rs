pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use crate::domain::error::Result;
use crate::infrastructure::config::ConfigService;
use crate::infrastructure::logging::init_logging;
use crate::interfaces::cli::Cli;
use clap::Parser;
use tracing::error;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigService::load()?;
    init_logging(&config.log.filter);

    let result = interfaces::cli::run(cli, config).await;
    if let Err(e) = &result {
        error!(error = %e, "Command failed");
    }
    result
}
