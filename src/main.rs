mod cli;
mod config;
mod http;
mod logging;
mod metrics;
mod secrets;
mod transfer;
mod types;

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Commands, RunArgs};
use crate::config::SystemConfig;
use crate::types::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Loaded here only to configure logging; commands reload it and report errors
    let system_config = match &cli.command {
        Some(Commands::Version) => None,
        _ => SystemConfig::load_or_default(&cli.config).ok(),
    };

    crate::logging::init(
        cli.log_level_override(),
        cli.log_format_override(),
        system_config.as_ref(),
    )?;

    crate::metrics::init_metrics();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting ftpvault");

    match cli.command.clone().unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => cli::run_server(cli, args, system_config).await,
        Commands::Validate => cli::validate_config(cli, system_config).await,
        Commands::Version => cli::show_version().await,
    }
}
