use clap::{Args, Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, instrument, warn};

use crate::config::{AppConfig, SystemConfig, APP_KEYS};
use crate::http::AppState;
use crate::secrets::SecretManager;
use crate::types::Result;

#[derive(Parser)]
#[command(name = "ftpvault")]
#[command(about = "FTP configuration service backed by a secret vault")]
#[command(long_about = "
A small HTTP API that reports configuration status, masks secret values for
display and simulates FTP transfers using credentials held in a secret vault.
")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// System configuration file path
    #[arg(short, long, default_value = "/etc/ftpvault/config.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the HTTP server (default if no subcommand given)
    Run(RunArgs),
    /// Validate the configuration file and vault settings
    Validate,
    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
pub struct RunArgs {
    /// Override listen address (format: "host:port")
    #[arg(long)]
    pub listen: Option<String>,

    /// Set log format
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Get effective log level considering verbose/quiet flags
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else if self.quiet {
            LogLevel::Error
        } else {
            self.log_level.clone().unwrap_or(LogLevel::Info)
        }
    }

    /// Log level override, if any flag asked for one
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.log_level.is_none() && !self.verbose && !self.quiet {
            return None;
        }
        Some(match self.effective_log_level() {
            LogLevel::Trace => crate::logging::level::TRACE,
            LogLevel::Debug => crate::logging::level::DEBUG,
            LogLevel::Info => crate::logging::level::INFO,
            LogLevel::Warn => crate::logging::level::WARN,
            LogLevel::Error => crate::logging::level::ERROR,
        })
    }

    /// Get log format override from CLI arguments
    pub fn log_format_override(&self) -> Option<&'static str> {
        match &self.command {
            Some(Commands::Run(args)) => args.log_format.as_ref().map(|fmt| match fmt {
                LogFormat::Json => crate::logging::format::JSON,
                LogFormat::Pretty => crate::logging::format::PRETTY,
            }),
            _ => None,
        }
    }
}

/// Resolve application settings, consulting the vault first when
/// `vault.inject_properties` is set
pub async fn load_app_config(
    system_config: &SystemConfig,
    secret_manager: &SecretManager,
) -> AppConfig {
    let vault_values = if system_config.vault.inject_properties {
        let values = secret_manager.get_secrets(&APP_KEYS).await;
        info!(
            resolved = values.len(),
            requested = APP_KEYS.len(),
            "Injected application settings from secret vault"
        );
        values
    } else {
        HashMap::new()
    };

    AppConfig::load(&system_config.app, &vault_values)
}

/// Validate the system configuration and build the secret manager.
///
/// Vault settings that would stop the client from being built only warn
/// here; the manager then comes up degraded.
async fn prepare_startup(system_config: &SystemConfig) -> Result<SecretManager> {
    system_config.validate().await?;

    if let Err(e) = system_config.validate_vault_settings().await {
        warn!(error = %e, "Secret vault settings are invalid");
    }

    let secret_manager = SecretManager::initialize(&system_config.vault);
    if secret_manager.is_degraded() {
        warn!("Starting without a secret vault; secrets will report as not found");
    }
    Ok(secret_manager)
}

/// Run the HTTP server
#[instrument(skip(cli, args, system_config))]
pub async fn run_server(
    cli: Cli,
    args: RunArgs,
    system_config: Option<SystemConfig>,
) -> Result<()> {
    let mut system_config = match system_config {
        Some(config) => config,
        None => {
            info!("Loading system configuration...");
            SystemConfig::load_or_default(&cli.config)?
        }
    };

    if let Some(listen) = args.listen {
        system_config.server.listen = listen;
    }

    let secret_manager = Arc::new(prepare_startup(&system_config).await?);
    info!(
        config_path = %cli.config.display(),
        vault_backend = %system_config.vault.backend,
        "Configuration loaded successfully"
    );

    let app_config = Arc::new(load_app_config(&system_config, &secret_manager).await);
    info!(
        ftp_server = %app_config.ftp_server,
        ftp_username = %app_config.ftp_username,
        "Application settings resolved"
    );

    let app_state = Arc::new(AppState::new(system_config, app_config, secret_manager));

    crate::http::start_server(app_state, setup_shutdown_signal()).await
}

/// Validate configuration and vault settings
#[instrument(skip(cli, system_config))]
pub async fn validate_config(cli: Cli, system_config: Option<SystemConfig>) -> Result<()> {
    info!("Validating configuration...");

    let config = match system_config {
        Some(config) => config,
        None => SystemConfig::load_or_default(&cli.config)?,
    };

    let validation = match config.validate().await {
        Ok(()) => config.validate_vault_settings().await,
        Err(e) => Err(e),
    };
    match validation {
        Ok(()) => info!(
            config_path = %cli.config.display(),
            "System configuration is valid"
        ),
        Err(e) => {
            error!(
                config_path = %cli.config.display(),
                error = %e,
                "System configuration validation failed"
            );
            return Err(e);
        }
    }

    info!("Validating secret vault configuration...");
    let secret_manager = match SecretManager::connect(&config.vault) {
        Ok(manager) => manager,
        Err(e) => {
            error!(
                backend = %config.vault.backend,
                error = %e,
                "Failed to initialize secret vault client"
            );
            return Err(e.into());
        }
    };

    if secret_manager.is_accessible().await {
        info!(
            backend = secret_manager.backend_name(),
            "Secret vault is accessible"
        );
    } else {
        warn!(
            backend = secret_manager.backend_name(),
            "Secret vault is not accessible right now"
        );
    }

    info!("Configuration is valid");
    Ok(())
}

/// Show version information
#[instrument]
pub async fn show_version() -> Result<()> {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Description: {}", env!("CARGO_PKG_DESCRIPTION"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!();

    println!("Build Information:");
    println!(
        "  Build Profile: {}",
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        }
    );
    println!();

    println!("Runtime Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Architecture: {}", std::env::consts::ARCH);

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
pub async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
