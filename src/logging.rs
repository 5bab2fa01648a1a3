//! Logging set-up for the ftpvault service
//!
//! Structured logging through `tracing`, in JSON or pretty format. The level
//! comes from the CLI, then the system config file, then the default;
//! `RUST_LOG` overrides all of them when set.
//!
//! Span helpers give transfer and secret operations consistent context:
//! ```rust,ignore
//! let _span = ftpvault::logging::transfer_span("upload").entered();
//! ```

use tracing::{info_span, Span};
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

use crate::config::SystemConfig;
use crate::types::{Error, Result};

/// Span for one simulated transfer operation
pub fn transfer_span(operation: &str) -> Span {
    info_span!("transfer", operation = operation)
}

/// Span for one secret vault operation
pub fn secret_span(secret_name: &str) -> Span {
    info_span!("secret", secret_name = secret_name)
}

/// Log level values accepted in configuration
pub mod level {
    pub const TRACE: &str = "trace";
    pub const DEBUG: &str = "debug";
    pub const INFO: &str = "info";
    pub const WARN: &str = "warn";
    pub const ERROR: &str = "error";

    pub const ALL: [&str; 5] = [TRACE, DEBUG, INFO, WARN, ERROR];
}

/// Log format values accepted in configuration
pub mod format {
    pub const JSON: &str = "json";
    pub const PRETTY: &str = "pretty";

    pub const ALL: [&str; 2] = [JSON, PRETTY];
}

/// Install the global tracing subscriber
///
/// Precedence for both level and format: CLI override, then
/// `system_config`, then the built-in default.
pub fn init(
    log_level_override: Option<&str>,
    log_format_override: Option<&str>,
    system_config: Option<&SystemConfig>,
) -> Result<()> {
    let log_level = log_level_override
        .or(system_config.map(|c| c.logging.level.as_str()))
        .unwrap_or(level::INFO);

    let log_format = log_format_override
        .or(system_config.map(|c| c.logging.format.as_str()))
        .unwrap_or(format::JSON);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let timer = ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string());

    let result = match log_format {
        format::JSON => tracing_subscriber::fmt()
            .json()
            .with_timer(timer)
            .with_env_filter(env_filter)
            .with_target(false)
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
        format::PRETTY => tracing_subscriber::fmt()
            .pretty()
            .with_timer(timer)
            .with_env_filter(env_filter)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .try_init(),
        // Unknown formats fall back to the compact default
        _ => tracing_subscriber::fmt()
            .with_timer(timer)
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init(),
    };

    result.map_err(|e| Error::Application(format!("Failed to initialize logging: {}", e)))
}
