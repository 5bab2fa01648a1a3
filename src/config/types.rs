use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::types::{ConfigError, Result};

/// System configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub app: AppSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

/// Secret vault connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// One of `azure`, `file`, `env`
    #[serde(default = "default_vault_backend")]
    pub backend: String,
    /// Vault base URL, e.g. `https://myvault.vault.azure.net`
    pub endpoint: Option<String>,
    #[serde(default = "default_vault_api_version")]
    pub api_version: String,
    /// Per-request timeout in seconds for remote vault calls
    #[serde(default = "default_vault_request_timeout")]
    pub request_timeout: u64,
    /// Resolve application keys from the vault at startup
    #[serde(default)]
    pub inject_properties: bool,
    #[serde(default = "default_vault_secrets_file")]
    pub secrets_file: String,
    #[serde(default)]
    pub env_prefix: String,
}

/// Raw `[app]` table; every key is optional and resolved later in
/// [`crate::config::AppConfig::load`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppSection {
    #[serde(rename = "ftp-username")]
    pub ftp_username: Option<String>,
    #[serde(rename = "ftp-password")]
    pub ftp_password: Option<String>,
    #[serde(rename = "ftp-server")]
    pub ftp_server: Option<String>,
    #[serde(rename = "database-connection-string")]
    pub database_connection_string: Option<String>,
    #[serde(rename = "api-key")]
    pub api_key: Option<String>,
}

impl AppSection {
    /// Look up a value by its external key name
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            super::FTP_USERNAME => self.ftp_username.clone(),
            super::FTP_PASSWORD => self.ftp_password.clone(),
            super::FTP_SERVER => self.ftp_server.clone(),
            super::DATABASE_CONNECTION_STRING => self.database_connection_string.clone(),
            super::API_KEY => self.api_key.clone(),
            _ => None,
        }
    }
}

/// Environment keys that may carry the vault endpoint
pub const VAULT_ENDPOINT_KEYS: [&str; 2] = [
    "spring.cloud.azure.keyvault.secret.endpoint",
    "AZURE_KEYVAULT_ENDPOINT",
];

impl VaultConfig {
    /// Endpoint from the config file, falling back to the environment
    pub fn resolved_endpoint(&self) -> Option<String> {
        self.endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| {
                VAULT_ENDPOINT_KEYS
                    .iter()
                    .find_map(|key| std::env::var(key).ok())
                    .filter(|e| !e.trim().is_empty())
            })
    }
}

impl SystemConfig {
    /// Load system configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::FileNotFound { path: path_str })?;

        let config: SystemConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Load from file if it exists, otherwise use built-in defaults.
    /// Parse errors in an existing file are still reported.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            info!(
                path = %path.as_ref().display(),
                "Config file not found, using defaults"
            );
            Ok(Self::default())
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: default_metrics_enabled(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            backend: default_vault_backend(),
            endpoint: None,
            api_version: default_vault_api_version(),
            request_timeout: default_vault_request_timeout(),
            inject_properties: false,
            secrets_file: default_vault_secrets_file(),
            env_prefix: String::new(),
        }
    }
}

// Default value functions
fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_vault_backend() -> String {
    "azure".to_string()
}

fn default_vault_api_version() -> String {
    "7.4".to_string()
}

fn default_vault_request_timeout() -> u64 {
    10
}

fn default_vault_secrets_file() -> String {
    "/etc/ftpvault/secrets.env".to_string()
}
