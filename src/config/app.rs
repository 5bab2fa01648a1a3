//! Application settings consumed by the HTTP handlers and the transfer
//! simulator.
//!
//! Each setting is read once at startup from, in order of precedence:
//! the process environment, the secret vault (when property injection is
//! enabled), the `[app]` table of the system config file, and finally a
//! built-in default. A missing key is never an error.

use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use super::AppSection;

pub const FTP_USERNAME: &str = "ftp-username";
pub const FTP_PASSWORD: &str = "ftp-password";
pub const FTP_SERVER: &str = "ftp-server";
pub const DATABASE_CONNECTION_STRING: &str = "database-connection-string";
pub const API_KEY: &str = "api-key";

/// All application keys, in declaration order
pub const APP_KEYS: [&str; 5] = [
    FTP_USERNAME,
    FTP_PASSWORD,
    FTP_SERVER,
    DATABASE_CONNECTION_STRING,
    API_KEY,
];

pub const DEFAULT_FTP_USERNAME: &str = "defaultUser";
pub const DEFAULT_FTP_PASSWORD: &str = "defaultPass";
pub const DEFAULT_FTP_SERVER: &str = "localhost";
pub const DEFAULT_DATABASE_CONNECTION_STRING: &str = "jdbc:mysql://localhost:3306/testdb";
pub const DEFAULT_API_KEY: &str = "default-api-key";

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySource {
    Environment,
    Vault,
    File,
    Default,
}

impl fmt::Display for PropertySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertySource::Environment => "environment",
            PropertySource::Vault => "vault",
            PropertySource::File => "file",
            PropertySource::Default => "default",
        };
        f.write_str(name)
    }
}

/// Immutable application settings snapshot
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub ftp_username: String,
    pub ftp_password: String,
    pub ftp_server: String,
    pub database_connection_string: String,
    pub api_key: String,
}

impl AppConfig {
    /// Resolve every key from the environment, vault values and file section
    pub fn load(file: &AppSection, vault: &HashMap<String, String>) -> Self {
        Self::resolve(|key| {
            if let Some(value) = env_value(key) {
                return Some((value, PropertySource::Environment));
            }
            if let Some(value) = vault.get(key) {
                return Some((value.clone(), PropertySource::Vault));
            }
            file.get(key).map(|value| (value, PropertySource::File))
        })
    }

    /// Build from an arbitrary lookup; keys the lookup does not know fall
    /// back to their defaults. Present-but-empty values are kept as-is.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<(String, PropertySource)>,
    {
        let get = |key: &str, default: &str| -> String {
            let (value, source) = lookup(key)
                .unwrap_or_else(|| (default.to_string(), PropertySource::Default));
            debug!(key = key, source = %source, "Resolved application setting");
            value
        };

        Self {
            ftp_username: get(FTP_USERNAME, DEFAULT_FTP_USERNAME),
            ftp_password: get(FTP_PASSWORD, DEFAULT_FTP_PASSWORD),
            ftp_server: get(FTP_SERVER, DEFAULT_FTP_SERVER),
            database_connection_string: get(
                DATABASE_CONNECTION_STRING,
                DEFAULT_DATABASE_CONNECTION_STRING,
            ),
            api_key: get(API_KEY, DEFAULT_API_KEY),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::resolve(|_| None)
    }
}

// Secrets stay out of Debug output
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("ftp_username", &self.ftp_username)
            .field("ftp_password", &"[REDACTED]")
            .field("ftp_server", &self.ftp_server)
            .field("database_connection_string", &"[REDACTED]")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// `ftp-username` -> `FTP_USERNAME`
pub fn env_key(key: &str) -> String {
    key.replace(['-', '.'], "_").to_uppercase()
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| std::env::var(env_key(key)).ok())
}
