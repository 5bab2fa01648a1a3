use std::net::SocketAddr;

use super::types::SystemConfig;
use crate::types::Result;

// Validation helper functions

/// Validate listen address format (host:port)
pub(crate) fn validate_listen_address(addr: &str) -> Result<()> {
    addr.parse::<SocketAddr>()
        .map_err(|_| crate::types::Error::Validation {
            field: "server.listen".to_string(),
            message: format!("Invalid listen address format '{}'. Expected format: 'host:port' (e.g., '127.0.0.1:8080')", addr),
        })?;
    Ok(())
}

/// Validate positive timeout value
pub(crate) fn validate_positive_timeout(value: u64, field: &str) -> Result<()> {
    if value == 0 {
        return Err(crate::types::Error::Validation {
            field: field.to_string(),
            message: "Timeout must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validate the vault backend name
pub(crate) fn validate_vault_backend(backend: &str, field: &str) -> Result<()> {
    if !matches!(backend, "azure" | "file" | "env") {
        return Err(crate::types::Error::Validation {
            field: field.to_string(),
            message: format!(
                "Invalid vault backend '{}'. Must be one of: azure, file, env",
                backend
            ),
        });
    }
    Ok(())
}

/// Vault calls must finish before the server gives up on the request
pub(crate) fn validate_vault_budget(vault_timeout: u64, server_timeout: u64) -> Result<()> {
    if vault_timeout >= server_timeout {
        return Err(crate::types::Error::Validation {
            field: "vault.request_timeout".to_string(),
            message: format!(
                "Vault timeout ({}s) must be shorter than server.request_timeout ({}s)",
                vault_timeout, server_timeout
            ),
        });
    }
    Ok(())
}

/// Validate an absolute http(s) endpoint URL
pub(crate) fn validate_endpoint_url(endpoint: &str, field: &str) -> Result<()> {
    let url = reqwest::Url::parse(endpoint).map_err(|e| crate::types::Error::Validation {
        field: field.to_string(),
        message: format!("Invalid endpoint URL '{}': {}", endpoint, e),
    })?;

    if !matches!(url.scheme(), "https" | "http") {
        return Err(crate::types::Error::Validation {
            field: field.to_string(),
            message: format!(
                "Endpoint '{}' must use http or https, got '{}'",
                endpoint,
                url.scheme()
            ),
        });
    }

    if url.host_str().is_none() {
        return Err(crate::types::Error::Validation {
            field: field.to_string(),
            message: format!("Endpoint '{}' has no host", endpoint),
        });
    }

    Ok(())
}

/// Validate a route path used for an auxiliary endpoint
pub(crate) fn validate_route_path(path: &str, field: &str) -> Result<()> {
    if !path.starts_with('/') || path.len() < 2 {
        return Err(crate::types::Error::Validation {
            field: field.to_string(),
            message: format!("Path '{}' must start with '/' and not be the root", path),
        });
    }
    if path.starts_with(crate::http::API_PREFIX) {
        return Err(crate::types::Error::Validation {
            field: field.to_string(),
            message: format!(
                "Path '{}' collides with the API prefix '{}'",
                path,
                crate::http::API_PREFIX
            ),
        });
    }
    Ok(())
}

/// Validate that a file exists
async fn validate_file_exists(path: &str, field: &str) -> Result<()> {
    let metadata =
        tokio::fs::metadata(path)
            .await
            .map_err(|e| crate::types::Error::Validation {
                field: field.to_string(),
                message: format!("Cannot access file '{}': {}", path, e),
            })?;

    if !metadata.is_file() {
        return Err(crate::types::Error::Validation {
            field: field.to_string(),
            message: format!("Path '{}' is not a regular file", path),
        });
    }

    Ok(())
}

impl SystemConfig {
    /// Validate the configuration
    pub async fn validate(&self) -> Result<()> {
        // Validate server configuration
        validate_listen_address(&self.server.listen)?;
        validate_positive_timeout(self.server.request_timeout, "server.request_timeout")?;

        // Validate logging configuration
        if !crate::logging::level::ALL.contains(&self.logging.level.as_str()) {
            return Err(crate::types::Error::Validation {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ),
            });
        }

        if !crate::logging::format::ALL.contains(&self.logging.format.as_str()) {
            return Err(crate::types::Error::Validation {
                field: "logging.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Must be one of: json, pretty",
                    self.logging.format
                ),
            });
        }

        // Validate monitoring configuration
        if self.monitoring.metrics_enabled {
            validate_route_path(&self.monitoring.metrics_path, "monitoring.metrics_path")?;
        }

        // Validate vault configuration
        validate_vault_backend(&self.vault.backend, "vault.backend")?;
        validate_positive_timeout(self.vault.request_timeout, "vault.request_timeout")?;
        validate_vault_budget(self.vault.request_timeout, self.server.request_timeout)?;

        Ok(())
    }

    /// Check that the configured vault can be built: endpoint URL for
    /// `azure`, a readable secrets file for `file`
    pub async fn validate_vault_settings(&self) -> Result<()> {
        match self.vault.backend.as_str() {
            "azure" => {
                // A missing endpoint is allowed: the service starts degraded
                if let Some(endpoint) = self.vault.resolved_endpoint() {
                    validate_endpoint_url(&endpoint, "vault.endpoint")?;
                }
            }
            "file" => validate_file_exists(&self.vault.secrets_file, "vault.secrets_file").await?,
            _ => {}
        }

        Ok(())
    }
}
