//! Secret loader implementations for different sources

use std::collections::HashMap;
use std::env;
use tokio::fs;
use tracing::{debug, trace, warn};

use super::SecretError;

/// Trait for loading secrets from a vault-like source
#[async_trait::async_trait]
pub trait SecretLoader: Send + Sync {
    /// Load a secret by name, returning None if it does not exist
    async fn load_secret(&self, name: &str) -> Result<Option<String>, SecretError>;

    /// Lightweight reachability check
    async fn probe(&self) -> Result<(), SecretError>;

    /// Get the name of this loader for logging
    fn name(&self) -> &'static str;
}

/// Environment variable secret loader
pub struct EnvSecretLoader {
    prefix: String,
}

impl EnvSecretLoader {
    pub fn new(prefix: String) -> Self {
        Self { prefix }
    }

    /// `api-key` with prefix `FTPVAULT` -> `FTPVAULT_API_KEY`
    fn variable_name(&self, name: &str) -> String {
        let key = name.replace(['-', '.'], "_").to_uppercase();
        if self.prefix.is_empty() {
            key
        } else {
            format!("{}_{}", self.prefix, key)
        }
    }
}

#[async_trait::async_trait]
impl SecretLoader for EnvSecretLoader {
    async fn load_secret(&self, name: &str) -> Result<Option<String>, SecretError> {
        let variable = self.variable_name(name);

        match env::var(&variable) {
            Ok(value) => {
                trace!("Found secret '{}' as '{}' in environment", name, variable);
                Ok(Some(value))
            }
            Err(env::VarError::NotPresent) => {
                trace!("Secret '{}' not found in environment (tried '{}')", name, variable);
                Ok(None)
            }
            Err(env::VarError::NotUnicode(_)) => Err(SecretError::Decode(format!(
                "Environment variable '{}' contains invalid UTF-8",
                variable
            ))),
        }
    }

    async fn probe(&self) -> Result<(), SecretError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

/// File-based secret loader for key=value format
///
/// The file is re-read on every lookup so edits are visible immediately.
pub struct FileSecretLoader {
    file_path: String,
}

impl FileSecretLoader {
    pub fn new(file_path: String) -> Self {
        Self { file_path }
    }

    /// Parse key=value file format with comment support
    async fn parse_secrets_file(&self) -> Result<HashMap<String, String>, SecretError> {
        let content = fs::read_to_string(&self.file_path).await.map_err(|e| {
            SecretError::FileParseError(
                self.file_path.clone(),
                format!("Failed to read file: {}", e),
            )
        })?;

        Ok(parse_secrets(&content, &self.file_path))
    }
}

/// Parse `key=value` lines, skipping blanks and `#` comments
pub(crate) fn parse_secrets(content: &str, origin: &str) -> HashMap<String, String> {
    let mut secrets = HashMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_string();
            let value = value.trim().to_string();

            if key.is_empty() {
                warn!(
                    "Empty key found in secrets file '{}' at line {}",
                    origin,
                    line_num + 1
                );
                continue;
            }

            secrets.insert(key, value);
        } else {
            // The line itself may be a secret, so only its position is logged
            warn!(
                "Invalid line format in secrets file '{}' at line {}",
                origin,
                line_num + 1
            );
        }
    }

    debug!("Parsed {} secrets from '{}'", secrets.len(), origin);
    secrets
}

#[async_trait::async_trait]
impl SecretLoader for FileSecretLoader {
    async fn load_secret(&self, name: &str) -> Result<Option<String>, SecretError> {
        let mut secrets = self.parse_secrets_file().await?;
        match secrets.remove(name) {
            Some(value) => {
                trace!("Found secret '{}' in file '{}'", name, self.file_path);
                Ok(Some(value))
            }
            None => {
                trace!("Secret '{}' not found in file '{}'", name, self.file_path);
                Ok(None)
            }
        }
    }

    async fn probe(&self) -> Result<(), SecretError> {
        match fs::metadata(&self.file_path).await {
            Ok(metadata) if metadata.is_file() => Ok(()),
            Ok(_) => Err(SecretError::SourceNotAvailable(format!(
                "file:{} is not a regular file",
                self.file_path
            ))),
            Err(e) => Err(SecretError::SourceNotAvailable(format!(
                "file:{}: {}",
                self.file_path, e
            ))),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
