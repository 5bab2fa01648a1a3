//! Secret vault access
//!
//! This module wraps the external secret vault behind a small interface:
//! fetch one secret, fetch several, and check that the vault is reachable.
//!
//! # Features
//! - Pluggable loaders: Azure Key Vault REST, key=value file, environment
//! - Fallible construction with a degraded fallback that reports every
//!   lookup as failed instead of aborting startup
//! - Redacting secret value type that is zeroed on drop
//! - Display masking helpers for passwords, API keys and connection strings

pub mod azure;
pub mod credential;
pub mod loader;
pub mod manager;
pub mod masking;
pub mod value;

pub use azure::AzureKeyVaultLoader;
pub use credential::AzureCredential;
pub use loader::{EnvSecretLoader, FileSecretLoader, SecretLoader};
pub use manager::SecretManager;
pub use masking::{mask_api_key, mask_connection_string, mask_password, mask_secret_value};
pub use value::{Secret, SecretValue};

/// Errors raised at the vault boundary
///
/// Callers of [`SecretManager`] never see these: they are logged and
/// collapsed into "not found" / "not accessible".
#[derive(thiserror::Error, Debug)]
pub enum SecretError {
    #[error("Secret '{0}' not found")]
    NotFound(String),

    #[error("Secret vault is unavailable: {0}")]
    Unavailable(String),

    #[error("Secret vault rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("Secret vault request failed: {0}")]
    Request(String),

    #[error("Failed to decode secret vault response: {0}")]
    Decode(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Secret source '{0}' is not available")]
    SourceNotAvailable(String),

    #[error("Failed to parse secrets file '{0}': {1}")]
    FileParseError(String, String),

    #[error("Secret client is not initialized: {0}")]
    Degraded(String),

    #[error("Secret vault did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_error_messages() {
        assert_eq!(
            SecretError::NotFound("ftp-password".to_string()).to_string(),
            "Secret 'ftp-password' not found"
        );
        assert_eq!(
            SecretError::Degraded("no endpoint".to_string()).to_string(),
            "Secret client is not initialized: no endpoint"
        );
        assert_eq!(
            SecretError::FileParseError("/tmp/s".to_string(), "boom".to_string()).to_string(),
            "Failed to parse secrets file '/tmp/s': boom"
        );
    }
}
