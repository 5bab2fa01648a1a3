//! Secret manager: the service-facing view of the vault
//!
//! Every lookup goes to the loader; nothing is cached. Failures are logged
//! here and never propagated to callers.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{
    AzureCredential, AzureKeyVaultLoader, EnvSecretLoader, FileSecretLoader, Secret, SecretError,
    SecretLoader, SecretValue,
};
use crate::config::VaultConfig;

enum ClientState {
    Ready(Box<dyn SecretLoader>),
    Degraded(String),
}

/// Deadline for one lookup or probe when none is configured
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Vault client wrapper with a degraded fallback
///
/// Each lookup or probe runs under a single deadline covering every request
/// it makes (token refresh included). Expiry counts as a vault failure.
pub struct SecretManager {
    state: ClientState,
    timeout: Duration,
}

impl SecretManager {
    /// Build the configured loader, failing if it cannot be constructed
    pub fn connect(config: &VaultConfig) -> Result<Self, SecretError> {
        let loader: Box<dyn SecretLoader> = match config.backend.as_str() {
            "azure" => {
                let endpoint = config.resolved_endpoint().ok_or_else(|| {
                    SecretError::Unavailable("no vault endpoint configured".to_string())
                })?;
                let credential = AzureCredential::from_env()?;
                Box::new(AzureKeyVaultLoader::new(
                    &endpoint,
                    &config.api_version,
                    config.request_timeout,
                    credential,
                )?)
            }
            "file" => Box::new(FileSecretLoader::new(config.secrets_file.clone())),
            "env" => Box::new(EnvSecretLoader::new(config.env_prefix.clone())),
            other => {
                return Err(SecretError::SourceNotAvailable(format!(
                    "unknown vault backend '{}'",
                    other
                )));
            }
        };

        Ok(Self::from_loader(loader).with_timeout(Duration::from_secs(config.request_timeout)))
    }

    /// Like [`SecretManager::connect`], but a failure is logged and yields
    /// a degraded manager instead of an error
    pub fn initialize(config: &VaultConfig) -> Self {
        match Self::connect(config) {
            Ok(manager) => {
                info!(
                    backend = manager.backend_name(),
                    "Secret vault client initialized successfully"
                );
                manager
            }
            Err(e) => {
                error!(
                    backend = %config.backend,
                    error = %e,
                    "Failed to initialize secret vault client"
                );
                Self::degraded(e.to_string())
            }
        }
    }

    pub fn from_loader(loader: Box<dyn SecretLoader>) -> Self {
        Self {
            state: ClientState::Ready(loader),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// A manager whose every operation reports failure
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            state: ClientState::Degraded(reason.into()),
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.state, ClientState::Degraded(_))
    }

    /// Loader name for logging, `degraded` when no loader exists
    pub fn backend_name(&self) -> &'static str {
        match &self.state {
            ClientState::Ready(loader) => loader.name(),
            ClientState::Degraded(_) => "degraded",
        }
    }

    fn loader(&self) -> Result<&dyn SecretLoader, SecretError> {
        match &self.state {
            ClientState::Ready(loader) => Ok(loader.as_ref()),
            ClientState::Degraded(reason) => Err(SecretError::Degraded(reason.clone())),
        }
    }

    async fn within_deadline<T>(
        &self,
        operation: impl Future<Output = Result<T, SecretError>>,
    ) -> Result<T, SecretError> {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(SecretError::Timeout(self.timeout)),
        }
    }

    /// Fetch a secret, keeping "absent" and "failed" apart
    pub async fn try_get_secret(&self, name: &str) -> Result<Option<SecretValue>, SecretError> {
        let loader = self.loader()?;
        let value = self.within_deadline(loader.load_secret(name)).await?;
        Ok(value.map(SecretValue::new))
    }

    /// Fetch a secret; any failure is logged and reported as not found
    pub async fn get_secret(&self, name: &str) -> Option<Secret> {
        match self.try_get_secret(name).await {
            Ok(Some(value)) => {
                debug!("Successfully retrieved secret: {}", name);
                crate::metrics::record_secret_lookup("found");
                Some(Secret {
                    name: name.to_string(),
                    value,
                })
            }
            Ok(None) => {
                warn!("Failed to retrieve secret '{}': not found", name);
                crate::metrics::record_secret_lookup("not_found");
                None
            }
            Err(e) => {
                error!("Failed to retrieve secret '{}': {}", name, e);
                crate::metrics::record_secret_lookup("error");
                None
            }
        }
    }

    /// Fetch several secrets, omitting names that did not resolve
    pub async fn get_secrets(&self, names: &[&str]) -> HashMap<String, String> {
        let mut secrets = HashMap::new();
        for name in names {
            if let Some(secret) = self.get_secret(name).await {
                secrets.insert(secret.name.clone(), secret.value.expose().to_string());
            }
        }
        secrets
    }

    /// Reachability check; false on any failure
    pub async fn is_accessible(&self) -> bool {
        let result = match self.loader() {
            Ok(loader) => self.within_deadline(loader.probe()).await,
            Err(e) => Err(e),
        };

        crate::metrics::record_vault_probe(result.is_ok());
        match result {
            Ok(()) => true,
            Err(e) => {
                error!(backend = self.backend_name(), "Key Vault is not accessible: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// In-memory loader for tests
    pub(crate) struct StaticLoader {
        pub secrets: HashMap<String, String>,
        pub fail: bool,
    }

    impl StaticLoader {
        pub(crate) fn with(secrets: &[(&str, &str)]) -> Self {
            Self {
                secrets: secrets
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                fail: false,
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                secrets: HashMap::new(),
                fail: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl SecretLoader for StaticLoader {
        async fn load_secret(&self, name: &str) -> Result<Option<String>, SecretError> {
            if self.fail {
                return Err(SecretError::Unavailable("simulated outage".to_string()));
            }
            Ok(self.secrets.get(name).cloned())
        }

        async fn probe(&self) -> Result<(), SecretError> {
            if self.fail {
                Err(SecretError::Unavailable("simulated outage".to_string()))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &'static str {
            "static"
        }
    }

    /// Loader that answers only after `delay`
    pub(crate) struct SlowLoader {
        pub delay: Duration,
    }

    #[async_trait::async_trait]
    impl SecretLoader for SlowLoader {
        async fn load_secret(&self, _name: &str) -> Result<Option<String>, SecretError> {
            tokio::time::sleep(self.delay).await;
            Ok(Some("late".to_string()))
        }

        async fn probe(&self) -> Result<(), SecretError> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_get_secret_found() {
        let manager =
            SecretManager::from_loader(Box::new(StaticLoader::with(&[("api-key", "abcdef")])));

        let secret = manager.get_secret("api-key").await.unwrap();
        assert_eq!(secret.name, "api-key");
        assert_eq!(secret.value.expose(), "abcdef");
        assert!(!manager.is_degraded());
        assert_eq!(manager.backend_name(), "static");
    }

    #[tokio::test]
    async fn test_get_secret_not_found() {
        let manager = SecretManager::from_loader(Box::new(StaticLoader::with(&[])));
        assert!(manager.get_secret("missing").await.is_none());
        assert!(manager.try_get_secret("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failure_collapses_to_not_found() {
        let manager = SecretManager::from_loader(Box::new(StaticLoader::failing()));

        assert!(manager.get_secret("api-key").await.is_none());
        assert!(matches!(
            manager.try_get_secret("api-key").await,
            Err(SecretError::Unavailable(_))
        ));
        assert!(!manager.is_accessible().await);
    }

    #[tokio::test]
    async fn test_get_secrets_omits_missing() {
        let manager = SecretManager::from_loader(Box::new(StaticLoader::with(&[
            ("ftp-username", "svc"),
            ("ftp-password", "pw"),
        ])));

        let secrets = manager
            .get_secrets(&["ftp-username", "ftp-password", "api-key"])
            .await;
        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets.get("ftp-username"), Some(&"svc".to_string()));
        assert_eq!(secrets.get("ftp-password"), Some(&"pw".to_string()));
        assert!(!secrets.contains_key("api-key"));
    }

    #[tokio::test]
    async fn test_degraded_manager() {
        let manager = SecretManager::degraded("no endpoint");

        assert!(manager.is_degraded());
        assert_eq!(manager.backend_name(), "degraded");
        assert!(manager.get_secret("api-key").await.is_none());
        assert!(manager.get_secrets(&["a", "b"]).await.is_empty());
        assert!(!manager.is_accessible().await);
        assert!(matches!(
            manager.try_get_secret("api-key").await,
            Err(SecretError::Degraded(_))
        ));
    }

    #[tokio::test]
    async fn test_initialize_with_malformed_endpoint_is_degraded() {
        let config = VaultConfig {
            backend: "azure".to_string(),
            endpoint: Some("not a url".to_string()),
            ..Default::default()
        };
        let manager = SecretManager::initialize(&config);
        assert!(manager.is_degraded());
        assert!(!manager.is_accessible().await);
    }

    #[tokio::test]
    async fn test_slow_vault_hits_deadline() {
        let manager = SecretManager::from_loader(Box::new(SlowLoader {
            delay: Duration::from_secs(5),
        }))
        .with_timeout(Duration::from_millis(50));

        let started = std::time::Instant::now();
        assert!(!manager.is_accessible().await);
        assert!(manager.get_secret("api-key").await.is_none());
        assert!(matches!(
            manager.try_get_secret("api-key").await,
            Err(SecretError::Timeout(_))
        ));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_connect_unknown_backend() {
        let config = VaultConfig {
            backend: "aws".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            SecretManager::connect(&config),
            Err(SecretError::SourceNotAvailable(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_file_backend() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "ftp-password=from-file").unwrap();
        temp_file.flush().unwrap();

        let config = VaultConfig {
            backend: "file".to_string(),
            secrets_file: temp_file.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        let manager = SecretManager::connect(&config).unwrap();

        assert_eq!(manager.backend_name(), "file");
        assert!(manager.is_accessible().await);
        assert_eq!(
            manager.get_secret("ftp-password").await.unwrap().value.expose(),
            "from-file"
        );
    }
}
