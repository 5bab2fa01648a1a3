//! Ambient credentials for the Azure Key Vault loader
//!
//! Resolution order:
//! 1. `AZURE_ACCESS_TOKEN`: a pre-issued bearer token
//! 2. `AZURE_TENANT_ID` + `AZURE_CLIENT_ID` + `AZURE_CLIENT_SECRET`:
//!    OAuth2 client-credentials flow against the Microsoft identity platform

use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use super::{SecretError, SecretValue};

pub const ACCESS_TOKEN_VAR: &str = "AZURE_ACCESS_TOKEN";
pub const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";
pub const CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "AZURE_CLIENT_SECRET";
pub const AUTHORITY_HOST_VAR: &str = "AZURE_AUTHORITY_HOST";

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
const VAULT_SCOPE: &str = "https://vault.azure.net/.default";

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: SecretValue,
    expires_at: Instant,
}

/// Bearer-token source for vault requests
pub enum AzureCredential {
    StaticToken(SecretValue),
    ClientSecret {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: SecretValue,
        cached: Mutex<Option<CachedToken>>,
    },
}

impl AzureCredential {
    /// Build a credential from the process environment
    pub fn from_env() -> Result<Self, SecretError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, SecretError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ACCESS_TOKEN_VAR) {
            debug!("Using static access token credential");
            return Ok(AzureCredential::StaticToken(SecretValue::new(token)));
        }

        match (get(TENANT_ID_VAR), get(CLIENT_ID_VAR), get(CLIENT_SECRET_VAR)) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                debug!(tenant_id = %tenant_id, client_id = %client_id, "Using client secret credential");
                Ok(AzureCredential::ClientSecret {
                    authority_host: get(AUTHORITY_HOST_VAR)
                        .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
                    tenant_id,
                    client_id,
                    client_secret: SecretValue::new(client_secret),
                    cached: Mutex::new(None),
                })
            }
            _ => Err(SecretError::Credential(format!(
                "no credential available: set {} or {}, {} and {}",
                ACCESS_TOKEN_VAR, TENANT_ID_VAR, CLIENT_ID_VAR, CLIENT_SECRET_VAR
            ))),
        }
    }

    /// Name of the credential kind for logging
    pub fn kind(&self) -> &'static str {
        match self {
            AzureCredential::StaticToken(_) => "static_token",
            AzureCredential::ClientSecret { .. } => "client_secret",
        }
    }

    /// Return a bearer token, requesting a new one when needed
    pub async fn token(&self, client: &Client) -> Result<SecretValue, SecretError> {
        match self {
            AzureCredential::StaticToken(token) => Ok(token.clone()),
            AzureCredential::ClientSecret {
                authority_host,
                tenant_id,
                client_id,
                client_secret,
                cached,
            } => {
                let mut cached = cached.lock().await;
                if let Some(entry) = cached.as_ref() {
                    if Instant::now() + EXPIRY_MARGIN < entry.expires_at {
                        return Ok(entry.token.clone());
                    }
                }

                let url = format!(
                    "{}/{}/oauth2/v2.0/token",
                    authority_host.trim_end_matches('/'),
                    tenant_id
                );
                let params = [
                    ("grant_type", "client_credentials"),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.expose()),
                    ("scope", VAULT_SCOPE),
                ];

                let response = client
                    .post(&url)
                    .form(&params)
                    .send()
                    .await
                    .map_err(|e| SecretError::Credential(format!("token request failed: {}", e)))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(SecretError::Credential(format!(
                        "token endpoint returned {} {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown")
                    )));
                }

                let body: TokenResponse = response
                    .json()
                    .await
                    .map_err(|e| SecretError::Decode(format!("token response: {}", e)))?;

                debug!(expires_in = body.expires_in, "Acquired vault access token");
                let token = SecretValue::new(body.access_token);
                *cached = Some(CachedToken {
                    token: token.clone(),
                    expires_at: Instant::now() + Duration::from_secs(body.expires_in),
                });
                Ok(token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn test_static_token_credential() {
        let credential = AzureCredential::from_lookup(lookup(&[
            (ACCESS_TOKEN_VAR, "eyJ0eXAi"),
            (TENANT_ID_VAR, "tenant"),
        ]))
        .unwrap();
        assert_eq!(credential.kind(), "static_token");

        let token = credential.token(&Client::new()).await.unwrap();
        assert_eq!(token.expose(), "eyJ0eXAi");
    }

    #[test]
    fn test_client_secret_credential() {
        let credential = AzureCredential::from_lookup(lookup(&[
            (TENANT_ID_VAR, "tenant"),
            (CLIENT_ID_VAR, "client"),
            (CLIENT_SECRET_VAR, "secret"),
        ]))
        .unwrap();
        assert_eq!(credential.kind(), "client_secret");

        match credential {
            AzureCredential::ClientSecret { authority_host, .. } => {
                assert_eq!(authority_host, DEFAULT_AUTHORITY_HOST);
            }
            _ => panic!("Expected client secret credential"),
        }
    }

    #[test]
    fn test_missing_credential() {
        let result = AzureCredential::from_lookup(lookup(&[
            (TENANT_ID_VAR, "tenant"),
            (CLIENT_ID_VAR, "client"),
        ]));
        assert!(matches!(result, Err(SecretError::Credential(_))));

        // Blank values count as missing
        let result = AzureCredential::from_lookup(lookup(&[(ACCESS_TOKEN_VAR, "  ")]));
        assert!(matches!(result, Err(SecretError::Credential(_))));
    }
}
