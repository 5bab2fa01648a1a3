//! Azure Key Vault loader over the REST API

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

use super::{AzureCredential, SecretError, SecretLoader};

#[derive(Deserialize)]
struct SecretBundle {
    value: Option<String>,
}

/// Thin adapter over `GET /secrets/{name}` and `GET /secrets`
pub struct AzureKeyVaultLoader {
    client: Client,
    endpoint: Url,
    api_version: String,
    credential: AzureCredential,
}

impl AzureKeyVaultLoader {
    /// Create a loader for the vault at `endpoint`
    pub fn new(
        endpoint: &str,
        api_version: &str,
        timeout_seconds: u64,
        credential: AzureCredential,
    ) -> Result<Self, SecretError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SecretError::Unavailable(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(SecretError::Unavailable(format!(
                "endpoint '{}' cannot be used as a base URL",
                endpoint
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| SecretError::Request(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            endpoint = %endpoint,
            api_version = api_version,
            credential = credential.kind(),
            "Azure Key Vault loader created"
        );

        Ok(Self {
            client,
            endpoint,
            api_version: api_version.to_string(),
            credential,
        })
    }

    /// `{endpoint}/secrets/{name}?api-version=...`, with the name percent-encoded
    pub(crate) fn secret_url(&self, name: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("secrets").push(name);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("api-version", &self.api_version);
        url
    }

    /// `{endpoint}/secrets?maxresults=1&api-version=...`
    pub(crate) fn list_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("secrets");
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("maxresults", "1")
            .append_pair("api-version", &self.api_version);
        url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, SecretError> {
        let token = self.credential.token(&self.client).await?;
        self.client
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SecretError::Unavailable(format!("request timed out: {}", e))
                } else if e.is_connect() {
                    SecretError::Unavailable(format!("failed to connect: {}", e))
                } else {
                    SecretError::Request(e.to_string())
                }
            })
    }
}

/// Map a non-success vault status to an error
pub(crate) fn status_error(status: StatusCode, context: &str) -> SecretError {
    let reason = format!(
        "{} returned {} {}",
        context,
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    match status {
        StatusCode::NOT_FOUND => SecretError::NotFound(context.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SecretError::Unauthorized(reason),
        s if s.is_server_error() => SecretError::Unavailable(reason),
        _ => SecretError::Request(reason),
    }
}

#[async_trait::async_trait]
impl SecretLoader for AzureKeyVaultLoader {
    async fn load_secret(&self, name: &str) -> Result<Option<String>, SecretError> {
        let response = self.get(self.secret_url(name)).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            trace!("Secret '{}' not found in Key Vault", name);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(status, &format!("secret '{}'", name)));
        }

        let bundle: SecretBundle = response
            .json()
            .await
            .map_err(|e| SecretError::Decode(format!("secret '{}': {}", name, e)))?;

        // A secret without a value (e.g. disabled) is reported as absent
        Ok(bundle.value)
    }

    async fn probe(&self) -> Result<(), SecretError> {
        let response = self.get(self.list_url()).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status, "secret listing"))
        }
    }

    fn name(&self) -> &'static str {
        "azure"
    }
}
