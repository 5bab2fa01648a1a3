//! HTTP request and response types for the FTP API
//!
//! Field names are serialized in camelCase to keep the wire format stable
//! for existing clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AppConfig;
use crate::secrets::{mask_api_key, mask_connection_string, mask_password, mask_secret_value};
use crate::types::Error;

pub const STATUS_UP: &str = "UP";
pub const SECRET_FOUND: &str = "found";
pub const SECRET_NOT_FOUND: &str = "not found";

/// Query parameters for POST /upload and POST /download
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferQuery {
    pub local_path: String,
    pub remote_path: String,
}

/// GET /health
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub key_vault_accessible: bool,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl HealthResponse {
    pub fn new(key_vault_accessible: bool) -> Self {
        Self {
            status: STATUS_UP.to_string(),
            key_vault_accessible,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// GET /config, with sensitive values masked
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub ftp_server: String,
    pub ftp_username: String,
    pub ftp_password: String,
    pub database_connection_string: String,
    pub api_key: String,
}

impl From<&AppConfig> for ConfigResponse {
    fn from(config: &AppConfig) -> Self {
        Self {
            ftp_server: config.ftp_server.clone(),
            ftp_username: config.ftp_username.clone(),
            ftp_password: mask_password(&config.ftp_password),
            database_connection_string: mask_connection_string(
                &config.database_connection_string,
            ),
            api_key: mask_api_key(&config.api_key),
        }
    }
}

/// POST /test-connection
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionResponse {
    pub connected: bool,
    pub message: String,
}

impl ConnectionResponse {
    pub fn new(connected: bool) -> Self {
        let message = if connected {
            "FTP connection successful"
        } else {
            "FTP connection failed"
        };
        Self {
            connected,
            message: message.to_string(),
        }
    }
}

/// POST /upload and POST /download
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub success: bool,
    pub message: String,
    pub local_path: String,
    pub remote_path: String,
}

impl TransferResponse {
    pub fn upload(success: bool, query: TransferQuery) -> Self {
        let message = if success {
            "File uploaded successfully"
        } else {
            "File upload failed"
        };
        Self::with_message(success, message, query)
    }

    pub fn download(success: bool, query: TransferQuery) -> Self {
        let message = if success {
            "File downloaded successfully"
        } else {
            "File download failed"
        };
        Self::with_message(success, message, query)
    }

    fn with_message(success: bool, message: &str, query: TransferQuery) -> Self {
        Self {
            success,
            message: message.to_string(),
            local_path: query.local_path,
            remote_path: query.remote_path,
        }
    }
}

/// GET /secret/{secretName}
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretResponse {
    pub secret_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_value: Option<String>,
    pub status: String,
}

impl SecretResponse {
    /// Masks `value` with the generic secret rule
    pub fn found(secret_name: String, value: &str) -> Self {
        Self {
            secret_name,
            secret_value: Some(mask_secret_value(value)),
            status: SECRET_FOUND.to_string(),
        }
    }

    pub fn not_found(secret_name: String) -> Self {
        Self {
            secret_name,
            secret_value: None,
            status: SECRET_NOT_FOUND.to_string(),
        }
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &Error) -> Self {
        Self::with_code(error.to_string(), error_to_code(error))
    }

    pub fn with_code(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: BTreeMap<String, String>) -> Self {
        self.details = Some(details);
        self
    }
}

fn error_to_code(error: &Error) -> &'static str {
    match error {
        Error::Config(_) => "CONFIG_ERROR",
        Error::Secret(_) => "SECRET_ERROR",
        Error::Validation { .. } => "VALIDATION_ERROR",
        Error::Io(_) => "IO_ERROR",
        Error::Application(_) => "APPLICATION_ERROR",
    }
}

/// Convert error types to HTTP status codes
pub fn error_to_status_code(error: &Error) -> StatusCode {
    match error {
        Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::Secret(_) => StatusCode::BAD_GATEWAY,
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Error::Application(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = error_to_status_code(&self);
        let mut error_response = ErrorResponse::new(&self);
        if let Error::Validation { field, .. } = &self {
            error_response =
                error_response.with_details(BTreeMap::from([("field".to_string(), field.clone())]));
        }
        (status_code, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretError;

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_value(HealthResponse::new(true)).unwrap();
        assert_eq!(json["status"], "UP");
        assert_eq!(json["keyVaultAccessible"], true);
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_config_response_masks_sensitive_fields() {
        let config = AppConfig {
            ftp_username: "svc".to_string(),
            ftp_password: "hunter2".to_string(),
            ftp_server: "ftp.example.com".to_string(),
            database_connection_string: "jdbc:mysql://h/db;password=secret;x=1".to_string(),
            api_key: "abcd1234".to_string(),
        };

        let json = serde_json::to_value(ConfigResponse::from(&config)).unwrap();
        assert_eq!(json["ftpServer"], "ftp.example.com");
        assert_eq!(json["ftpUsername"], "svc");
        assert_eq!(json["ftpPassword"], "hu****");
        assert_eq!(
            json["databaseConnectionString"],
            "jdbc:mysql://h/db;password=****;x=1"
        );
        assert_eq!(json["apiKey"], "abcd****");
    }

    #[test]
    fn test_transfer_response_messages() {
        let query = TransferQuery {
            local_path: "/tmp/a".to_string(),
            remote_path: "/in/a".to_string(),
        };

        let json = serde_json::to_value(TransferResponse::upload(true, query.clone())).unwrap();
        assert_eq!(json["message"], "File uploaded successfully");
        assert_eq!(json["localPath"], "/tmp/a");
        assert_eq!(json["remotePath"], "/in/a");

        let json = serde_json::to_value(TransferResponse::download(false, query)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "File download failed");
    }

    #[test]
    fn test_secret_response_not_found_omits_value() {
        let json = serde_json::to_value(SecretResponse::not_found("api-key".to_string())).unwrap();
        assert_eq!(json["secretName"], "api-key");
        assert_eq!(json["status"], "not found");
        assert!(json.get("secretValue").is_none());

        let json =
            serde_json::to_value(SecretResponse::found("api-key".to_string(), "abcdef")).unwrap();
        assert_eq!(json["secretValue"], "abcd****");
        assert_eq!(json["status"], "found");
    }

    #[test]
    fn test_error_response_creation() {
        let error = Error::Validation {
            field: "server.listen".to_string(),
            message: "bad address".to_string(),
        };

        let response = ErrorResponse::new(&error);
        assert_eq!(response.code, "VALIDATION_ERROR");
        assert!(response.error.contains("bad address"));
    }

    #[test]
    fn test_error_to_status_code() {
        assert_eq!(
            error_to_status_code(&Error::Secret(SecretError::Unavailable("x".to_string()))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_to_status_code(&Error::Application("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
