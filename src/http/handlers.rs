//! HTTP endpoint handlers for the FTP API
//!
//! Every API endpoint answers 200 and reports its outcome in the body;
//! vault and transfer failures never surface as HTTP errors.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, warn, Instrument};

use crate::{
    config::{AppConfig, SystemConfig},
    http::responses::*,
    logging,
    secrets::SecretManager,
    transfer::FtpSimulator,
    types::Error,
};

/// Application state shared across handlers
pub struct AppState {
    pub system_config: SystemConfig,
    pub app_config: Arc<AppConfig>,
    pub secret_manager: Arc<SecretManager>,
    pub simulator: FtpSimulator,
}

impl AppState {
    pub fn new(
        system_config: SystemConfig,
        app_config: Arc<AppConfig>,
        secret_manager: Arc<SecretManager>,
    ) -> Self {
        Self {
            system_config,
            simulator: FtpSimulator::new(app_config.clone()),
            app_config,
            secret_manager,
        }
    }
}

/// GET /health
pub async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let accessible = state.secret_manager.is_accessible().await;
    Json(HealthResponse::new(accessible))
}

/// GET /config - configuration with sensitive values masked
pub async fn handle_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse::from(state.app_config.as_ref()))
}

/// POST /test-connection
pub async fn handle_test_connection(
    State(state): State<Arc<AppState>>,
) -> Json<ConnectionResponse> {
    Json(ConnectionResponse::new(state.simulator.connect()))
}

/// POST /upload?localPath=..&remotePath=..
pub async fn handle_upload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransferQuery>,
) -> Json<TransferResponse> {
    let success = state
        .simulator
        .upload(&query.local_path, &query.remote_path);
    Json(TransferResponse::upload(success, query))
}

/// POST /download?remotePath=..&localPath=..
pub async fn handle_download(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransferQuery>,
) -> Json<TransferResponse> {
    let success = state
        .simulator
        .download(&query.remote_path, &query.local_path);
    Json(TransferResponse::download(success, query))
}

/// GET /secret/{secretName}
pub async fn handle_get_secret(
    State(state): State<Arc<AppState>>,
    Path(secret_name): Path<String>,
) -> Json<SecretResponse> {
    let secret = state
        .secret_manager
        .get_secret(&secret_name)
        .instrument(logging::secret_span(&secret_name))
        .await;

    match secret {
        Some(secret) => {
            info!(secret_name = %secret_name, "Secret lookup succeeded");
            Json(SecretResponse::found(secret_name, secret.value.expose()))
        }
        None => Json(SecretResponse::not_found(secret_name)),
    }
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn handle_metrics() -> Result<impl IntoResponse, Error> {
    match crate::metrics::gather_metrics() {
        Ok(metrics_text) => Ok((
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            metrics_text,
        )),
        Err(e) => {
            warn!(error = %e, "Failed to gather Prometheus metrics");
            Err(Error::Application(e))
        }
    }
}

/// Fallback handler for 404 Not Found
pub async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::with_code("Endpoint not found", "NOT_FOUND")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::manager::tests::StaticLoader;
    use http_body_util::BodyExt;
    use serde_json::Value;

    fn create_test_state(app_config: AppConfig, secret_manager: SecretManager) -> Arc<AppState> {
        Arc::new(AppState::new(
            SystemConfig::default(),
            Arc::new(app_config),
            Arc::new(secret_manager),
        ))
    }

    fn healthy_vault() -> SecretManager {
        SecretManager::from_loader(Box::new(StaticLoader::with(&[
            ("ftp-password", "hunter2"),
            ("short", "abc"),
        ])))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_handle_health_reachable() {
        let state = create_test_state(AppConfig::default(), healthy_vault());
        let response = handle_health(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "UP");
        assert_eq!(json["keyVaultAccessible"], true);
        assert!(json["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_handle_health_degraded() {
        let state = create_test_state(AppConfig::default(), SecretManager::degraded("no endpoint"));
        let response = handle_health(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "UP");
        assert_eq!(json["keyVaultAccessible"], false);
    }

    #[tokio::test]
    async fn test_handle_config_defaults() {
        let state = create_test_state(AppConfig::default(), healthy_vault());
        let json = body_json(handle_config(State(state)).await.into_response()).await;

        assert_eq!(json["ftpServer"], "localhost");
        assert_eq!(json["ftpUsername"], "defaultUser");
        assert_eq!(json["ftpPassword"], "de****");
        assert_eq!(
            json["databaseConnectionString"],
            "jdbc:mysql://localhost:3306/testdb"
        );
        assert_eq!(json["apiKey"], "defa****");
    }

    #[tokio::test]
    async fn test_handle_test_connection() {
        let state = create_test_state(AppConfig::default(), healthy_vault());
        let json = body_json(handle_test_connection(State(state)).await.into_response()).await;
        assert_eq!(json["connected"], true);
        assert_eq!(json["message"], "FTP connection successful");

        let config = AppConfig {
            ftp_server: String::new(),
            ..AppConfig::default()
        };
        let state = create_test_state(config, healthy_vault());
        let json = body_json(handle_test_connection(State(state)).await.into_response()).await;
        assert_eq!(json["connected"], false);
        assert_eq!(json["message"], "FTP connection failed");
    }

    #[tokio::test]
    async fn test_handle_upload_and_download() {
        let state = create_test_state(AppConfig::default(), healthy_vault());
        let query = TransferQuery {
            local_path: "/tmp/report.csv".to_string(),
            remote_path: "/incoming/report.csv".to_string(),
        };

        let json = body_json(
            handle_upload(State(state.clone()), Query(query.clone()))
                .await
                .into_response(),
        )
        .await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "File uploaded successfully");
        assert_eq!(json["localPath"], "/tmp/report.csv");
        assert_eq!(json["remotePath"], "/incoming/report.csv");

        let json = body_json(
            handle_download(State(state), Query(query))
                .await
                .into_response(),
        )
        .await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "File downloaded successfully");
    }

    #[tokio::test]
    async fn test_handle_upload_without_credentials() {
        let config = AppConfig {
            ftp_password: String::new(),
            ..AppConfig::default()
        };
        let state = create_test_state(config, healthy_vault());
        let query = TransferQuery {
            local_path: String::new(),
            remote_path: String::new(),
        };

        let response = handle_upload(State(state.clone()), Query(query.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "File upload failed");

        let json = body_json(
            handle_download(State(state), Query(query))
                .await
                .into_response(),
        )
        .await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "File download failed");
    }

    #[tokio::test]
    async fn test_handle_get_secret() {
        let state = create_test_state(AppConfig::default(), healthy_vault());

        let json = body_json(
            handle_get_secret(State(state.clone()), Path("ftp-password".to_string()))
                .await
                .into_response(),
        )
        .await;
        assert_eq!(json["secretName"], "ftp-password");
        assert_eq!(json["secretValue"], "hunt****");
        assert_eq!(json["status"], "found");

        let json = body_json(
            handle_get_secret(State(state.clone()), Path("short".to_string()))
                .await
                .into_response(),
        )
        .await;
        assert_eq!(json["secretValue"], "****");

        let json = body_json(
            handle_get_secret(State(state), Path("missing".to_string()))
                .await
                .into_response(),
        )
        .await;
        assert_eq!(json["secretName"], "missing");
        assert_eq!(json["status"], "not found");
        assert!(json.get("secretValue").is_none());
    }

    #[tokio::test]
    async fn test_failing_vault_reports_not_found() {
        let state = create_test_state(
            AppConfig::default(),
            SecretManager::from_loader(Box::new(StaticLoader::failing())),
        );

        let json = body_json(handle_health(State(state.clone())).await.into_response()).await;
        assert_eq!(json["keyVaultAccessible"], false);

        for name in ["ftp-password", "api-key", "anything"] {
            let response = handle_get_secret(State(state.clone()), Path(name.to_string()))
                .await
                .into_response();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert_eq!(json["status"], "not found");
        }
    }

    #[tokio::test]
    async fn test_handle_not_found() {
        let response = handle_not_found().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_handle_metrics() {
        crate::metrics::init_metrics();
        let response = handle_metrics().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
