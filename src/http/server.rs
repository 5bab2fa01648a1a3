//! HTTP server setup, routing and graceful shutdown

use axum::{
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, instrument};

use crate::{
    config::SystemConfig,
    http::{handlers::*, middleware, API_PREFIX},
    types::Result,
};

/// Start the HTTP server and run until `shutdown_signal` resolves
#[instrument(skip_all)]
pub async fn start_server(
    app_state: Arc<AppState>,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let system_config = app_state.system_config.clone();
    let router = create_router(app_state, &system_config);

    let addr = parse_listen_address(&system_config.server.listen)?;

    info!(
        listen_addr = %addr,
        request_timeout = system_config.server.request_timeout,
        metrics_enabled = system_config.monitoring.metrics_enabled,
        "Starting HTTP server"
    );

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(
            error = %e,
            addr = %addr,
            "Failed to bind to address"
        );
        crate::types::Error::Io(e)
    })?;

    info!(
        local_addr = %listener.local_addr().unwrap_or(addr),
        "HTTP server listening"
    );

    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        shutdown_signal.await;
        info!("Shutdown signal received, starting graceful shutdown");
    });

    if let Err(e) = server.await {
        error!(error = %e, "HTTP server error");
        return Err(crate::types::Error::Io(e));
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Build the router: API routes under [`API_PREFIX`], optional metrics,
/// JSON 404 fallback
pub fn create_router(app_state: Arc<AppState>, config: &SystemConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handle_health))
        .route("/config", get(handle_config))
        .route("/test-connection", post(handle_test_connection))
        .route("/upload", post(handle_upload))
        .route("/download", post(handle_download))
        .route("/secret/{secret_name}", get(handle_get_secret));

    let router = Router::new().nest(API_PREFIX, api_routes);

    let router = if config.monitoring.metrics_enabled {
        router.route(&config.monitoring.metrics_path, get(handle_metrics))
    } else {
        router
    };

    router
        .route_layer(from_fn(middleware::track_metrics))
        .fallback(handle_not_found)
        .layer(middleware::trace_layer())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout),
        ))
        .with_state(app_state)
}

/// Parse the listen address from configuration
fn parse_listen_address(listen: &str) -> Result<SocketAddr> {
    listen.parse().map_err(|e| {
        error!(
            listen_addr = %listen,
            error = %e,
            "Invalid listen address format"
        );
        crate::types::Error::Config(crate::types::ConfigError::Invalid {
            message: format!("Invalid listen address '{}': {}", listen, e),
        })
    })
}
