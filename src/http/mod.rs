//! HTTP API for the ftpvault service
//!
//! Endpoints, all under [`API_PREFIX`]:
//! - GET /health - liveness plus vault reachability
//! - GET /config - application settings, sensitive values masked
//! - POST /test-connection - simulated FTP login
//! - POST /upload, POST /download - simulated transfers
//! - GET /secret/{secretName} - masked vault lookup
//!
//! Prometheus metrics are served outside the prefix when enabled.

pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod server;

pub use handlers::AppState;
pub use server::{create_router, start_server};

/// Path prefix shared by every API route
pub const API_PREFIX: &str = "/api/ftp";
