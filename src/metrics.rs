//! Prometheus metrics for secret lookups, simulated transfers and HTTP
//! requests
//!
//! Metrics live in a process-wide registry and are exposed in text format
//! on the configured metrics route.

use lazy_static::lazy_static;
use prometheus::{
    opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, Registry, TextEncoder,
};
use tracing::{debug, warn};

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Secret lookups by outcome
    /// Labels: outcome (found, not_found, error)
    pub static ref SECRET_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("secret_lookups_total", "Total number of secret vault lookups"),
        &["outcome"]
    )
    .expect("Failed to create secret_lookups_total metric");

    /// Vault reachability checks by result
    /// Labels: accessible (true, false)
    pub static ref VAULT_PROBES_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("vault_probes_total", "Total number of secret vault reachability checks"),
        &["accessible"]
    )
    .expect("Failed to create vault_probes_total metric");

    /// Simulated transfer operations by kind and outcome
    /// Labels: operation (connect, upload, download), outcome (success, failure)
    pub static ref TRANSFER_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("transfer_operations_total", "Total number of simulated FTP operations"),
        &["operation", "outcome"]
    )
    .expect("Failed to create transfer_operations_total metric");

    /// HTTP request duration in seconds
    /// Labels: method, path, status
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latencies",
        &["method", "path", "status"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create http_request_duration_seconds metric");

    /// Total number of HTTP requests
    /// Labels: method, path
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("http_requests_total", "Total number of HTTP requests"),
        &["method", "path"]
    )
    .expect("Failed to create http_requests_total metric");
}

fn register(name: &str, collector: Box<dyn prometheus::core::Collector>) {
    match REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
        Err(e) => warn!(metric = name, error = %e, "Failed to register metric"),
    }
}

/// Register all metrics with the global registry; safe to call repeatedly
pub fn init_metrics() {
    register(
        "secret_lookups_total",
        Box::new(SECRET_LOOKUPS_TOTAL.clone()),
    );
    register("vault_probes_total", Box::new(VAULT_PROBES_TOTAL.clone()));
    register(
        "transfer_operations_total",
        Box::new(TRANSFER_OPERATIONS_TOTAL.clone()),
    );
    register(
        "http_request_duration_seconds",
        Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()),
    );
    register("http_requests_total", Box::new(HTTP_REQUESTS_TOTAL.clone()));

    debug!("Prometheus metrics registry initialized");
}

/// Record the outcome of one secret lookup
pub fn record_secret_lookup(outcome: &str) {
    SECRET_LOOKUPS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a vault reachability check
pub fn record_vault_probe(accessible: bool) {
    let label = if accessible { "true" } else { "false" };
    VAULT_PROBES_TOTAL.with_label_values(&[label]).inc();
}

/// Record a simulated transfer operation
pub fn record_transfer(operation: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    TRANSFER_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();

    debug!(
        operation = %operation,
        outcome = %outcome,
        "Recorded transfer metric"
    );
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration_seconds: f64) {
    HTTP_REQUESTS_TOTAL.with_label_values(&[method, path]).inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path, &status.to_string()])
        .observe(duration_seconds);
}

/// Gather all metrics and encode them in Prometheus text format
pub fn gather_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("Failed to encode metrics: {}", e))?;

    String::from_utf8(buffer).map_err(|e| format!("Failed to convert metrics to UTF-8: {}", e))
}
