//! Prometheus Metrics
//!
//! Metrics include:
//! - validations per network and verdict
//! - validation latency (histogram)
//! - unsupported events
//! - catalog refresh outcomes and current catalog size

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge,
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, TextEncoder,
};
use tracing::{error, info};

// Validations by network and verdict
static VALIDATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "rewards_validations_total",
        "Total number of social events validated",
        &["network", "verdict"]
    ).expect("Failed to create validations metric")
});

// Validation latency (in seconds)
static VALIDATION_LATENCY: Lazy<Histogram> = Lazy::new(|| {
    let buckets = vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05];
    register_histogram!(
        HistogramOpts::new(
            "rewards_validation_latency_seconds",
            "Latency of a single share validation in seconds"
        ).buckets(buckets)
    ).expect("Failed to create validation_latency metric")
});

// Events routed to the unsupported path
static UNSUPPORTED_EVENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "rewards_unsupported_events_total",
        "Number of events with an unsupported network/action combination",
        &["network", "action"]
    ).expect("Failed to create unsupported_events metric")
});

// Catalog refresh outcomes
static CATALOG_REFRESHES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "rewards_catalog_refresh_total",
        "Catalog refresh attempts by outcome",
        &["status"]
    ).expect("Failed to create catalog_refresh metric")
});

// Items in the installed catalog
static CATALOG_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "rewards_catalog_items",
        "Number of rewardable content items in the current catalog"
    ).expect("Failed to create catalog_items metric")
});

/// Records a validation verdict
pub fn record_validation(network: &str, valid: bool) {
    let verdict = if valid { "valid" } else { "invalid" };
    VALIDATIONS.with_label_values(&[network, verdict]).inc();
}

/// Records validation latency
pub fn record_validation_latency(latency_secs: f64) {
    VALIDATION_LATENCY.observe(latency_secs);
}

/// Records an event that could not be routed
pub fn record_unsupported_event(network: &str, action: &str) {
    UNSUPPORTED_EVENTS.with_label_values(&[network, action]).inc();
}

/// Records a catalog refresh outcome ("success" / "failure")
pub fn record_catalog_refresh(status: &str) {
    CATALOG_REFRESHES.with_label_values(&[status]).inc();
}

/// Sets the current catalog size
pub fn set_catalog_items(count: i64) {
    CATALOG_ITEMS.set(count);
}

/// Collects all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}

// ============================================
// METRICS SERVER
// ============================================

use hyper::{body::Incoming, server::conn::http1, service::service_fn, Request, Response};
use hyper_util::rt::TokioIo;
use http_body_util::Full;
use hyper::body::Bytes;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Handles metrics HTTP requests
async fn handle_metrics(_req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    let metrics = gather_metrics();
    Ok(Response::new(Full::new(Bytes::from(metrics))))
}

/// Starts the metrics HTTP server
pub async fn start_metrics_server(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, "Metrics server listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(io, service_fn(handle_metrics))
                .await
            {
                error!(error = %e, "Error serving metrics connection");
            }
        });
    }
}
