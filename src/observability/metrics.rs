//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rpc_requests_total` (counter): dispatched requests by message, status, outcome
//! - `rpc_request_duration_seconds` (histogram): dispatch latency by message
//! - `rpc_unknown_message_total` (counter): requests for paths with no message
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op without a recorder
//! - Prometheus exporter is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::http::dispatcher::DispatchOutcome;

/// Install the Prometheus recorder and its HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record one finished dispatch.
pub fn record_dispatch(message: &str, status: StatusCode, outcome: DispatchOutcome, start: Instant) {
    metrics::counter!(
        "rpc_requests_total",
        "message" => message.to_string(),
        "status" => status.as_u16().to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    metrics::histogram!("rpc_request_duration_seconds", "message" => message.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a request whose path matched no message.
pub fn record_unknown_message() {
    metrics::counter!("rpc_unknown_message_total").increment(1);
}
