//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by rpc, status
//! - `gateway_request_duration_seconds` (histogram): latency by rpc
//! - `gateway_rpc_failures_total` (counter): backend failures by rpc, code, handled
//! - `gateway_binding_failures_total` (counter): rejected bindings by rpc
//! - `gateway_unmatched_requests_total` (counter): routing misses by reason
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Recording is a no-op until a recorder is installed

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::rpc::FailureDescriptor;

/// Install the Prometheus recorder and its HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(rpc: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "rpc" => rpc.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "rpc" => rpc.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed backend invocation.
pub fn record_rpc_failure(rpc: &str, failure: &FailureDescriptor) {
    counter!(
        "gateway_rpc_failures_total",
        "rpc" => rpc.to_string(),
        "code" => failure.code.name(),
        "handled" => failure.handled.to_string()
    )
    .increment(1);
}

/// Record a request rejected while binding.
pub fn record_binding_failure(rpc: &str) {
    counter!("gateway_binding_failures_total", "rpc" => rpc.to_string()).increment(1);
}

/// Record a request no route accepted (`not_found` or `method_not_allowed`).
pub fn record_unmatched(reason: &'static str) {
    counter!("gateway_unmatched_requests_total", "reason" => reason).increment(1);
}
