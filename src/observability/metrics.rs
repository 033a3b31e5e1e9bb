//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, outcome
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_routing_decisions_total` (counter): forward / hold reason
//! - `proxy_registrations_total` (counter): accepted and rejected registrations
//! - `proxy_routes_registered` (gauge): size of the route table
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed proxied request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a routing decision outcome.
pub fn record_decision(outcome: &'static str) {
    counter!("proxy_routing_decisions_total", "outcome" => outcome).increment(1);
}

/// Record a registration attempt.
pub fn record_registration(accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    counter!("proxy_registrations_total", "result" => result).increment(1);
}

/// Record the current size of the route table.
pub fn record_route_count(count: usize) {
    gauge!("proxy_routes_registered").set(count as f64);
}
