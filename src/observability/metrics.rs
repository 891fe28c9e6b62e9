//! Metrics collection and exposition.
//!
//! # Metrics
//! - `worker_requests_total` (counter): requests by method, route, status
//! - `worker_request_duration_seconds` (histogram): latency distribution
//! - `worker_forward_failures_total` (counter): requests answered with the 500 envelope

use metrics::{counter, histogram, Label};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, route: &'static str, status: u16, start: Instant) {
    let labels = vec![
        Label::new("method", method.to_string()),
        Label::new("route", route),
        Label::new("status", status.to_string()),
    ];
    counter!("worker_requests_total", labels.clone()).increment(1);
    histogram!("worker_request_duration_seconds", labels).record(start.elapsed().as_secs_f64());
}

/// Record a request that could not be forwarded.
pub fn record_forward_failure() {
    counter!("worker_forward_failures_total").increment(1);
}
