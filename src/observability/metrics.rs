//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define proxy metrics (requests, latency, upstream and stream errors)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by route, status
//! - `proxy_request_duration_seconds` (histogram): latency by route
//! - `proxy_upstream_errors_total` (counter): failures by kind
//! - `proxy_stream_errors_total` (counter): body relay failures after headers were sent
//! - `static_requests_total` (counter): static responses by status
//!
//! # Design Decisions
//! - The `metrics` macros are no-ops until a recorder is installed
//! - Labels for route, status code, error kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(
            address = %addr,
            error = %e,
            "Failed to install metrics exporter"
        ),
    }
}

/// Record a finished proxy or health request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    let route = route.to_string();
    metrics::counter!(
        "proxy_requests_total",
        "route" => route.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record a failure contacting or building a request for the upstream.
pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("proxy_upstream_errors_total", "kind" => kind).increment(1);
}

/// Record a body relay failure after the response was committed.
pub fn record_stream_error() {
    metrics::counter!("proxy_stream_errors_total").increment(1);
}

/// Record a static file response.
pub fn record_static(status: u16) {
    metrics::counter!("static_requests_total", "status" => status.to_string()).increment(1);
}
