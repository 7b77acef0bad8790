//! Metrics collection and exposition.
//!
//! # Metrics
//! - `search_requests_total` (counter): requests by route and status
//! - `search_request_duration_seconds` (histogram): routing latency by route
//! - `search_query_results` (histogram): result count per query
//! - `search_active_connections` (gauge): open connections
//! - `search_connection_errors_total` (counter): fatal errors by reason
//! - `search_index_words` / `search_index_documents` (gauges): index size
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus endpoint is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one routed request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!(
        "search_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("search_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_query_results(count: usize) {
    histogram!("search_query_results").record(count as f64);
}

pub fn set_active_connections(count: u64) {
    gauge!("search_active_connections").set(count as f64);
}

pub fn record_connection_error(reason: &'static str) {
    counter!("search_connection_errors_total", "reason" => reason).increment(1);
}

pub fn set_index_size(words: usize, documents: usize) {
    gauge!("search_index_words").set(words as f64);
    gauge!("search_index_documents").set(documents as f64);
}
