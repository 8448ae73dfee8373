//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_probe_total` (counter): probes by kind, server, outcome
//! - `router_probe_duration_seconds` (histogram): probe latency by kind
//! - `router_selection_total` (counter): decisions by strategy, server, reason
//! - `router_requests_total` (counter): redirect requests by status
//! - `router_pool_size` (gauge): servers in the active pool
//!
//! Recording is a no-op until a recorder is installed, so library code and
//! tests can call these freely.

use std::net::SocketAddr;
use std::time::Duration;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(kind: &'static str, server: &str, outcome: &'static str, elapsed: Duration) {
    counter!(
        "router_probe_total",
        "kind" => kind,
        "server" => server.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("router_probe_duration_seconds", "kind" => kind).record(elapsed.as_secs_f64());
}

pub fn record_selection(strategy: &'static str, server: &str, reason: &'static str) {
    counter!(
        "router_selection_total",
        "strategy" => strategy,
        "server" => server.to_string(),
        "reason" => reason
    )
    .increment(1);
}

pub fn record_request(status: u16) {
    counter!("router_requests_total", "status" => status.to_string()).increment(1);
}

pub fn record_pool_size(size: usize) {
    gauge!("router_pool_size").set(size as f64);
}
