//! Metrics collection and exposition.
//!
//! # Metrics
//! - `route_loader_routes_registered_total` (counter): routes handed to the host, by method
//! - `route_loader_nodes_initialized_total` (counter): initializers run, by outcome
//! - `route_loader_diagnostics_total` (counter): recoverable problems, by kind
//!
//! # Design Decisions
//! - Counters are no-ops until a recorder is installed
//! - The Prometheus exporter is only started by the binary, never by the library

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

pub const ROUTES_REGISTERED: &str = "route_loader_routes_registered_total";
pub const NODES_INITIALIZED: &str = "route_loader_nodes_initialized_total";
pub const DIAGNOSTICS: &str = "route_loader_diagnostics_total";

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics endpoint"),
    }
}

pub fn record_route_registered(method: &str) {
    metrics::counter!(ROUTES_REGISTERED, "method" => method.to_string()).increment(1);
}

pub fn record_node_initialized(success: bool) {
    let outcome = if success { "ok" } else { "failed" };
    metrics::counter!(NODES_INITIALIZED, "outcome" => outcome).increment(1);
}

pub fn record_diagnostic(kind: &'static str) {
    metrics::counter!(DIAGNOSTICS, "kind" => kind).increment(1);
}
