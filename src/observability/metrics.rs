//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_requests_total` (counter): requests by method and outcome
//! - `bridge_request_duration_seconds` (histogram): round-trip latency by method
//! - `bridge_frames_dropped_total` (counter): inbound frames nobody received
//! - `sync_slots_visited_total` (counter): slots fetched during traversal
//! - `messages_recovered_total` (counter): plaintexts recovered by sync
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_bridge_request(method: &str, outcome: &'static str, start: Instant) {
    counter!("bridge_requests_total", "method" => method.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!("bridge_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_frames_dropped(count: u64) {
    counter!("bridge_frames_dropped_total").increment(count);
}

pub fn record_slot_visited() {
    counter!("sync_slots_visited_total").increment(1);
}

pub fn record_messages_recovered(count: usize) {
    counter!("messages_recovered_total").increment(count as u64);
}
