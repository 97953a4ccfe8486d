//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ubt_messages_dispatched_total` (counter): messages handed to a dispatcher, by level
//! - `ubt_transport_failures_total` (counter): failed collector calls, by mode
//! - `ubt_serialization_failures_total` (counter): messages dropped before sending

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::message::LogLevel;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_dispatch(level: LogLevel) {
    metrics::counter!("ubt_messages_dispatched_total", "level" => level.as_str()).increment(1);
}

pub fn record_transport_failure(mode: &'static str) {
    metrics::counter!("ubt_transport_failures_total", "mode" => mode).increment(1);
}

pub fn record_serialization_failure() {
    metrics::counter!("ubt_serialization_failures_total").increment(1);
}
