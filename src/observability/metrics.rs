//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_decisions_total` (counter): gate outcomes by `outcome`
//! - `gate_shield_rejections_total` (counter): rejections by `reason`
//! - `gate_collaborator_errors_total` (counter): failures by `collaborator`, `kind`
//! - `gate_collaborator_duration_seconds` (histogram): collaborator call latency
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(outcome: &'static str) {
    counter!("gate_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_shield_rejection(reason: &'static str) {
    counter!("gate_shield_rejections_total", "reason" => reason).increment(1);
}

pub fn record_collaborator_error(collaborator: &'static str, kind: &'static str) {
    counter!(
        "gate_collaborator_errors_total",
        "collaborator" => collaborator,
        "kind" => kind
    )
    .increment(1);
}

pub fn record_collaborator_call(collaborator: &'static str, start: Instant) {
    histogram!("gate_collaborator_duration_seconds", "collaborator" => collaborator)
        .record(start.elapsed().as_secs_f64());
}
