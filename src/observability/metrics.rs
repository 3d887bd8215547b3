//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_resolution_issues_total` (counter): deviations by action
//! - `config_reloads_total` (counter): reload attempts by result
//! - `admin_actions_total` (counter): ban/unban actions performed
//! - `external_api_notifications_total` (counter): notifications by action, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter is optional

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

fn describe() {
    describe_counter!(
        "config_resolution_issues_total",
        "Configuration fields that deviated from the provided value"
    );
    describe_counter!("config_reloads_total", "Configuration reload attempts");
    describe_counter!("admin_actions_total", "Administrative actions performed");
    describe_counter!(
        "external_api_notifications_total",
        "Notifications sent to the external admin system"
    );
}

pub fn record_resolution_issue(action: &'static str) {
    counter!("config_resolution_issues_total", "action" => action).increment(1);
}

pub fn record_reload(result: &'static str) {
    counter!("config_reloads_total", "result" => result).increment(1);
}

pub fn record_admin_action(action: &'static str) {
    counter!("admin_actions_total", "action" => action).increment(1);
}

pub fn record_notification(action: &'static str, outcome: &'static str) {
    counter!(
        "external_api_notifications_total",
        "action" => action,
        "outcome" => outcome
    )
    .increment(1);
}
