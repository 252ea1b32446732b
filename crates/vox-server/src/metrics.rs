//! Prometheus metrics recorder and metric name constants.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

// Metric name constants to avoid typos across modules.

/// Agent connections opened total (counter).
pub const AGENT_CONNECTIONS_TOTAL: &str = "agent_connections_total";
/// Agent disconnections total (counter).
pub const AGENT_DISCONNECTIONS_TOTAL: &str = "agent_disconnections_total";
/// Currently connected agents (gauge).
pub const AGENTS_ONLINE: &str = "agents_online";
/// Agents evicted by the hard-staleness sweep (counter).
pub const AGENT_EVICTIONS_TOTAL: &str = "agent_evictions_total";
/// Observer connections opened total (counter).
pub const OBSERVER_CONNECTIONS_TOTAL: &str = "observer_connections_total";
/// Currently connected observers (gauge).
pub const OBSERVERS_ONLINE: &str = "observers_online";
/// Frames dropped on full observer queues (counter).
pub const OBSERVER_BROADCAST_DROPS_TOTAL: &str = "observer_broadcast_drops_total";
/// Work submissions received (counter).
pub const WORK_REQUESTS_TOTAL: &str = "work_requests_total";
/// Work submissions that failed processing (counter).
pub const WORK_FAILURES_TOTAL: &str = "work_failures_total";
/// Work processing duration seconds (histogram).
pub const WORK_DURATION_SECONDS: &str = "work_duration_seconds";
