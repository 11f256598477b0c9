use axum::extract::State;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

use crate::AppState;

/// Latency histogram buckets in seconds.
const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// Install the process-wide Prometheus recorder and keep its render handle.
pub fn setup_metrics_recorder() -> MetricsState {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    MetricsState { handle }
}

/// GET /metrics - Prometheus exposition
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics.handle.render()
}
