//! Prometheus metrics endpoint

use axum::response::IntoResponse;
use std::sync::atomic::{AtomicU64, Ordering};

/// Application metrics for Prometheus
#[derive(Default)]
pub struct Metrics {
    /// Total API requests processed
    pub requests_total: AtomicU64,
    /// Total upstream provider fetches
    pub provider_fetches_total: AtomicU64,
    /// Total export downloads served
    pub exports_total: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_requests(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_provider_fetches(&self) {
        self.provider_fetches_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_exports(&self) {
        self.exports_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            provider_fetches_total: self.provider_fetches_total.load(Ordering::Relaxed),
            exports_total: self.exports_total.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub provider_fetches_total: u64,
    pub exports_total: u64,
}

/// GET /metrics
///
/// Returns Prometheus-format metrics
pub async fn prometheus_metrics(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot();

    let output = format!(
        r#"# HELP swiftnode_requests_total Total number of API requests processed
# TYPE swiftnode_requests_total counter
swiftnode_requests_total {}

# HELP swiftnode_provider_fetches_total Total number of upstream provider fetches
# TYPE swiftnode_provider_fetches_total counter
swiftnode_provider_fetches_total {}

# HELP swiftnode_exports_total Total number of export downloads served
# TYPE swiftnode_exports_total counter
swiftnode_exports_total {}

# HELP swiftnode_info Build information
# TYPE swiftnode_info gauge
swiftnode_info{{version="{}"}} 1
"#,
        snapshot.requests_total,
        snapshot.provider_fetches_total,
        snapshot.exports_total,
        env!("CARGO_PKG_VERSION"),
    );

    (
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.inc_requests();
        metrics.inc_requests();
        metrics.inc_provider_fetches();
        metrics.inc_exports();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.provider_fetches_total, 1);
        assert_eq!(snapshot.exports_total, 1);
    }
}
