//! Application state shared across handlers

use crate::routes::metrics::Metrics;
use crate::services::provider::ProviderClient;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Upstream provider client
    pub provider: Arc<ProviderClient>,
    /// Application metrics for Prometheus
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Create new application state
    pub fn new(provider: ProviderClient) -> Self {
        Self {
            provider: Arc::new(provider),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
