//! Analytics API endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analytics;
use crate::error::Result;
use crate::models::{AnalyticsSummary, GroupKey, GroupRollup, Job, TimeWindow};
use crate::state::AppState;

/// Query parameters for the analytics endpoint
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Trailing window: "7d", "30d", or "90d"; anything else falls back
    /// to "7d"
    #[serde(default = "default_window")]
    pub window: String,
}

fn default_window() -> String {
    "7d".to_string()
}

/// Response for the analytics endpoint
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub window: &'static str,
    /// True when no job fell inside the window; `summary` is null then
    pub no_data: bool,
    pub summary: Option<AnalyticsSummary>,
}

/// GET /api/v1/analytics
///
/// Returns the windowed analytics summary, or an explicit no-data marker
/// when the window is empty.
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>> {
    state.metrics.inc_requests();

    let window = TimeWindow::parse(&params.window);
    let jobs = state.provider.fetch_jobs().await?;
    state.metrics.inc_provider_fetches();

    let summary = analytics::analyze(&jobs, window);
    debug!(
        window = window.as_str(),
        total_jobs = summary.as_ref().map(|s| s.total_jobs).unwrap_or(0),
        "Analytics computed"
    );

    Ok(Json(AnalyticsResponse {
        window: window.as_str(),
        no_data: summary.is_none(),
        summary,
    }))
}

/// Query parameters for the rollup endpoint
#[derive(Debug, Deserialize)]
pub struct RollupQuery {
    /// Grouping dimension: "gpu", "region", or "status" (default: region)
    pub group_by: Option<String>,
    #[serde(default = "default_window")]
    pub window: String,
}

/// Response for the rollup endpoint
#[derive(Debug, Serialize)]
pub struct RollupResponse {
    pub window: &'static str,
    pub group_by: &'static str,
    pub groups: Vec<GroupRollup>,
}

/// GET /api/v1/analytics/rollup
///
/// Groups the windowed job snapshot by one dimension into cost/runtime
/// rollups.
pub async fn get_rollup(
    State(state): State<AppState>,
    Query(params): Query<RollupQuery>,
) -> Result<Json<RollupResponse>> {
    state.metrics.inc_requests();

    let window = TimeWindow::parse(&params.window);
    let group_by = GroupKey::parse(params.group_by.as_deref().unwrap_or(""));
    let jobs = state.provider.fetch_jobs().await?;
    state.metrics.inc_provider_fetches();

    // Same window cut as the summary endpoint, so both describe the same
    // population.
    let cutoff = Utc::now() - window.duration();
    let windowed: Vec<Job> = jobs
        .into_iter()
        .filter(|job| job.created_at >= cutoff)
        .collect();
    let groups = analytics::rollup(&windowed, group_by);

    Ok(Json(RollupResponse {
        window: window.as_str(),
        group_by: group_by.as_str(),
        groups,
    }))
}
