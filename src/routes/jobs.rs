//! Job query and passthrough API endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{
    Job, JobFilter, PageState, RuntimeBound, SortDirection, SortKey, SortState,
    DEFAULT_PAGE_SIZE,
};
use crate::query;
use crate::state::AppState;

/// Query parameters for the jobs endpoint.
///
/// Everything is a raw string: malformed numeric input degrades to the
/// unbounded/default behavior instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsQuery {
    pub gpu: Option<String>,
    pub region: Option<String>,
    pub status: Option<String>,
    pub cost_min: Option<String>,
    pub cost_max: Option<String>,
    pub runtime_min_hours: Option<String>,
    pub runtime_min_minutes: Option<String>,
    pub runtime_min_seconds: Option<String>,
    pub runtime_max_hours: Option<String>,
    pub runtime_max_minutes: Option<String>,
    pub runtime_max_seconds: Option<String>,
    /// Sort column (default: created_at)
    pub sort: Option<String>,
    /// Sort direction (default: desc)
    pub direction: Option<String>,
    /// Zero-based page index
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl JobsQuery {
    /// A runtime bound group counts as supplied when any sub-field was
    /// present in the request, even if empty.
    fn runtime_bound(
        hours: &Option<String>,
        minutes: &Option<String>,
        seconds: &Option<String>,
    ) -> Option<RuntimeBound> {
        if hours.is_none() && minutes.is_none() && seconds.is_none() {
            return None;
        }
        Some(RuntimeBound {
            hours: hours.clone().unwrap_or_default(),
            minutes: minutes.clone().unwrap_or_default(),
            seconds: seconds.clone().unwrap_or_default(),
        })
    }

    pub fn filter(&self) -> JobFilter {
        JobFilter {
            gpu: self.gpu.clone(),
            region: self.region.clone(),
            status: self.status.clone(),
            cost_min: self.cost_min.clone(),
            cost_max: self.cost_max.clone(),
            runtime_min: Self::runtime_bound(
                &self.runtime_min_hours,
                &self.runtime_min_minutes,
                &self.runtime_min_seconds,
            ),
            runtime_max: Self::runtime_bound(
                &self.runtime_max_hours,
                &self.runtime_max_minutes,
                &self.runtime_max_seconds,
            ),
        }
    }

    /// Sort state; unrecognized column or direction falls back to the
    /// default (created_at descending).
    pub fn sort(&self) -> SortState {
        let default = SortState::default();
        SortState {
            key: self
                .sort
                .as_deref()
                .and_then(SortKey::parse)
                .unwrap_or(default.key),
            direction: self
                .direction
                .as_deref()
                .and_then(SortDirection::parse)
                .unwrap_or(default.direction),
        }
    }

    pub fn page(&self) -> PageState {
        let page_index = self
            .page
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let page_size = self
            .page_size
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        PageState::new(page_index, page_size)
    }
}

/// Response for the jobs endpoint
#[derive(Debug, Serialize)]
pub struct JobsResponse {
    /// The requested page, in sorted order
    pub rows: Vec<Job>,
    /// Jobs surviving the filter, across all pages
    pub total_filtered: usize,
    /// Jobs in the unfiltered snapshot
    pub total_all: usize,
    pub page_index: usize,
    pub page_size: usize,
}

/// GET /api/v1/jobs
///
/// Returns one page of the filtered, sorted job snapshot plus the counts
/// for a "showing N of M" summary.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsQuery>,
) -> Result<Json<JobsResponse>> {
    state.metrics.inc_requests();

    let jobs = state.provider.fetch_jobs().await?;
    state.metrics.inc_provider_fetches();

    let page = params.page();
    let result = query::query(&jobs, &params.filter(), &params.sort(), &page);

    debug!(
        total_all = result.total_all,
        total_filtered = result.total_filtered,
        page_index = page.page_index,
        "Job query evaluated"
    );

    Ok(Json(JobsResponse {
        rows: result.rows,
        total_filtered: result.total_filtered,
        total_all: result.total_all,
        page_index: page.page_index,
        page_size: page.normalized_size(),
    }))
}

/// GET /api/v1/jobs/raw
///
/// Mirrors the upstream provider payload, with fixture substitution when
/// the upstream is unavailable or empty.
pub async fn raw_jobs(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    state.metrics.inc_requests();

    let payload = state.provider.fetch_raw().await?;
    state.metrics.inc_provider_fetches();

    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_group_presence_gates_the_bound() {
        let params = JobsQuery {
            runtime_min_hours: Some("1".into()),
            ..Default::default()
        };
        let filter = params.filter();
        assert!(filter.runtime_min.is_some());
        assert!(filter.runtime_max.is_none());
        assert_eq!(filter.runtime_min.unwrap().total_seconds(), 3600);
    }

    #[test]
    fn test_absent_runtime_group_stays_absent() {
        let filter = JobsQuery::default().filter();
        assert!(filter.runtime_min.is_none());
        assert!(filter.runtime_max.is_none());
    }

    #[test]
    fn test_sort_falls_back_to_default() {
        let params = JobsQuery {
            sort: Some("favorite_color".into()),
            direction: Some("sideways".into()),
            ..Default::default()
        };
        let sort = params.sort();
        assert_eq!(sort.key, SortKey::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);

        let params = JobsQuery {
            sort: Some("cost".into()),
            direction: Some("asc".into()),
            ..Default::default()
        };
        let sort = params.sort();
        assert_eq!(sort.key, SortKey::Cost);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_malformed_page_params_default() {
        let params = JobsQuery {
            page: Some("two".into()),
            page_size: Some("".into()),
            ..Default::default()
        };
        let page = params.page();
        assert_eq!(page.page_index, 0);
        assert_eq!(page.normalized_size(), DEFAULT_PAGE_SIZE);
    }
}
