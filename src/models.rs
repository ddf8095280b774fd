//! Core domain models for Swift Node

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a GPU job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is currently running on an instance
    Running,
    /// Job finished and the instance was released
    Completed,
    /// Job terminated with an error
    Failed,
    /// Job is waiting for capacity
    Queued,
    /// Job was cancelled by the user
    Cancelled,
}

impl JobStatus {
    /// Canonical lowercase label, as serialized and as matched by filters
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Queued => "queued",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

/// A single GPU rental job, normalized from the upstream provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque identifier, unique within a snapshot
    pub id: String,
    /// Accelerator model label (e.g. "A100")
    pub gpu: String,
    /// Geographic/location label (e.g. "us-west")
    pub region: String,
    /// Hourly rate in currency units, never negative
    pub cost: f64,
    /// Lifecycle status
    pub status: JobStatus,
    /// Elapsed seconds
    pub runtime: u64,
    /// Job start instant
    pub created_at: DateTime<Utc>,
    /// Extra provider fields, passed through verbatim for detail display.
    /// The engine never interprets this bag.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// A runtime bound entered as separate hour/minute/second sub-fields.
///
/// Sub-fields are kept as raw strings: a missing or non-numeric sub-field
/// contributes zero rather than erroring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeBound {
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub minutes: String,
    #[serde(default)]
    pub seconds: String,
}

impl RuntimeBound {
    /// Collapse the sub-fields into a single second count
    pub fn total_seconds(&self) -> u64 {
        fn part(s: &str) -> u64 {
            s.trim().parse().unwrap_or(0)
        }
        part(&self.hours) * 3600 + part(&self.minutes) * 60 + part(&self.seconds)
    }
}

/// Active filter dimensions for a job query.
///
/// Every field is optional; an absent field means "no constraint". Numeric
/// bounds are raw strings so that unparseable input degrades to unbounded
/// instead of failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobFilter {
    /// Exact-match GPU label
    pub gpu: Option<String>,
    /// Exact-match region label
    pub region: Option<String>,
    /// Exact-match status label (canonical lowercase form)
    pub status: Option<String>,
    /// Inclusive lower cost bound
    pub cost_min: Option<String>,
    /// Inclusive upper cost bound
    pub cost_max: Option<String>,
    /// Minimum runtime; active whenever the sub-field group was supplied
    pub runtime_min: Option<RuntimeBound>,
    /// Maximum runtime; active only when it collapses to more than zero
    pub runtime_max: Option<RuntimeBound>,
}

/// Sortable job columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Gpu,
    Region,
    Cost,
    Status,
    Runtime,
    CreatedAt,
}

impl SortKey {
    /// Parse a column name, `None` for unrecognized input
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortKey::Id),
            "gpu" => Some(SortKey::Gpu),
            "region" => Some(SortKey::Region),
            "cost" => Some(SortKey::Cost),
            "status" => Some(SortKey::Status),
            "runtime" => Some(SortKey::Runtime),
            "created_at" => Some(SortKey::CreatedAt),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Single active sort key plus direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Most recent jobs first
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Page sizes the query engine accepts
pub const ALLOWED_PAGE_SIZES: [usize; 5] = [10, 20, 30, 40, 50];

/// Page size used when the caller supplies none, or an unlisted one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Zero-based pagination state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// The effective page size: unlisted sizes normalize to the default
    pub fn normalized_size(&self) -> usize {
        if ALLOWED_PAGE_SIZES.contains(&self.page_size) {
            self.page_size
        } else {
            DEFAULT_PAGE_SIZE
        }
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Trailing time span used to scope analytics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeWindow {
    #[default]
    SevenDays,
    ThirtyDays,
    NinetyDays,
}

impl TimeWindow {
    /// Parse a window selector; unrecognized values fall back to 7d
    pub fn parse(s: &str) -> Self {
        match s {
            "30d" => TimeWindow::ThirtyDays,
            "90d" => TimeWindow::NinetyDays,
            _ => TimeWindow::SevenDays,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::SevenDays => "7d",
            TimeWindow::ThirtyDays => "30d",
            TimeWindow::NinetyDays => "90d",
        }
    }

    /// Length of the window
    pub fn duration(&self) -> Duration {
        match self {
            TimeWindow::SevenDays => Duration::days(7),
            TimeWindow::ThirtyDays => Duration::days(30),
            TimeWindow::NinetyDays => Duration::days(90),
        }
    }
}

/// One calendar-day bucket of the usage series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    /// UTC date of the bucket
    pub day: NaiveDate,
    /// Jobs created on that day
    pub count: u64,
}

/// Accrued cost for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCost {
    pub region: String,
    /// Total elapsed cost, rounded to 2 decimals
    pub cost: f64,
}

/// Occurrence count for one GPU label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuFrequency {
    pub gpu: String,
    pub count: u64,
}

/// Job count for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCount {
    pub region: String,
    pub count: u64,
}

/// Windowed analytics over a job snapshot.
///
/// Always a fresh value; an empty window produces no summary at all rather
/// than a zeroed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Daily job counts, chronological, at most the 14 most recent
    /// populated days. Sparse days are absent, not zero-filled.
    pub series_by_day: Vec<DayBucket>,
    /// Elapsed cost per region, descending by cost
    pub cost_by_region: Vec<RegionCost>,
    /// Top 10 GPU labels by occurrence, descending
    pub frequency_by_gpu: Vec<GpuFrequency>,
    /// Jobs inside the window
    pub total_jobs: usize,
    /// Total elapsed cost across the window, rounded to 2 decimals
    pub total_cost: f64,
    /// Mean runtime rounded to the nearest second
    pub average_runtime_seconds: u64,
    /// Top 5 regions by job count, descending
    pub top_regions: Vec<RegionCount>,
}

/// Dimension to group a rollup by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Gpu,
    Region,
    Status,
}

impl GroupKey {
    /// Parse a group dimension; unrecognized values fall back to region
    pub fn parse(s: &str) -> Self {
        match s {
            "gpu" => GroupKey::Gpu,
            "status" => GroupKey::Status,
            _ => GroupKey::Region,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Gpu => "gpu",
            GroupKey::Region => "region",
            GroupKey::Status => "status",
        }
    }
}

/// Per-group cost/runtime rollup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRollup {
    /// Value of the grouping dimension
    pub key: String,
    /// Sum of hourly rates across the group
    pub total_cost: f64,
    /// Mean runtime in seconds, zero when the group is empty
    pub average_runtime_seconds: f64,
    /// Jobs in the group
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_bound_collapses_subfields() {
        let bound = RuntimeBound {
            hours: "1".into(),
            minutes: "30".into(),
            seconds: "15".into(),
        };
        assert_eq!(bound.total_seconds(), 5415);
    }

    #[test]
    fn test_runtime_bound_ignores_garbage() {
        let bound = RuntimeBound {
            hours: "".into(),
            minutes: "abc".into(),
            seconds: "42".into(),
        };
        assert_eq!(bound.total_seconds(), 42);
    }

    #[test]
    fn test_time_window_fallback() {
        assert_eq!(TimeWindow::parse("30d"), TimeWindow::ThirtyDays);
        assert_eq!(TimeWindow::parse("90d"), TimeWindow::NinetyDays);
        assert_eq!(TimeWindow::parse("7d"), TimeWindow::SevenDays);
        assert_eq!(TimeWindow::parse("1y"), TimeWindow::SevenDays);
        assert_eq!(TimeWindow::parse(""), TimeWindow::SevenDays);
    }

    #[test]
    fn test_page_size_normalization() {
        assert_eq!(PageState::new(0, 30).normalized_size(), 30);
        assert_eq!(PageState::new(0, 7).normalized_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(PageState::new(0, 0).normalized_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
        assert_eq!(JobStatus::Cancelled.as_str(), "cancelled");
    }
}
