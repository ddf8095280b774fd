//! Pure filter predicates over jobs, one per filterable dimension.
//!
//! Predicates never panic and never reject a request: a malformed bound
//! degrades to "unbounded" on that side. All active predicates are ANDed
//! by [`matches`].

use crate::models::{Job, JobFilter};

/// Parse an optional numeric bound. Empty or unparseable input means the
/// side is unbounded, not an error.
fn parse_bound(raw: &Option<String>) -> Option<f64> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

/// GPU label equality, case-sensitive
pub fn matches_gpu(job: &Job, filter: &JobFilter) -> bool {
    match &filter.gpu {
        Some(gpu) => job.gpu == *gpu,
        None => true,
    }
}

/// Region label equality, case-sensitive
pub fn matches_region(job: &Job, filter: &JobFilter) -> bool {
    match &filter.region {
        Some(region) => job.region == *region,
        None => true,
    }
}

/// Status equality against the canonical lowercase label. An unknown
/// status string matches nothing rather than erroring.
pub fn matches_status(job: &Job, filter: &JobFilter) -> bool {
    match &filter.status {
        Some(status) => job.status.as_str() == status,
        None => true,
    }
}

/// Inclusive cost range
pub fn matches_cost(job: &Job, filter: &JobFilter) -> bool {
    if let Some(min) = parse_bound(&filter.cost_min) {
        if job.cost < min {
            return false;
        }
    }
    if let Some(max) = parse_bound(&filter.cost_max) {
        if job.cost > max {
            return false;
        }
    }
    true
}

/// Runtime range derived from h/m/s sub-fields.
///
/// The min side is active whenever the sub-field group was supplied: a
/// group that collapses to 0 still constrains `runtime >= 0`, a no-op.
/// The max side is active only when its derived total is > 0, since an
/// all-empty max group collapses to zero and must not exclude every job.
pub fn matches_runtime(job: &Job, filter: &JobFilter) -> bool {
    if let Some(min) = &filter.runtime_min {
        if job.runtime < min.total_seconds() {
            return false;
        }
    }
    if let Some(max) = &filter.runtime_max {
        let max_seconds = max.total_seconds();
        if max_seconds > 0 && job.runtime > max_seconds {
            return false;
        }
    }
    true
}

/// AND-composition of every predicate
pub fn matches(job: &Job, filter: &JobFilter) -> bool {
    matches_gpu(job, filter)
        && matches_region(job, filter)
        && matches_status(job, filter)
        && matches_cost(job, filter)
        && matches_runtime(job, filter)
}
