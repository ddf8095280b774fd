//! Query engine: filter, stable sort, and page slice over a job snapshot.
//!
//! Every operation is a pure function of its inputs. The engine never
//! mutates the caller's slice and holds no state between calls, so
//! identical `(jobs, filter, sort, page)` inputs always produce identical
//! output.

use std::cmp::Ordering;

use serde::Serialize;

use crate::filter;
use crate::models::{Job, JobFilter, PageState, SortDirection, SortKey, SortState};

/// One page of query results plus the counts the caller needs for a
/// "showing N of M" summary.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    /// The requested page, in sorted order
    pub rows: Vec<Job>,
    /// Jobs surviving the filter, across all pages
    pub total_filtered: usize,
    /// Jobs in the unfiltered snapshot
    pub total_all: usize,
}

/// Compare two jobs on a single column.
fn compare_by(a: &Job, b: &Job, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Gpu => a.gpu.cmp(&b.gpu),
        SortKey::Region => a.region.cmp(&b.region),
        SortKey::Cost => a.cost.total_cmp(&b.cost),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        SortKey::Runtime => a.runtime.cmp(&b.runtime),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Filter a snapshot, preserving relative order. This is the copy handed
/// to the export serializer: filtered but not paginated.
pub fn filter_jobs(jobs: &[Job], filter: &JobFilter) -> Vec<Job> {
    jobs.iter()
        .filter(|job| filter::matches(job, filter))
        .cloned()
        .collect()
}

/// Apply filter, sort, and pagination to a job snapshot.
///
/// Sorting is stable: jobs with equal sort keys keep their relative input
/// order in both directions. An out-of-range page index yields an empty
/// page, not an error.
pub fn query(jobs: &[Job], filter: &JobFilter, sort: &SortState, page: &PageState) -> QueryResult {
    let mut filtered: Vec<&Job> = jobs
        .iter()
        .filter(|job| filter::matches(job, filter))
        .collect();
    let total_filtered = filtered.len();

    filtered.sort_by(|a, b| {
        let ord = compare_by(a, b, sort.key);
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let page_size = page.normalized_size();
    let start = page.page_index.saturating_mul(page_size);
    let rows = if start >= filtered.len() {
        Vec::new()
    } else {
        filtered[start..(start + page_size).min(filtered.len())]
            .iter()
            .map(|job| (*job).clone())
            .collect()
    };

    QueryResult {
        rows,
        total_filtered,
        total_all: jobs.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use chrono::{TimeZone, Utc};

    fn make_job(id: &str, gpu: &str, cost: f64, runtime: u64, day: u32) -> Job {
        Job {
            id: id.to_string(),
            gpu: gpu.to_string(),
            region: "us-east".to_string(),
            cost,
            status: JobStatus::Running,
            runtime,
            created_at: Utc.with_ymd_and_hms(2026, 7, day, 12, 0, 0).unwrap(),
            metadata: serde_json::Map::new(),
        }
    }

    fn snapshot() -> Vec<Job> {
        vec![
            make_job("a", "A100", 1.2, 3600, 1),
            make_job("b", "T4", 0.4, 7200, 2),
            make_job("c", "A100", 0.9, 1800, 3),
            make_job("d", "RTX 4090", 0.9, 2400, 4),
            make_job("e", "A100", 0.4, 600, 5),
        ]
    }

    #[test]
    fn test_default_sort_is_created_at_desc() {
        let jobs = snapshot();
        let result = query(
            &jobs,
            &JobFilter::default(),
            &SortState::default(),
            &PageState::default(),
        );
        let ids: Vec<&str> = result.rows.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["e", "d", "c", "b", "a"]);
        assert_eq!(result.total_filtered, 5);
        assert_eq!(result.total_all, 5);
    }

    #[test]
    fn test_filter_count_never_exceeds_input() {
        let jobs = snapshot();
        let filter = JobFilter {
            gpu: Some("A100".into()),
            ..Default::default()
        };
        let result = query(&jobs, &filter, &SortState::default(), &PageState::default());
        assert!(result.total_filtered <= jobs.len());
        assert_eq!(result.total_filtered, 3);
        assert!(result.rows.iter().all(|j| j.gpu == "A100"));
    }

    #[test]
    fn test_gpu_filter_is_independent_of_sort_and_page() {
        let jobs = snapshot();
        let filter = JobFilter {
            gpu: Some("A100".into()),
            ..Default::default()
        };
        for key in [SortKey::Cost, SortKey::Id, SortKey::Runtime] {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let result = query(
                    &jobs,
                    &filter,
                    &SortState { key, direction },
                    &PageState::new(0, 10),
                );
                assert_eq!(result.total_filtered, 3);
                assert_eq!(result.rows.len(), 3);
            }
        }
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let jobs = snapshot();
        // b, c, d, e all tie pairwise on cost 0.9/0.4; equal keys must keep
        // input order in both directions.
        let asc = query(
            &jobs,
            &JobFilter::default(),
            &SortState {
                key: SortKey::Cost,
                direction: SortDirection::Asc,
            },
            &PageState::default(),
        );
        let ids: Vec<&str> = asc.rows.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["b", "e", "c", "d", "a"]);

        let desc = query(
            &jobs,
            &JobFilter::default(),
            &SortState {
                key: SortKey::Cost,
                direction: SortDirection::Desc,
            },
            &PageState::default(),
        );
        let ids: Vec<&str> = desc.rows.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "d", "b", "e"]);
    }

    #[test]
    fn test_pages_partition_the_filtered_set() {
        let jobs: Vec<Job> = (0..47)
            .map(|i| make_job(&format!("job-{i:02}"), "A100", 1.0, 60, 1 + (i % 28) as u32))
            .collect();
        let sort = SortState {
            key: SortKey::Id,
            direction: SortDirection::Asc,
        };

        let mut reassembled = Vec::new();
        let mut index = 0;
        loop {
            let page = query(
                &jobs,
                &JobFilter::default(),
                &sort,
                &PageState::new(index, 10),
            );
            if page.rows.is_empty() {
                break;
            }
            reassembled.extend(page.rows);
            index += 1;
        }

        assert_eq!(reassembled.len(), 47);
        let ids: Vec<&String> = reassembled.iter().map(|j| &j.id).collect();
        let mut expected: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
        expected.sort();
        assert!(ids.iter().zip(expected.iter()).all(|(a, b)| **a == *b));
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let jobs = snapshot();
        let result = query(
            &jobs,
            &JobFilter::default(),
            &SortState::default(),
            &PageState::new(99, 20),
        );
        assert!(result.rows.is_empty());
        assert_eq!(result.total_filtered, 5);
    }

    #[test]
    fn test_query_does_not_mutate_input() {
        let jobs = snapshot();
        let before: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
        let _ = query(
            &jobs,
            &JobFilter::default(),
            &SortState {
                key: SortKey::Cost,
                direction: SortDirection::Asc,
            },
            &PageState::default(),
        );
        let after: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_filter_jobs_preserves_order() {
        let jobs = snapshot();
        let filter = JobFilter {
            gpu: Some("A100".into()),
            ..Default::default()
        };
        let filtered = filter_jobs(&jobs, &filter);
        let ids: Vec<&str> = filtered.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "e"]);
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let jobs = snapshot();
        let filter = JobFilter {
            cost_min: Some("0.5".into()),
            ..Default::default()
        };
        let sort = SortState {
            key: SortKey::Runtime,
            direction: SortDirection::Desc,
        };
        let page = PageState::new(0, 10);
        let first = query(&jobs, &filter, &sort, &page);
        let second = query(&jobs, &filter, &sort, &page);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
