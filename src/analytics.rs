//! Aggregation engine: windowed summary analytics and grouped rollups.
//!
//! Everything here is a pure function of `(jobs, window, now)`. [`analyze`]
//! evaluates the clock once and delegates to [`analyze_at`], which tests
//! and callers with their own clock discipline use directly.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::models::{
    AnalyticsSummary, DayBucket, GpuFrequency, GroupKey, GroupRollup, Job, RegionCost,
    RegionCount, TimeWindow,
};

/// Days of history the usage series keeps
const SERIES_MAX_DAYS: usize = 14;
/// GPU labels reported in the frequency ranking
const TOP_GPUS: usize = 10;
/// Regions reported in the top-regions ranking
const TOP_REGIONS: usize = 5;

/// Round to 2 decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Actual elapsed cost of a job: hourly rate times hours run
fn elapsed_cost(job: &Job) -> f64 {
    job.cost * (job.runtime as f64 / 3600.0)
}

/// Accrue `amount` per job into per-key totals, keys in first-encountered
/// order so later stable sorts leave ties in that order.
fn accrue_by<'a>(
    jobs: &[&'a Job],
    key_of: impl Fn(&'a Job) -> &'a str,
    amount: impl Fn(&'a Job) -> f64,
) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for &job in jobs {
        let key = key_of(job);
        match index.get(key) {
            Some(&i) => totals[i].1 += amount(job),
            None => {
                index.insert(key, totals.len());
                totals.push((key.to_string(), amount(job)));
            }
        }
    }
    totals
}

/// Count jobs per key, keys in first-encountered order
fn count_by<'a>(jobs: &[&'a Job], key_of: impl Fn(&'a Job) -> &'a str) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for &job in jobs {
        let key = key_of(job);
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }
    counts
}

/// Compute the windowed analytics summary with the clock evaluated now.
pub fn analyze(jobs: &[Job], window: TimeWindow) -> Option<AnalyticsSummary> {
    analyze_at(jobs, window, Utc::now())
}

/// Compute the windowed analytics summary against an explicit `now`.
///
/// Returns `None` when no job falls inside the window, so callers can
/// render an explicit empty state instead of a zeroed summary.
pub fn analyze_at(jobs: &[Job], window: TimeWindow, now: DateTime<Utc>) -> Option<AnalyticsSummary> {
    let cutoff = now - window.duration();
    let windowed: Vec<&Job> = jobs.iter().filter(|job| job.created_at >= cutoff).collect();
    if windowed.is_empty() {
        return None;
    }

    // Daily series: bucket on the UTC date component, chronological,
    // truncated to the most recent populated days. Sparse days stay absent.
    let mut day_counts: BTreeMap<chrono::NaiveDate, u64> = BTreeMap::new();
    for job in &windowed {
        *day_counts.entry(job.created_at.date_naive()).or_insert(0) += 1;
    }
    let buckets: Vec<DayBucket> = day_counts
        .into_iter()
        .map(|(day, count)| DayBucket { day, count })
        .collect();
    let drop = buckets.len().saturating_sub(SERIES_MAX_DAYS);
    let series_by_day = buckets[drop..].to_vec();

    // Cost by region: accrue raw elapsed cost, round each total at the
    // end, then rank. Ties on the rounded value keep first-seen order.
    let region_costs = accrue_by(&windowed, |job| &job.region, elapsed_cost);
    let total_cost_raw: f64 = region_costs.iter().map(|(_, cost)| cost).sum();
    let mut cost_by_region: Vec<RegionCost> = region_costs
        .into_iter()
        .map(|(region, cost)| RegionCost {
            region,
            cost: round2(cost),
        })
        .collect();
    cost_by_region.sort_by(|a, b| b.cost.total_cmp(&a.cost));

    // GPU frequency, top 10, ties in first-encountered order.
    let mut gpu_counts = count_by(&windowed, |job| &job.gpu);
    gpu_counts.sort_by(|a, b| b.1.cmp(&a.1));
    gpu_counts.truncate(TOP_GPUS);
    let frequency_by_gpu = gpu_counts
        .into_iter()
        .map(|(gpu, count)| GpuFrequency { gpu, count })
        .collect();

    // Top regions by raw job count, not cost.
    let mut region_counts = count_by(&windowed, |job| &job.region);
    region_counts.sort_by(|a, b| b.1.cmp(&a.1));
    region_counts.truncate(TOP_REGIONS);
    let top_regions = region_counts
        .into_iter()
        .map(|(region, count)| RegionCount { region, count })
        .collect();

    let total_jobs = windowed.len();
    let runtime_sum: u64 = windowed.iter().map(|job| job.runtime).sum();
    let average_runtime_seconds = (runtime_sum as f64 / total_jobs as f64).round() as u64;

    Some(AnalyticsSummary {
        series_by_day,
        cost_by_region,
        frequency_by_gpu,
        total_jobs,
        total_cost: round2(total_cost_raw),
        average_runtime_seconds,
        top_regions,
    })
}

/// Group a job collection by one dimension into cost/runtime rollups.
///
/// Groups appear in first-encountered order; callers wanting a windowed
/// rollup cut the collection down first.
pub fn rollup(jobs: &[Job], group_by: GroupKey) -> Vec<GroupRollup> {
    struct Accum {
        total_cost: f64,
        runtime_sum: u64,
        count: usize,
    }

    let mut groups: Vec<(String, Accum)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for job in jobs {
        let key = match group_by {
            GroupKey::Gpu => job.gpu.as_str(),
            GroupKey::Region => job.region.as_str(),
            GroupKey::Status => job.status.as_str(),
        };
        let i = match index.get(key) {
            Some(&i) => i,
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push((
                    key.to_string(),
                    Accum {
                        total_cost: 0.0,
                        runtime_sum: 0,
                        count: 0,
                    },
                ));
                groups.len() - 1
            }
        };
        let accum = &mut groups[i].1;
        accum.total_cost += job.cost;
        accum.runtime_sum += job.runtime;
        accum.count += 1;
    }

    groups
        .into_iter()
        .map(|(key, accum)| GroupRollup {
            key,
            total_cost: accum.total_cost,
            average_runtime_seconds: if accum.count > 0 {
                accum.runtime_sum as f64 / accum.count as f64
            } else {
                0.0
            },
            count: accum.count,
        })
        .collect()
}
