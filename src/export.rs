//! Export serializer: turns a filtered job collection plus the filter that
//! produced it into CSV or JSON text.
//!
//! The caller hands over the query engine's filtered (not paginated)
//! output; rows are written in the order given. The opaque metadata bag is
//! omitted from CSV, which has no stable tabular shape for it, and carried
//! verbatim in JSON.

use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{Job, JobFilter};

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Parse a format selector; unrecognized values fall back to CSV
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Serialize jobs as CSV, one record per job in the order given.
pub fn to_csv(jobs: &[Job]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "gpu",
        "region",
        "cost",
        "status",
        "runtime_seconds",
        "created_at",
    ])?;
    for job in jobs {
        let cost = format!("{:.2}", job.cost);
        let runtime = job.runtime.to_string();
        let created_at = job.created_at.to_rfc3339();
        writer.write_record([
            job.id.as_str(),
            job.gpu.as_str(),
            job.region.as_str(),
            cost.as_str(),
            job.status.as_str(),
            runtime.as_str(),
            created_at.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}

/// Serialize jobs as pretty JSON, echoing the filter parameters that
/// produced the collection.
pub fn to_json(jobs: &[Job], filter: &JobFilter) -> Result<String> {
    let document = json!({
        "filters": filter,
        "count": jobs.len(),
        "jobs": jobs,
    });
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use chrono::{TimeZone, Utc};

    fn make_job(id: &str) -> Job {
        let mut metadata = serde_json::Map::new();
        metadata.insert("owner".to_string(), "ml-team".into());
        Job {
            id: id.to_string(),
            gpu: "A100".to_string(),
            region: "us-west".to_string(),
            cost: 1.2,
            status: JobStatus::Running,
            runtime: 3600,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 9, 30, 0).unwrap(),
            metadata,
        }
    }

    #[test]
    fn test_csv_has_header_plus_one_row_per_job() {
        let jobs = vec![make_job("job-1"), make_job("job-2")];
        let csv = to_csv(&jobs).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "id,gpu,region,cost,status,runtime_seconds,created_at"
        );
        assert!(lines[1].starts_with("job-1,A100,us-west,1.20,running,3600,"));
    }

    #[test]
    fn test_csv_of_empty_collection_is_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_json_round_trips_jobs_in_order_and_echoes_filter() {
        let jobs = vec![make_job("job-2"), make_job("job-1")];
        let filter = JobFilter {
            gpu: Some("A100".into()),
            ..Default::default()
        };
        let text = to_json(&jobs, &filter).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed["count"], 2);
        assert_eq!(parsed["filters"]["gpu"], "A100");
        assert_eq!(parsed["jobs"][0]["id"], "job-2");
        assert_eq!(parsed["jobs"][1]["id"], "job-1");
        // Metadata passes through verbatim.
        assert_eq!(parsed["jobs"][0]["metadata"]["owner"], "ml-team");
    }

    #[test]
    fn test_format_fallback_is_csv() {
        assert_eq!(ExportFormat::parse("json"), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("csv"), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse("xlsx"), ExportFormat::Csv);
    }
}
