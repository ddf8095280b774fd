//! Upstream provider client and job normalizer.
//!
//! Fetches raw instance records from a vast.ai-style API and normalizes
//! them into [`Job`]s. When no API key is configured, fixtures are forced,
//! or the upstream returns an empty list, a built-in fixture snapshot is
//! served instead so the rest of the service keeps working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::{Job, JobStatus};

const INSTANCES_ENDPOINT: &str = "/api/v0/instances";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One raw instance record as the provider ships it.
///
/// Only the fields the normalizer consumes are named; everything else is
/// captured in `extra` and passed through into `Job::metadata` verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInstance {
    pub id: Option<serde_json::Value>,
    pub gpu_name: Option<String>,
    pub geolocation: Option<String>,
    /// Hourly rate ("dollars per hour, total")
    pub dph_total: Option<f64>,
    pub cur_state: Option<String>,
    /// Elapsed seconds
    pub duration: Option<f64>,
    /// Unix seconds
    pub start_date: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Upstream response envelope
#[derive(Debug, Deserialize)]
struct InstancesPayload {
    #[serde(default)]
    instances: Vec<RawInstance>,
}

/// Map an upstream state label onto the job status enum.
///
/// Matching is by case-insensitive substring; anything unrecognized falls
/// back to `Queued` so the core never sees an out-of-enum status.
pub fn map_status(raw: &str) -> JobStatus {
    let state = raw.to_ascii_lowercase();
    if state.contains("run") {
        JobStatus::Running
    } else if state.contains("exit") || state.contains("stop") || state.contains("complet") {
        JobStatus::Completed
    } else if state.contains("fail") || state.contains("error") {
        JobStatus::Failed
    } else if state.contains("cancel") {
        JobStatus::Cancelled
    } else {
        JobStatus::Queued
    }
}

/// Render the provider's id (numeric or string) as an opaque string
fn render_id(id: &Option<serde_json::Value>) -> String {
    match id {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

/// Normalize one raw instance into the canonical job shape.
///
/// Missing labels become `"unknown"`, numeric fields clamp to zero, an
/// invalid start date falls back to the Unix epoch.
pub fn normalize(raw: RawInstance) -> Job {
    let created_at = raw
        .start_date
        .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    Job {
        id: render_id(&raw.id),
        gpu: raw.gpu_name.unwrap_or_else(|| "unknown".to_string()),
        region: raw.geolocation.unwrap_or_else(|| "unknown".to_string()),
        cost: raw.dph_total.unwrap_or(0.0).max(0.0),
        status: map_status(raw.cur_state.as_deref().unwrap_or("")),
        runtime: raw.duration.unwrap_or(0.0).max(0.0) as u64,
        created_at,
        metadata: raw.extra,
    }
}

/// Fixture snapshot served when the upstream is unavailable or empty.
pub fn fixture_instances(now: DateTime<Utc>) -> Vec<RawInstance> {
    fn fixture(
        id: u64,
        gpu: &str,
        region: &str,
        rate: f64,
        state: &str,
        duration: u64,
        now: DateTime<Utc>,
    ) -> RawInstance {
        RawInstance {
            id: Some(json!(id)),
            gpu_name: Some(gpu.to_string()),
            geolocation: Some(region.to_string()),
            dph_total: Some(rate),
            cur_state: Some(state.to_string()),
            duration: Some(duration as f64),
            start_date: Some((now.timestamp() - duration as i64) as f64),
            extra: serde_json::Map::new(),
        }
    }

    vec![
        fixture(1001, "A100", "us-west", 1.2, "running", 3600, now),
        fixture(1002, "RTX 4090", "us-east", 0.9, "running", 2400, now),
        fixture(1003, "T4", "eu-central", 0.4, "completed", 7200, now),
        fixture(1004, "A100", "us-west", 1.1, "running", 4800, now),
        fixture(1005, "RTX 3090", "us-east", 0.7, "queued", 0, now),
    ]
}

/// Client for the upstream instances API
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    use_fixtures: bool,
}

impl ProviderClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `base_url` - Provider base URL, no trailing slash
    /// * `api_key` - Upstream API key; `None` means fixtures only
    /// * `use_fixtures` - Force fixture data even when a key is present
    pub fn new(base_url: String, api_key: Option<String>, use_fixtures: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key,
            use_fixtures,
        })
    }

    /// Whether a real upstream is configured
    pub fn has_upstream(&self) -> bool {
        self.api_key.is_some() && !self.use_fixtures
    }

    async fn fetch_upstream(&self, api_key: &str) -> Result<Vec<RawInstance>> {
        let url = format!("{}{}", self.base_url, INSTANCES_ENDPOINT);
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "provider returned status {}",
                status
            )));
        }

        let payload: InstancesPayload = response.json().await?;
        Ok(payload.instances)
    }

    /// Fetch the raw instance snapshot, substituting fixtures when no key
    /// is configured, fixtures are forced, or the upstream list is empty.
    pub async fn fetch_raw_instances(&self) -> Result<Vec<RawInstance>> {
        if self.use_fixtures {
            return Ok(fixture_instances(Utc::now()));
        }

        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No provider API key configured, serving fixture data");
            return Ok(fixture_instances(Utc::now()));
        };

        let instances = self.fetch_upstream(api_key).await?;
        if instances.is_empty() {
            warn!("Upstream returned no instances, serving fixture data");
            return Ok(fixture_instances(Utc::now()));
        }

        info!(count = instances.len(), "Fetched instances from provider");
        Ok(instances)
    }

    /// Fetch the raw payload in the upstream envelope shape, for the
    /// passthrough endpoint.
    pub async fn fetch_raw(&self) -> Result<serde_json::Value> {
        let instances = self.fetch_raw_instances().await?;
        Ok(json!({ "instances": instances }))
    }

    /// Fetch and normalize the current job snapshot.
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>> {
        let raw = self.fetch_raw_instances().await?;
        Ok(raw.into_iter().map(normalize).collect())
    }
}
