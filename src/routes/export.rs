//! Export download endpoint

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::export::{self, ExportFormat};
use crate::query;
use crate::routes::jobs::JobsQuery;
use crate::state::AppState;

/// Query parameters for the export endpoint: a format selector plus the
/// same filter parameters the jobs endpoint takes. Sort and pagination
/// are ignored; the export covers the whole filtered set in snapshot
/// order.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// "csv" (default) or "json"
    pub format: Option<String>,
    #[serde(flatten)]
    pub query: JobsQuery,
}

/// GET /api/v1/jobs/export
///
/// Serializes the filtered (not paginated) job set as a file download.
pub async fn export_jobs(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response> {
    state.metrics.inc_requests();

    let format = ExportFormat::parse(params.format.as_deref().unwrap_or("csv"));
    let filter = params.query.filter();

    let jobs = state.provider.fetch_jobs().await?;
    state.metrics.inc_provider_fetches();

    let filtered = query::filter_jobs(&jobs, &filter);
    let body = match format {
        ExportFormat::Csv => export::to_csv(&filtered)?,
        ExportFormat::Json => export::to_json(&filtered, &filter)?,
    };
    state.metrics.inc_exports();

    info!(
        format = format.file_extension(),
        exported = filtered.len(),
        "Jobs exported"
    );

    let filename = format!("jobs-export.{}", format.file_extension());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
