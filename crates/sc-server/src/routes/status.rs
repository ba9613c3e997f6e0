//! Job status route handler.

use axum::extract::State;
use axum::Json;
use sc_pipeline::JobStatus;

use crate::context::AppContext;

/// GET /api/status
///
/// Snapshot of the current job. Reads never block the running job for
/// longer than a field copy.
#[utoipa::path(
    get,
    path = "/api/status",
    responses((status = 200, description = "Current job status", body = JobStatus))
)]
pub async fn get_status(State(ctx): State<AppContext>) -> Json<JobStatus> {
    Json(ctx.jobs.status())
}
