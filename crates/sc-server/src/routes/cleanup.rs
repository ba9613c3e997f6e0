//! Reset and cleanup route handlers.
//!
//! Both cancel the in-flight job and put the status back to idle; cleanup
//! also deletes every generated and uploaded file.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use sc_core::events::EventPayload;

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ResetResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CleanupResponse {
    pub success: bool,
    /// Number of files deleted.
    pub removed: usize,
}

/// POST /api/reset
#[utoipa::path(
    post,
    path = "/api/reset",
    responses((status = 200, description = "Status reset to idle", body = ResetResponse))
)]
pub async fn reset(State(ctx): State<AppContext>) -> Json<ResetResponse> {
    ctx.jobs.reset();
    Json(ResetResponse { success: true })
}

/// POST /api/cleanup
#[utoipa::path(
    post,
    path = "/api/cleanup",
    responses(
        (status = 200, description = "Generated files removed", body = CleanupResponse),
        (status = 500, description = "Files could not be removed")
    )
)]
pub async fn cleanup(State(ctx): State<AppContext>) -> Result<Json<CleanupResponse>, AppError> {
    ctx.jobs.reset();

    let store = ctx.store.clone();
    let removed = tokio::task::spawn_blocking(move || store.clean())
        .await
        .map_err(|e| sc_core::Error::Internal(format!("cleanup task failed: {e}")))??;

    ctx.event_bus
        .broadcast(EventPayload::ArtifactsCleaned { removed });

    Ok(Json(CleanupResponse {
        success: true,
        removed,
    }))
}
