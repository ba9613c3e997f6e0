//! Synthesis voice listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use sc_av::actions::Voice;

use crate::context::AppContext;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VoicesResponse {
    pub voices: Vec<Voice>,
}

/// GET /api/voices
///
/// An unavailable synthesizer yields an empty list rather than an error so
/// the upload form can still fall back to the default voice.
#[utoipa::path(
    get,
    path = "/api/voices",
    responses((status = 200, description = "Available synthesis voices", body = VoicesResponse))
)]
pub async fn list_voices(State(ctx): State<AppContext>) -> Json<VoicesResponse> {
    let voices = match ctx.pipeline.engines().synthesizer.voices().await {
        Ok(voices) => voices,
        Err(e) => {
            tracing::warn!("Failed to list voices: {e}");
            Vec::new()
        }
    };
    Json(VoicesResponse { voices })
}
