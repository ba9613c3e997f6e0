//! Voice previews: a short sample clip per voice, downloadable by name.

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::download::serve_attachment;

const PREVIEW_TEXT: &str = "This is a voice preview.";

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PreviewRequest {
    #[serde(default)]
    pub voice_name: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PreviewResponse {
    pub success: bool,
    pub download_url: String,
    pub voice_name: String,
}

/// POST /api/preview-voice
#[utoipa::path(
    post,
    path = "/api/preview-voice",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Preview written", body = PreviewResponse),
        (status = 400, description = "No usable voice name")
    )
)]
pub async fn preview_voice(
    State(ctx): State<AppContext>,
    Json(body): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let voice = body.voice_name.trim();
    if voice.is_empty() {
        return Err(sc_core::Error::Validation("No voice name provided".into()).into());
    }

    let path = ctx.store.preview_path(voice)?;
    std::fs::create_dir_all(ctx.store.previews_dir()).map_err(sc_core::Error::from)?;

    tracing::info!("Generating voice preview for {voice}");
    ctx.pipeline
        .engines()
        .synthesizer
        .synthesize(PREVIEW_TEXT, Some(voice), &path)
        .await?;
    if !sc_core::is_present(&path) {
        return Err(sc_core::Error::pipeline("preview", "no preview audio was written").into());
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Json(PreviewResponse {
        success: true,
        download_url: format!("/api/download-preview/{file_name}"),
        voice_name: voice.to_string(),
    }))
}

/// GET /api/download-preview/{filename}
#[utoipa::path(
    get,
    path = "/api/download-preview/{filename}",
    params(("filename" = String, Path, description = "Preview file name")),
    responses(
        (status = 200, description = "The preview clip", content_type = "audio/wav"),
        (status = 404, description = "No such preview")
    )
)]
pub async fn download_preview(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    let path = match ctx.store.preview_file(&filename) {
        Ok(path) if sc_core::is_present(&path) => path,
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Preview file not found" })),
            )
                .into_response()
        }
    };
    serve_attachment(&path, "audio/wav", request).await
}
