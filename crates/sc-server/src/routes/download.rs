//! Final video download.

use std::path::Path;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::context::AppContext;

/// GET /api/download
///
/// Serves the final video as an attachment. Range requests are honored.
#[utoipa::path(
    get,
    path = "/api/download",
    responses(
        (status = 200, description = "The final video", content_type = "video/mp4"),
        (status = 404, description = "No final video yet")
    )
)]
pub async fn download(State(ctx): State<AppContext>, request: Request) -> Response {
    let path = ctx.store.final_video();
    if !sc_core::is_present(&path) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Video not ready yet" })),
        )
            .into_response();
    }

    serve_attachment(&path, "video/mp4", request).await
}

/// Serve `path` with `content_type` as a download named after the file.
pub(crate) async fn serve_attachment(
    path: &Path,
    content_type: &'static str,
    request: Request,
) -> Response {
    let served = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let mut response = served.map(Body::new);
    if response.status().is_success() {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".into());
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\"")) {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, value);
    }
    response
}
