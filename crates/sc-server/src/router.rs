//! Axum router construction.
//!
//! Builds the full application router with all routes, middleware layers,
//! the OpenAPI document and static file serving.

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::process::process,
        routes::status::get_status,
        routes::download::download,
        routes::cleanup::cleanup,
        routes::cleanup::reset,
        routes::voices::list_voices,
        routes::preview::preview_voice,
        routes::preview::download_preview,
        routes::admin::tools,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::process::ProcessResponse,
        routes::cleanup::CleanupResponse,
        routes::cleanup::ResetResponse,
        routes::voices::VoicesResponse,
        routes::preview::PreviewRequest,
        routes::preview::PreviewResponse,
        sc_pipeline::JobStatus,
        sc_pipeline::JobState,
        sc_core::Slide,
        sc_av::actions::Voice,
        sc_av::ToolInfo,
    ))
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = ctx.config.server.max_upload_mb.saturating_mul(1024 * 1024);

    let api = Router::new()
        .route(
            "/process",
            post(routes::process::process).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/status", get(routes::status::get_status))
        .route("/download", get(routes::download::download))
        .route("/cleanup", post(routes::cleanup::cleanup))
        .route("/reset", post(routes::cleanup::reset))
        .route("/voices", get(routes::voices::list_voices))
        .route("/preview-voice", post(routes::preview::preview_voice))
        .route(
            "/download-preview/{filename}",
            get(routes::preview::download_preview),
        )
        .route("/events", get(routes::events::events_handler))
        .route("/admin/tools", get(routes::admin::tools));

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Static file serving for the upload page.
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                tower_http::services::ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(tower_http::services::ServeFile::new(index_path)),
            );
        }
    }

    app
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_documented_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/process",
            "/api/status",
            "/api/download",
            "/api/cleanup",
            "/api/reset",
            "/api/voices",
            "/api/preview-voice",
            "/api/download-preview/{filename}",
            "/api/admin/tools",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
