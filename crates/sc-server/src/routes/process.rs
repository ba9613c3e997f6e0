//! Job start: upload a deck and a face image, get the extracted slides back.
//!
//! Extraction happens inside the request so input problems (unsupported
//! format, no slides, undecodable face) come back as 4xx. Rendering,
//! synthesis, animation and composition continue on a background task.

use std::path::PathBuf;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use sc_core::{JobId, Slide};
use sc_deck::DeckFormat;
use sc_pipeline::JobRequest;

use crate::context::AppContext;
use crate::error::AppError;
use crate::processor;

/// Response body of a successful start.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProcessResponse {
    pub success: bool,
    pub job_id: JobId,
    pub slides: Vec<Slide>,
}

/// One uploaded file held in memory until the job is admitted.
struct Upload {
    file_name: String,
    data: Vec<u8>,
}

#[derive(Default)]
struct ProcessForm {
    deck: Option<Upload>,
    face: Option<Upload>,
    voice: Option<String>,
}

/// POST /api/process
///
/// Multipart fields: `pptx_file` (a `.pptx` or `.pdf` deck), `face_file`
/// (an image) and an optional `selected_voice`.
#[utoipa::path(
    post,
    path = "/api/process",
    request_body(content_type = "multipart/form-data", description = "pptx_file, face_file, selected_voice"),
    responses(
        (status = 200, description = "Slides extracted, processing started", body = ProcessResponse),
        (status = 400, description = "Missing or malformed upload"),
        (status = 409, description = "A presentation is already being processed"),
        (status = 422, description = "The deck or face image cannot be used")
    )
)]
pub async fn process(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Json<ProcessResponse>, AppError> {
    let form = read_form(multipart).await?;

    let deck = form.deck.ok_or_else(|| {
        sc_core::Error::Validation("no presentation uploaded (field pptx_file)".into())
    })?;
    let face = form.face.ok_or_else(|| {
        sc_core::Error::Validation("no face image uploaded (field face_file)".into())
    })?;
    DeckFormat::detect(std::path::Path::new(&deck.file_name))?;

    // Admit before touching the uploads directory so a running job never
    // sees its inputs replaced.
    let job = ctx.jobs.admit()?;

    let request = match store_uploads(&ctx, &deck, &face, form.voice).await {
        Ok(request) => request,
        Err(e) => {
            job.status.fail(e.to_string());
            return Err(e.into());
        }
    };

    let slides = ctx.pipeline.extract(&job, &request).await?;
    tracing::info!(
        job_id = %job.id,
        deck = %request.deck.display(),
        "Accepted presentation with {} slides",
        slides.len()
    );

    let job_id = job.id;
    processor::spawn_job(&ctx, job, request, slides.clone());

    Ok(Json(ProcessResponse {
        success: true,
        job_id,
        slides,
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<ProcessForm, AppError> {
    let mut form = ProcessForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pptx_file" | "face_file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?.to_vec();
                if file_name.is_empty() || data.is_empty() {
                    continue;
                }
                let upload = Upload { file_name, data };
                if name == "pptx_file" {
                    form.deck = Some(upload);
                } else {
                    form.face = Some(upload);
                }
            }
            "selected_voice" => {
                let voice = field.text().await?;
                let voice = voice.trim();
                if !voice.is_empty() {
                    form.voice = Some(voice.to_string());
                }
            }
            other => tracing::debug!("Ignoring unknown form field {other:?}"),
        }
    }
    Ok(form)
}

async fn store_uploads(
    ctx: &AppContext,
    deck: &Upload,
    face: &Upload,
    voice: Option<String>,
) -> sc_core::Result<JobRequest> {
    ctx.store.ensure()?;
    let deck_path = write_upload(ctx, deck).await?;
    let face_path = write_upload(ctx, face).await?;
    Ok(JobRequest {
        deck: deck_path,
        face: face_path,
        voice,
    })
}

async fn write_upload(ctx: &AppContext, upload: &Upload) -> sc_core::Result<PathBuf> {
    let path = ctx.store.upload_path(&upload.file_name)?;
    tokio::fs::write(&path, &upload.data).await?;
    tracing::debug!("Stored upload {} ({} bytes)", path.display(), upload.data.len());
    Ok(path)
}
