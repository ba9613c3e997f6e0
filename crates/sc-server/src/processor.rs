//! Background execution of admitted jobs.

use sc_core::Slide;
use sc_pipeline::{JobHandle, JobRequest};
use tokio::task::JoinHandle;

use crate::context::AppContext;

/// Run the post-extraction stages of `job` on a background task.
///
/// The outcome is recorded on the job's status tracker, so the returned
/// handle only matters to callers that want to wait for it.
pub fn spawn_job(
    ctx: &AppContext,
    job: JobHandle,
    request: JobRequest,
    slides: Vec<Slide>,
) -> JoinHandle<()> {
    let pipeline = ctx.pipeline.clone();
    tokio::spawn(async move {
        tracing::info!(job_id = %job.id, slides = slides.len(), "Background processing started");
        if let Err(e) = pipeline.execute(&job, &request, &slides).await {
            tracing::debug!(job_id = %job.id, "Background processing ended: {e}");
        }
    })
}
