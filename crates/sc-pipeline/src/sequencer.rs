//! The stage sequencer.
//!
//! Extraction runs first, usually inline in the request that starts the job,
//! so input problems surface to the caller. Rendering, synthesis, animation
//! and composition follow in one background task:
//!
//! ```text
//! Extracting(5) -> Rendering(15) -> Synthesizing(25..40) -> Animating(50..75)
//!     -> Composing(75..95) -> Done(100)
//! ```
//!
//! Any stage's hard failure ends the job with status `error`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sc_av::ArtifactStore;
use sc_core::config::Config;
use sc_core::{Artifact, ArtifactKind, Slide};

use crate::batch::{BatchItem, BatchRunner, ProgressWindow, RetryPolicy};
use crate::cache::CacheGate;
use crate::compositor::CompositorDriver;
use crate::engine::{
    Animator, Compositor, EngineLease, SlideRenderer, SlideSource, Synthesizer,
};
use crate::job::JobHandle;
use crate::stages::{AnimationProducer, SynthesisProducer};

const SYNTHESIS: ProgressWindow = ProgressWindow::new(25, 40);
const ANIMATION: ProgressWindow = ProgressWindow::new(50, 75);

/// The collaborators a pipeline drives.
#[derive(Clone)]
pub struct Engines {
    pub source: Arc<dyn SlideSource>,
    pub renderer: Arc<dyn SlideRenderer>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub animator: Arc<dyn Animator>,
    pub compositor: Arc<dyn Compositor>,
}

/// Inputs of one job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub deck: PathBuf,
    pub face: PathBuf,
    /// Overrides the configured synthesis voice.
    pub voice: Option<String>,
}

/// Runs jobs against one artifact store.
pub struct Pipeline {
    engines: Engines,
    store: ArtifactStore,
    config: Arc<Config>,
}

impl Pipeline {
    pub fn new(engines: Engines, store: ArtifactStore, config: Arc<Config>) -> Self {
        Self {
            engines,
            store,
            config,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn engines(&self) -> &Engines {
        &self.engines
    }

    /// Validate the inputs and extract the slides.
    ///
    /// Failures are recorded on the job and returned as input errors.
    pub async fn extract(&self, job: &JobHandle, request: &JobRequest) -> sc_core::Result<Vec<Slide>> {
        job.status.update(5, "Extracting slides...");
        let result = async {
            validate_face(&request.face)?;
            if !request.deck.is_file() {
                return Err(sc_core::Error::Input(format!(
                    "presentation not found: {}",
                    request.deck.display()
                )));
            }
            let slides = self.engines.source.read(&request.deck).await?;
            if slides.is_empty() {
                return Err(sc_core::Error::Input(
                    "no slides found in the presentation".into(),
                ));
            }
            Ok(slides)
        }
        .await;

        match result {
            Ok(slides) => {
                tracing::info!(job_id = %job.id, "Extracted {} slides", slides.len());
                Ok(slides)
            }
            Err(e) => {
                job.status.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Run the background stages and record the outcome on the job.
    ///
    /// A cancelled job returns [`Cancelled`](sc_core::Error::Cancelled)
    /// without touching its status.
    pub async fn execute(
        &self,
        job: &JobHandle,
        request: &JobRequest,
        slides: &[Slide],
    ) -> sc_core::Result<PathBuf> {
        match self.run_stages(job, request, slides).await {
            Ok(path) => {
                job.status.complete();
                tracing::info!(job_id = %job.id, "Job completed: {}", path.display());
                Ok(path)
            }
            Err(sc_core::Error::Cancelled) => {
                tracing::info!(job_id = %job.id, "Job cancelled");
                Err(sc_core::Error::Cancelled)
            }
            Err(e) => {
                tracing::error!(job_id = %job.id, "Job failed: {e}");
                job.status.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Extract, then execute.
    pub async fn run(&self, job: &JobHandle, request: &JobRequest) -> sc_core::Result<PathBuf> {
        let slides = self.extract(job, request).await?;
        self.execute(job, request, &slides).await
    }

    async fn run_stages(
        &self,
        job: &JobHandle,
        request: &JobRequest,
        slides: &[Slide],
    ) -> sc_core::Result<PathBuf> {
        self.store.ensure()?;

        let images = self.render(job, &request.deck, slides).await?;
        let audio = self.synthesize(job, request, slides).await?;
        let videos = self.animate(job, &request.face, &audio).await?;

        job.status.update(75, "Composing final video...");
        let driver = CompositorDriver::new(
            self.engines.compositor.clone(),
            self.store.clone(),
            self.config.composition.geometry(),
            self.config.composition.max_segment(),
            self.config.processing.pairing,
        );
        driver.compose(videos, images, &job.status, &job.cancel).await
    }

    async fn render(
        &self,
        job: &JobHandle,
        deck: &Path,
        slides: &[Slide],
    ) -> sc_core::Result<Vec<Artifact>> {
        job.status.update(15, "Rendering slide images...");
        let mut images = Vec::with_capacity(slides.len());
        for slide in slides {
            if job.cancel.is_cancelled() {
                return Err(sc_core::Error::Cancelled);
            }
            match self.engines.renderer.render(deck, slide, &self.store).await {
                Ok(image) if image.present => images.push(image),
                Ok(image) => {
                    tracing::warn!(slide = slide.slide_number, "empty slide image: {}", image.path.display())
                }
                Err(e) => {
                    tracing::warn!(slide = slide.slide_number, "rendering failed: {e}");
                    job.status.slide_failed("rendering", slide.slide_number, &e);
                }
            }
        }
        if images.is_empty() {
            return Err(sc_core::Error::pipeline(
                "rendering",
                "no slide images were rendered",
            ));
        }
        Ok(images)
    }

    async fn synthesize(
        &self,
        job: &JobHandle,
        request: &JobRequest,
        slides: &[Slide],
    ) -> sc_core::Result<Vec<Artifact>> {
        job.status.update(25, "Generating audio...");
        let cfg = &self.config.synthesis;

        let items = slides
            .iter()
            .map(|slide| BatchItem {
                slide_number: slide.slide_number,
                output: self
                    .store
                    .path_for(ArtifactKind::NarrationAudio, slide.slide_number),
                payload: slide.narration_text.clone(),
            })
            .collect();

        let producer = SynthesisProducer {
            lease: EngineLease::acquire(self.engines.synthesizer.clone(), cfg.reset_cooldown())
                .await?,
            voice: request.voice.clone().or_else(|| cfg.voice.clone()),
        };
        let runner = BatchRunner {
            policy: RetryPolicy {
                max_attempts: cfg.max_attempts,
                backoff: cfg.retry_backoff(),
                settle: cfg.settle(),
                timeout: Some(cfg.timeout()),
            },
            cache: self.cache(),
            window: SYNTHESIS,
            status: &job.status,
            cancel: &job.cancel,
        };
        let outcome = runner.run(items, &producer).await;
        producer.lease.release().await;

        if outcome.cancelled {
            return Err(sc_core::Error::Cancelled);
        }
        if outcome.succeeded.is_empty() {
            return Err(sc_core::Error::pipeline(
                "synthesis",
                "no audio files were generated",
            ));
        }
        Ok(self.artifacts(ArtifactKind::NarrationAudio, &outcome.succeeded))
    }

    async fn animate(
        &self,
        job: &JobHandle,
        face: &Path,
        audio: &[Artifact],
    ) -> sc_core::Result<Vec<Artifact>> {
        job.status.update(50, "Animating faces...");
        let cfg = &self.config.animation;

        let items = audio
            .iter()
            .map(|a| BatchItem {
                slide_number: a.slide_number,
                output: self
                    .store
                    .path_for(ArtifactKind::AnimatedVideo, a.slide_number),
                payload: a.path.clone(),
            })
            .collect();

        let producer = AnimationProducer {
            lease: EngineLease::acquire(self.engines.animator.clone(), std::time::Duration::ZERO)
                .await?,
            face: face.to_path_buf(),
        };
        let runner = BatchRunner {
            policy: RetryPolicy {
                max_attempts: cfg.max_attempts,
                backoff: cfg.retry_backoff(),
                settle: cfg.settle(),
                // The engines enforce their own, longer limits.
                timeout: None,
            },
            cache: self.cache(),
            window: ANIMATION,
            status: &job.status,
            cancel: &job.cancel,
        };
        let outcome = runner.run(items, &producer).await;
        producer.lease.release().await;

        if outcome.cancelled {
            return Err(sc_core::Error::Cancelled);
        }
        if outcome.succeeded.is_empty() {
            return Err(sc_core::Error::pipeline(
                "animation",
                "no animated videos were generated",
            ));
        }
        Ok(self.artifacts(ArtifactKind::AnimatedVideo, &outcome.succeeded))
    }

    fn cache(&self) -> CacheGate {
        CacheGate::new(self.config.processing.skip_existing)
    }

    fn artifacts(&self, kind: ArtifactKind, slides: &[u32]) -> Vec<Artifact> {
        slides
            .iter()
            .map(|&n| self.store.artifact(kind, n))
            .filter(|a| a.present)
            .collect()
    }
}

/// The face image must exist and decode.
fn validate_face(face: &Path) -> sc_core::Result<()> {
    if !face.is_file() {
        return Err(sc_core::Error::Input(format!(
            "face image not found: {}",
            face.display()
        )));
    }
    let (width, height) = image::image_dimensions(face).map_err(|e| {
        sc_core::Error::Input(format!("face image cannot be decoded: {e}"))
    })?;
    if width == 0 || height == 0 {
        return Err(sc_core::Error::Input("face image is empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_must_decode() {
        let dir = tempfile::tempdir().unwrap();
        let face = dir.path().join("face.png");

        assert!(matches!(validate_face(&face), Err(sc_core::Error::Input(_))));

        std::fs::write(&face, b"not a png").unwrap();
        let err = validate_face(&face).unwrap_err();
        assert!(err.to_string().contains("cannot be decoded"));

        image::RgbImage::new(4, 4).save(&face).unwrap();
        assert!(validate_face(&face).is_ok());
    }
}
