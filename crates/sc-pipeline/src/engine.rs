//! The seams between the orchestrator and its external collaborators.
//!
//! Stateful engines (narration synthesis, face animation) implement
//! [`Engine`] and are driven through an [`EngineLease`]. The stateless
//! collaborators (compositing, extraction, rendering) are plain traits.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sc_av::actions::Voice;
use sc_av::ArtifactStore;
use sc_core::config::OverlayGeometry;
use sc_core::{Artifact, Slide};

/// Lifecycle hooks of a stateful engine.
///
/// All hooks default to no-ops for engines that spawn a fresh process per
/// call.
#[async_trait]
pub trait Engine: Send + Sync {
    fn name(&self) -> &str;

    /// Prepare the engine for a batch.
    async fn acquire(&self) -> sc_core::Result<()> {
        Ok(())
    }

    /// Fully reinitialize the engine.
    async fn reset(&self) -> sc_core::Result<()> {
        Ok(())
    }

    /// Give the engine back after a batch.
    async fn release(&self) {}
}

/// Narration synthesis.
#[async_trait]
pub trait Synthesizer: Engine {
    /// Speak `text` into a non-empty audio file at `output`.
    async fn synthesize(&self, text: &str, voice: Option<&str>, output: &Path)
        -> sc_core::Result<()>;

    /// Voices this engine can speak with.
    async fn voices(&self) -> sc_core::Result<Vec<Voice>> {
        Ok(Vec::new())
    }
}

/// Face animation.
#[async_trait]
pub trait Animator: Engine {
    /// Produce a non-empty video of `face` speaking `audio` at `output`.
    async fn animate(&self, audio: &Path, face: &Path, output: &Path) -> sc_core::Result<()>;
}

/// Video compositing.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Overlay `foreground` on the still `background`, taking audio from the
    /// foreground and capping the length at `max_length`.
    async fn overlay(
        &self,
        background: &Path,
        foreground: &Path,
        geometry: &OverlayGeometry,
        max_length: Duration,
        output: &Path,
    ) -> sc_core::Result<()>;

    /// Join `segments` in order into `output`.
    async fn concat(&self, segments: &[PathBuf], output: &Path) -> sc_core::Result<()>;
}

/// Slide extraction, narration included.
#[async_trait]
pub trait SlideSource: Send + Sync {
    async fn read(&self, deck: &Path) -> sc_core::Result<Vec<Slide>>;
}

/// Slide rasterization.
#[async_trait]
pub trait SlideRenderer: Send + Sync {
    /// Render `slide` of `deck` into the store's slide-image directory.
    async fn render(
        &self,
        deck: &Path,
        slide: &Slide,
        store: &ArtifactStore,
    ) -> sc_core::Result<Artifact>;
}

/// An engine held for the duration of one batch.
///
/// Every reset is followed by the cooldown so the engine is never used
/// straight after reinitialization.
pub struct EngineLease<E: ?Sized + Engine> {
    engine: Arc<E>,
    cooldown: Duration,
}

impl<E: ?Sized + Engine> EngineLease<E> {
    pub async fn acquire(engine: Arc<E>, cooldown: Duration) -> sc_core::Result<Self> {
        engine.acquire().await?;
        tracing::debug!("Acquired {}", engine.name());
        Ok(Self { engine, cooldown })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Reset the engine, then wait out the cooldown. A failed reset is
    /// logged; the next attempt will surface any lasting problem.
    pub async fn reset(&self) {
        if let Err(e) = self.engine.reset().await {
            tracing::warn!("Resetting {} failed: {e}", self.engine.name());
        }
        if !self.cooldown.is_zero() {
            tokio::time::sleep(self.cooldown).await;
        }
    }

    pub async fn release(self) {
        self.engine.release().await;
        tracing::debug!("Released {}", self.engine.name());
    }
}
