use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use sc_av::actions::{run_wav2lip, still_face_video, StillParams, Wav2LipParams};
use sc_av::ToolRegistry;
use sc_core::config::AnimationConfig;

use crate::engine::{Animator, Engine};

/// Lip-sync with Wav2Lip, or a still-face clip when the model is not
/// installed.
pub struct Wav2LipAnimator {
    tools: Arc<ToolRegistry>,
    config: AnimationConfig,
}

impl Wav2LipAnimator {
    pub fn new(tools: Arc<ToolRegistry>, config: AnimationConfig) -> Self {
        Self { tools, config }
    }

    /// Whether the Wav2Lip script and checkpoint are installed.
    pub fn model_available(&self) -> bool {
        self.model().assets_available()
    }

    fn model(&self) -> Wav2LipParams {
        Wav2LipParams {
            repo_dir: self.config.wav2lip_dir.clone(),
            checkpoint: self.config.checkpoint.clone(),
            fps: self.config.fps,
            pads: self.config.pads,
            resize_factor: self.config.resize_factor,
            batch_size: self.config.batch_size,
            timeout: self.config.timeout(),
        }
    }

    fn still(&self) -> StillParams {
        StillParams {
            width: self.config.fallback_width,
            height: self.config.fallback_height,
            default_duration: self.config.fallback_duration_secs,
            timeout: self.config.fallback_timeout(),
        }
    }
}

#[async_trait]
impl Engine for Wav2LipAnimator {
    fn name(&self) -> &str {
        "wav2lip"
    }

    async fn acquire(&self) -> sc_core::Result<()> {
        if !self.model_available() {
            tracing::warn!(
                "Wav2Lip not found at {} (checkpoint {}); using still-face videos",
                self.config.wav2lip_dir.display(),
                self.config.checkpoint.display()
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Animator for Wav2LipAnimator {
    async fn animate(&self, audio: &Path, face: &Path, output: &Path) -> sc_core::Result<()> {
        let model = self.model();
        if model.assets_available() {
            run_wav2lip(&self.tools, &model, face, audio, output).await
        } else {
            still_face_video(&self.tools, &self.still(), face, audio, output).await
        }
    }
}
