use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sc_av::actions::{concat_segments, overlay_segment};
use sc_av::ToolRegistry;
use sc_core::config::{CompositionConfig, OverlayGeometry};

use crate::engine::Compositor;

/// Overlay and concat with ffmpeg.
pub struct FfmpegCompositor {
    tools: Arc<ToolRegistry>,
    config: CompositionConfig,
    /// Where concat list files are written.
    scratch: PathBuf,
}

impl FfmpegCompositor {
    pub fn new(tools: Arc<ToolRegistry>, config: CompositionConfig, scratch: PathBuf) -> Self {
        Self {
            tools,
            config,
            scratch,
        }
    }
}

#[async_trait]
impl Compositor for FfmpegCompositor {
    async fn overlay(
        &self,
        background: &Path,
        foreground: &Path,
        geometry: &OverlayGeometry,
        max_length: Duration,
        output: &Path,
    ) -> sc_core::Result<()> {
        overlay_segment(
            &self.tools,
            background,
            foreground,
            geometry,
            max_length,
            Duration::from_secs(self.config.segment_timeout_secs),
            output,
        )
        .await
    }

    async fn concat(&self, segments: &[PathBuf], output: &Path) -> sc_core::Result<()> {
        concat_segments(
            &self.tools,
            segments,
            &self.scratch,
            Duration::from_secs(self.config.concat_timeout_secs),
            output,
        )
        .await
    }
}
