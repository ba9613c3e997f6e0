//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML by the binary
//! and carries all sub-configs for the server, artifact storage, tools and
//! each pipeline stage. Every section defaults sensibly so an empty file is
//! valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::slide::ArtifactKind;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub tools: ToolsConfig,
    pub processing: ProcessingConfig,
    pub synthesis: SynthesisConfig,
    pub animation: AnimationConfig,
    pub composition: CompositionConfig,
    pub render: RenderConfig,
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.synthesis.max_attempts == 0 {
            warnings.push("synthesis.max_attempts is 0; no slide will be narrated".into());
        }
        if self.animation.max_attempts == 0 {
            warnings.push("animation.max_attempts is 0; no slide will be animated".into());
        }

        let c = &self.composition;
        if c.avatar_x + c.avatar_width > c.canvas_width
            || c.avatar_y + c.avatar_height > c.canvas_height
        {
            warnings.push(format!(
                "composition avatar {}x{} at ({}, {}) extends past the {}x{} canvas",
                c.avatar_width, c.avatar_height, c.avatar_x, c.avatar_y, c.canvas_width, c.canvas_height
            ));
        }

        if self.animation.fallback_width % 2 != 0 || self.animation.fallback_height % 2 != 0 {
            warnings.push(
                "animation fallback size should be even for H.264 output".into(),
            );
        }

        if let Some(ref font) = self.render.font_file {
            if !font.exists() {
                warnings.push(format!("render.font_file {} does not exist", font.display()));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    /// Largest accepted upload body, in megabytes.
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            static_dir: None,
            max_upload_mb: 200,
        }
    }
}

/// Where uploads and generated artifacts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory; the sub-directories below are relative to it.
    pub root: PathBuf,
    pub uploads: String,
    pub audio: String,
    pub video: String,
    pub output: String,
    pub slide_images: String,
    pub temp: String,
    /// Voice preview clips.
    pub previews: String,
    pub final_video: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            uploads: "uploads".into(),
            audio: "audio".into(),
            video: "video".into(),
            output: "output".into(),
            slide_images: "slide_images".into(),
            temp: "temp".into(),
            previews: "previews".into(),
            final_video: "final_presentation_with_slides.mp4".into(),
        }
    }
}

impl StorageConfig {
    /// Directory name holding artifacts of `kind`.
    pub fn dir_name(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::SlideImage => &self.slide_images,
            ArtifactKind::NarrationAudio => &self.audio,
            ArtifactKind::AnimatedVideo => &self.video,
            ArtifactKind::CompositeSegment => &self.temp,
        }
    }
}

/// Paths to external CLI tools. Unset entries are looked up in `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub pdftoppm_path: Option<PathBuf>,
    pub pdftotext_path: Option<PathBuf>,
    pub espeak_path: Option<PathBuf>,
    pub python_path: Option<PathBuf>,
}

/// How composite segments are matched with slide images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    /// Pair an animated video with the slide image carrying the same number.
    #[default]
    SlideNumber,
    /// Sort both lists, truncate to the shorter one and zip by index.
    Position,
}

/// Cross-stage processing switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Reuse present, non-empty artifacts instead of regenerating them.
    pub skip_existing: bool,
    pub extract_slide_content: bool,
    pub extract_speaker_notes: bool,
    pub pairing: PairingPolicy,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            skip_existing: true,
            extract_slide_content: true,
            extract_speaker_notes: true,
            pairing: PairingPolicy::SlideNumber,
        }
    }
}

/// Narration synthesis (espeak-ng) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Default voice; a job may override it.
    pub voice: Option<String>,
    /// Speaking rate in words per minute.
    pub rate: u32,
    /// Amplitude, 0 to 200.
    pub amplitude: u32,
    pub max_attempts: u32,
    pub timeout_secs: u64,
    pub retry_backoff_ms: u64,
    /// Pause after every engine reset before the engine is used again.
    pub reset_cooldown_ms: u64,
    /// Pause after each successful slide.
    pub settle_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            voice: None,
            rate: 150,
            amplitude: 180,
            max_attempts: 3,
            timeout_secs: 30,
            retry_backoff_ms: 2000,
            reset_cooldown_ms: 1000,
            settle_ms: 500,
        }
    }
}

impl SynthesisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn reset_cooldown(&self) -> Duration {
        Duration::from_millis(self.reset_cooldown_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Face animation (Wav2Lip) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub wav2lip_dir: PathBuf,
    pub checkpoint: PathBuf,
    pub fps: u32,
    /// Face box padding: top, bottom, left, right.
    pub pads: [u32; 4],
    pub resize_factor: u32,
    pub batch_size: u32,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub settle_ms: u64,
    /// Static fallback frame size.
    pub fallback_width: u32,
    pub fallback_height: u32,
    pub fallback_timeout_secs: u64,
    /// Used when the audio duration cannot be probed.
    pub fallback_duration_secs: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            wav2lip_dir: PathBuf::from("Wav2Lip"),
            checkpoint: PathBuf::from("checkpoints/wav2lip_gan.pth"),
            fps: 25,
            pads: [0, 20, 0, 0],
            resize_factor: 1,
            batch_size: 2,
            timeout_secs: 300,
            max_attempts: 2,
            retry_backoff_ms: 5000,
            settle_ms: 500,
            fallback_width: 426,
            fallback_height: 640,
            fallback_timeout_secs: 60,
            fallback_duration_secs: 5.0,
        }
    }
}

impl AnimationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_secs(self.fallback_timeout_secs)
    }
}

/// Canvas and overlay geometry for composite segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub avatar_width: u32,
    pub avatar_height: u32,
    pub avatar_x: u32,
    pub avatar_y: u32,
    /// Longest allowed segment.
    pub max_segment_secs: u64,
    pub segment_timeout_secs: u64,
    pub concat_timeout_secs: u64,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1920,
            canvas_height: 1080,
            avatar_width: 320,
            avatar_height: 320,
            avatar_x: 1600,
            avatar_y: 760,
            max_segment_secs: 30,
            segment_timeout_secs: 60,
            concat_timeout_secs: 300,
        }
    }
}

impl CompositionConfig {
    pub fn geometry(&self) -> OverlayGeometry {
        OverlayGeometry {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            avatar_width: self.avatar_width,
            avatar_height: self.avatar_height,
            avatar_x: self.avatar_x,
            avatar_y: self.avatar_y,
        }
    }

    pub fn max_segment(&self) -> Duration {
        Duration::from_secs(self.max_segment_secs)
    }
}

/// Where the animated face sits on the slide canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayGeometry {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub avatar_width: u32,
    pub avatar_height: u32,
    pub avatar_x: u32,
    pub avatar_y: u32,
}

impl Default for OverlayGeometry {
    fn default() -> Self {
        CompositionConfig::default().geometry()
    }
}

/// Slide rasterization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// TrueType font for text cards; ffmpeg's fontconfig default when unset.
    pub font_file: Option<PathBuf>,
    pub title_font_size: u32,
    pub body_font_size: u32,
    pub notes_font_size: u32,
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            font_file: None,
            title_font_size: 48,
            body_font_size: 32,
            notes_font_size: 24,
            timeout_secs: 60,
        }
    }
}

impl RenderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
