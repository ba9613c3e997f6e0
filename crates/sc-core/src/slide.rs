//! Slide and artifact model.
//!
//! A [`Slide`] is extracted once from the presentation and never changes.
//! Every file generated for it afterwards is an [`Artifact`] keyed by the
//! same `slide_number`. File names are zero-padded so that sorting a
//! directory listing by name reproduces slide order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One slide (or PDF page) of the source presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Slide {
    /// 1-based position in the deck.
    pub slide_number: u32,
    pub title: String,
    /// Body text excluding the title.
    pub content: String,
    pub speaker_notes: String,
    /// Text that will be spoken for this slide. Empty until narration runs.
    #[serde(rename = "narration")]
    pub narration_text: String,
}

impl Slide {
    /// Create a slide without narration.
    pub fn new(
        slide_number: u32,
        title: impl Into<String>,
        content: impl Into<String>,
        speaker_notes: impl Into<String>,
    ) -> Self {
        Self {
            slide_number,
            title: title.into(),
            content: content.into(),
            speaker_notes: speaker_notes.into(),
            narration_text: String::new(),
        }
    }

    /// `Title: ..`, `Content: ..` and `Notes: ..` blocks separated by blank
    /// lines, skipping empty parts.
    pub fn combined_text(&self) -> String {
        let mut parts = Vec::new();
        if !self.title.is_empty() {
            parts.push(format!("Title: {}", self.title));
        }
        if !self.content.is_empty() {
            parts.push(format!("Content: {}", self.content));
        }
        if !self.speaker_notes.is_empty() {
            parts.push(format!("Notes: {}", self.speaker_notes));
        }
        parts.join("\n\n")
    }
}

/// The kind of file a stage produces for a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    SlideImage,
    NarrationAudio,
    AnimatedVideo,
    CompositeSegment,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::SlideImage,
        ArtifactKind::NarrationAudio,
        ArtifactKind::AnimatedVideo,
        ArtifactKind::CompositeSegment,
    ];

    fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::SlideImage => ".png",
            ArtifactKind::NarrationAudio => ".wav",
            ArtifactKind::AnimatedVideo => "_animated.mp4",
            ArtifactKind::CompositeSegment => "_composite.mp4",
        }
    }

    /// Deterministic file name for `slide_number`, e.g. `slide_007_animated.mp4`.
    pub fn file_name(self, slide_number: u32) -> String {
        format!("slide_{slide_number:03}{}", self.suffix())
    }

    /// Recover the slide number from a file name produced by [`file_name`](Self::file_name).
    ///
    /// Returns `None` for names that belong to another kind or do not follow
    /// the naming scheme.
    pub fn parse_slide_number(self, file_name: &str) -> Option<u32> {
        let digits = file_name
            .strip_prefix("slide_")?
            .strip_suffix(self.suffix())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().filter(|n| *n > 0)
    }
}

/// A generated file tied to one slide and one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub slide_number: u32,
    pub path: PathBuf,
    /// Whether the file existed and was non-empty when this value was built.
    pub present: bool,
}

impl Artifact {
    /// Build an artifact, checking presence on disk.
    pub fn at(kind: ArtifactKind, slide_number: u32, path: PathBuf) -> Self {
        let present = is_present(&path);
        Self {
            kind,
            slide_number,
            path,
            present,
        }
    }

    /// The artifact's file name, used as its sort key.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A file counts as produced only if it exists and is non-empty.
pub fn is_present(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
