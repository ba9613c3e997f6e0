//! # sc-deck
//!
//! Presentation input for the slidecast pipeline: reading slides out of PPTX
//! and PDF decks, turning slide text into spoken narration, and rendering
//! one background image per slide.

pub mod narration;
pub mod pdf;
pub mod pptx;
pub mod reader;
pub mod render;

pub use narration::narrate;
pub use reader::{DeckReader, ExtractOptions};
pub use render::DeckRenderer;

use std::path::Path;

/// Presentation formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckFormat {
    Pptx,
    Pdf,
}

impl DeckFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pptx" => Some(Self::Pptx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Like [`from_path`](Self::from_path), but an unsupported extension is
    /// an input error.
    pub fn detect(path: &Path) -> sc_core::Result<Self> {
        Self::from_path(path).ok_or_else(|| {
            sc_core::Error::Input(format!(
                "unsupported presentation format: {} (expected .pptx or .pdf)",
                path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_by_extension() {
        assert_eq!(DeckFormat::from_path(Path::new("a.PPTX")), Some(DeckFormat::Pptx));
        assert_eq!(DeckFormat::from_path(Path::new("dir/b.pdf")), Some(DeckFormat::Pdf));
        assert_eq!(DeckFormat::from_path(Path::new("c.ppt")), None);
        assert_eq!(DeckFormat::from_path(Path::new("noext")), None);
        assert!(matches!(
            DeckFormat::detect(Path::new("deck.key")),
            Err(sc_core::Error::Input(_))
        ));
    }
}
