//! Format dispatch for slide extraction.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sc_av::ToolRegistry;
use sc_core::config::ProcessingConfig;
use sc_core::Slide;

use crate::{narration, pdf, pptx, DeckFormat};

/// Which parts of a slide to extract.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub content: bool,
    pub notes: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            content: true,
            notes: true,
        }
    }
}

impl From<&ProcessingConfig> for ExtractOptions {
    fn from(cfg: &ProcessingConfig) -> Self {
        Self {
            content: cfg.extract_slide_content,
            notes: cfg.extract_speaker_notes,
        }
    }
}

/// Reads slides from PPTX and PDF decks and fills in their narration.
#[derive(Debug, Clone)]
pub struct DeckReader {
    tools: Arc<ToolRegistry>,
    options: ExtractOptions,
    timeout: Duration,
}

impl DeckReader {
    pub fn new(tools: Arc<ToolRegistry>, options: ExtractOptions) -> Self {
        Self {
            tools,
            options,
            timeout: Duration::from_secs(60),
        }
    }

    /// Slides of `path` in deck order, narration filled in.
    pub async fn read(&self, path: &Path) -> sc_core::Result<Vec<Slide>> {
        let format = DeckFormat::detect(path)?;
        let mut slides = match format {
            DeckFormat::Pptx => {
                let path = path.to_path_buf();
                let ExtractOptions { content, notes } = self.options;
                tokio::task::spawn_blocking(move || pptx::read_pptx(&path, content, notes))
                    .await
                    .map_err(|e| sc_core::Error::Internal(format!("extraction task failed: {e}")))??
            }
            DeckFormat::Pdf => {
                pdf::read_pdf(&self.tools, path, self.options.content, self.timeout).await?
            }
        };

        for slide in &mut slides {
            narration::narrate(slide);
        }
        tracing::info!("Extracted {} slides from {}", slides.len(), path.display());
        Ok(slides)
    }
}
