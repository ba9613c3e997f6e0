//! One background image per slide.
//!
//! PDF pages are rasterized with pdftoppm. PPTX slides have no native
//! rasterizer here, so they are drawn as text cards.

use std::path::Path;
use std::sync::Arc;

use sc_av::actions::{rasterize_pdf_page, render_text_card, TextCard};
use sc_av::{ArtifactStore, ToolRegistry};
use sc_core::config::RenderConfig;
use sc_core::{Artifact, ArtifactKind, Slide};

use crate::DeckFormat;

#[derive(Debug, Clone)]
pub struct DeckRenderer {
    tools: Arc<ToolRegistry>,
    config: RenderConfig,
}

impl DeckRenderer {
    pub fn new(tools: Arc<ToolRegistry>, config: RenderConfig) -> Self {
        Self { tools, config }
    }

    /// Render the image for one slide into the store's slide-image
    /// directory. Existing images are overwritten.
    pub async fn render_slide(
        &self,
        deck: &Path,
        slide: &Slide,
        store: &ArtifactStore,
    ) -> sc_core::Result<Artifact> {
        let output = store.path_for(ArtifactKind::SlideImage, slide.slide_number);
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match DeckFormat::detect(deck)? {
            DeckFormat::Pdf => {
                rasterize_pdf_page(
                    &self.tools,
                    deck,
                    slide.slide_number,
                    (self.config.width, self.config.height),
                    self.config.timeout(),
                    &output,
                )
                .await?
            }
            DeckFormat::Pptx => {
                let card = self.card_for(slide);
                render_text_card(
                    &self.tools,
                    &card,
                    &store.temp_dir(),
                    self.config.timeout(),
                    &output,
                )
                .await?
            }
        }

        Ok(store.artifact(ArtifactKind::SlideImage, slide.slide_number))
    }

    fn card_for(&self, slide: &Slide) -> TextCard {
        TextCard {
            slide_number: slide.slide_number,
            title: slide.title.clone(),
            body: slide.content.clone(),
            notes: slide.speaker_notes.clone(),
            width: self.config.width,
            height: self.config.height,
            font_file: self.config.font_file.clone(),
            title_size: self.config.title_font_size,
            body_size: self.config.body_font_size,
            notes_size: self.config.notes_font_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::config::StorageConfig;

    #[test]
    fn card_uses_configured_sizes() {
        let renderer = DeckRenderer::new(Arc::new(ToolRegistry::default()), RenderConfig::default());
        let card = renderer.card_for(&Slide::new(2, "Plan", "Ship it", "Say thanks"));
        assert_eq!(card.slide_number, 2);
        assert_eq!((card.width, card.height), (1920, 1080));
        assert_eq!((card.title_size, card.body_size, card.notes_size), (48, 32, 24));
    }

    #[tokio::test]
    async fn missing_tool_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::with_root(dir.path(), &StorageConfig::default());
        store.ensure().unwrap();
        let renderer = DeckRenderer::new(Arc::new(ToolRegistry::default()), RenderConfig::default());

        let err = renderer
            .render_slide(&dir.path().join("deck.pptx"), &Slide::new(1, "A", "", ""), &store)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ffmpeg"), "{err}");
        assert!(!store.artifact(ArtifactKind::SlideImage, 1).present);
    }
}
