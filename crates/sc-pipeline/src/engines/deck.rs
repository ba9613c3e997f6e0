use std::path::Path;

use async_trait::async_trait;
use sc_av::ArtifactStore;
use sc_core::{Artifact, Slide};
use sc_deck::{DeckReader, DeckRenderer};

use crate::engine::{SlideRenderer, SlideSource};

#[async_trait]
impl SlideSource for DeckReader {
    async fn read(&self, deck: &Path) -> sc_core::Result<Vec<Slide>> {
        DeckReader::read(self, deck).await
    }
}

#[async_trait]
impl SlideRenderer for DeckRenderer {
    async fn render(
        &self,
        deck: &Path,
        slide: &Slide,
        store: &ArtifactStore,
    ) -> sc_core::Result<Artifact> {
        self.render_slide(deck, slide, store).await
    }
}
