//! Production engines: espeak-ng, Wav2Lip, ffmpeg and the deck
//! reader/renderer.

mod deck;
mod espeak;
mod ffmpeg;
mod wav2lip;

pub use espeak::EspeakSynthesizer;
pub use ffmpeg::FfmpegCompositor;
pub use wav2lip::Wav2LipAnimator;

use std::sync::Arc;

use sc_av::{ArtifactStore, ToolRegistry};
use sc_core::config::Config;
use sc_deck::{DeckReader, DeckRenderer, ExtractOptions};

use crate::sequencer::Engines;

/// Wire up the production engines for `config`.
pub fn default_engines(tools: Arc<ToolRegistry>, config: &Config, store: &ArtifactStore) -> Engines {
    Engines {
        source: Arc::new(DeckReader::new(
            tools.clone(),
            ExtractOptions::from(&config.processing),
        )),
        renderer: Arc::new(DeckRenderer::new(tools.clone(), config.render.clone())),
        synthesizer: Arc::new(EspeakSynthesizer::new(tools.clone(), config.synthesis.clone())),
        animator: Arc::new(Wav2LipAnimator::new(tools.clone(), config.animation.clone())),
        compositor: Arc::new(FfmpegCompositor::new(
            tools,
            config.composition.clone(),
            store.temp_dir(),
        )),
    }
}
