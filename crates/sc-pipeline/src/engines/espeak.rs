use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use sc_av::actions::{list_voices, synthesize_speech, SpeechParams, Voice};
use sc_av::ToolRegistry;
use sc_core::config::SynthesisConfig;

use crate::engine::{Engine, Synthesizer};

/// Narration through the espeak-ng CLI.
///
/// Every call is a fresh process, so there is no engine state to reset.
pub struct EspeakSynthesizer {
    tools: Arc<ToolRegistry>,
    config: SynthesisConfig,
}

impl EspeakSynthesizer {
    pub fn new(tools: Arc<ToolRegistry>, config: SynthesisConfig) -> Self {
        Self { tools, config }
    }

    fn params(&self, voice: Option<&str>) -> SpeechParams {
        SpeechParams {
            voice: voice.map(str::to_string).or_else(|| self.config.voice.clone()),
            rate: self.config.rate,
            amplitude: self.config.amplitude,
            timeout: self.config.timeout(),
        }
    }
}

#[async_trait]
impl Engine for EspeakSynthesizer {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    async fn acquire(&self) -> sc_core::Result<()> {
        self.tools.require("espeak-ng").map(|_| ())
    }
}

#[async_trait]
impl Synthesizer for EspeakSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
        output: &Path,
    ) -> sc_core::Result<()> {
        synthesize_speech(&self.tools, text, &self.params(voice), output).await
    }

    async fn voices(&self) -> sc_core::Result<Vec<Voice>> {
        list_voices(&self.tools).await
    }
}
