//! Producers for the two batch stages.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::batch::{BatchItem, Producer};
use crate::engine::{Animator, EngineLease, Synthesizer};

fn ensure_parent(path: &Path) -> sc_core::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Narration text in, audio file out.
pub struct SynthesisProducer {
    pub lease: EngineLease<dyn Synthesizer>,
    pub voice: Option<String>,
}

#[async_trait]
impl Producer for SynthesisProducer {
    type Payload = String;

    fn stage(&self) -> &str {
        "synthesis"
    }

    fn action(&self) -> &str {
        "Generating audio"
    }

    async fn produce(&self, item: &BatchItem<String>) -> sc_core::Result<()> {
        let text = item.payload.trim();
        if text.is_empty() {
            return Err(sc_core::Error::Input(format!(
                "slide {} has no narration text",
                item.slide_number
            )));
        }
        ensure_parent(&item.output)?;
        self.lease
            .engine()
            .synthesize(text, self.voice.as_deref(), &item.output)
            .await?;
        if !sc_core::is_present(&item.output) {
            return Err(sc_core::Error::pipeline(
                "synthesis",
                format!("{} produced no audio", self.lease.engine().name()),
            ));
        }
        Ok(())
    }

    async fn reset(&self) {
        self.lease.reset().await;
    }
}

/// Audio file in, animated face video out.
pub struct AnimationProducer {
    pub lease: EngineLease<dyn Animator>,
    pub face: PathBuf,
}

#[async_trait]
impl Producer for AnimationProducer {
    type Payload = PathBuf;

    fn stage(&self) -> &str {
        "animation"
    }

    fn action(&self) -> &str {
        "Animating face"
    }

    async fn produce(&self, item: &BatchItem<PathBuf>) -> sc_core::Result<()> {
        if !sc_core::is_present(&item.payload) {
            return Err(sc_core::Error::missing_input(&item.payload));
        }
        if !self.face.is_file() {
            return Err(sc_core::Error::missing_input(&self.face));
        }
        ensure_parent(&item.output)?;
        self.lease
            .engine()
            .animate(&item.payload, &self.face, &item.output)
            .await?;
        if !sc_core::is_present(&item.output) {
            return Err(sc_core::Error::pipeline(
                "animation",
                format!("{} produced no video", self.lease.engine().name()),
            ));
        }
        Ok(())
    }

    async fn reset(&self) {
        self.lease.reset().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use std::sync::Arc;
    use std::time::Duration;

    struct Silent;

    #[async_trait]
    impl Engine for Silent {
        fn name(&self) -> &str {
            "silent"
        }
    }

    #[async_trait]
    impl Synthesizer for Silent {
        async fn synthesize(&self, _: &str, _: Option<&str>, _: &Path) -> sc_core::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Animator for Silent {
        async fn animate(&self, _: &Path, _: &Path, _: &Path) -> sc_core::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_output_is_a_retryable_failure() {
        let dir = tempfile::tempdir().unwrap();
        let engine: Arc<dyn Synthesizer> = Arc::new(Silent);
        let producer = SynthesisProducer {
            lease: EngineLease::acquire(engine, Duration::ZERO).await.unwrap(),
            voice: None,
        };
        let err = producer
            .produce(&BatchItem {
                slide_number: 1,
                output: dir.path().join("audio/slide_001.wav"),
                payload: "Hello there".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(dir.path().join("audio").is_dir());
    }

    #[tokio::test]
    async fn blank_narration_is_rejected() {
        let engine: Arc<dyn Synthesizer> = Arc::new(Silent);
        let producer = SynthesisProducer {
            lease: EngineLease::acquire(engine, Duration::ZERO).await.unwrap(),
            voice: None,
        };
        let err = producer
            .produce(&BatchItem {
                slide_number: 4,
                output: PathBuf::from("slide_004.wav"),
                payload: "   ".into(),
            })
            .await
            .unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn missing_audio_or_face_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let engine: Arc<dyn Animator> = Arc::new(Silent);
        let producer = AnimationProducer {
            lease: EngineLease::acquire(engine, Duration::ZERO).await.unwrap(),
            face: dir.path().join("face.png"),
        };
        let item = BatchItem {
            slide_number: 1,
            output: dir.path().join("slide_001_animated.mp4"),
            payload: dir.path().join("slide_001.wav"),
        };

        let err = producer.produce(&item).await.unwrap_err();
        assert!(matches!(err, sc_core::Error::MissingInput { .. }));

        std::fs::write(&item.payload, b"RIFF").unwrap();
        let err = producer.produce(&item).await.unwrap_err();
        match err {
            sc_core::Error::MissingInput { path } => assert!(path.ends_with("face.png")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
