//! Shared test harness for integration tests.
//!
//! Provides scripted fake engines with call counters and a [`TestHarness`]
//! that builds a full [`AppContext`] around them on a scratch directory. The
//! [`TestHarness::with_server`] constructor starts Axum on a random port for
//! HTTP-level testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use sc_av::actions::Voice;
use sc_av::{ArtifactStore, ToolRegistry};
use sc_core::config::{Config, OverlayGeometry};
use sc_core::{Artifact, ArtifactKind, Slide};
use sc_pipeline::{
    Animator, Compositor, Engine, Engines, JobHandle, JobRequest, Pipeline, SlideRenderer,
    SlideSource, Synthesizer,
};
use sc_server::context::AppContext;
use sc_server::router::build_router;

/// Attempts to fail for ever.
pub const ALWAYS: u32 = u32::MAX;

// ---------------------------------------------------------------------------
// Fake engines
// ---------------------------------------------------------------------------

/// Returns a fixed list of slides for any deck.
pub struct FakeSource {
    pub slides: Vec<Slide>,
}

#[async_trait]
impl SlideSource for FakeSource {
    async fn read(&self, _deck: &Path) -> sc_core::Result<Vec<Slide>> {
        Ok(self.slides.clone())
    }
}

/// Writes a placeholder image per slide, or fails every slide when `fail`
/// is set.
#[derive(Default)]
pub struct FakeRenderer {
    pub calls: AtomicU32,
    pub fail: AtomicBool,
}

#[async_trait]
impl SlideRenderer for FakeRenderer {
    async fn render(
        &self,
        _deck: &Path,
        slide: &Slide,
        store: &ArtifactStore,
    ) -> sc_core::Result<Artifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(sc_core::Error::tool("pdftoppm", "scripted render failure"));
        }
        let path = store.path_for(ArtifactKind::SlideImage, slide.slide_number);
        std::fs::write(&path, format!("image {}", slide.slide_number))?;
        Ok(store.artifact(ArtifactKind::SlideImage, slide.slide_number))
    }
}

/// Per-slide call bookkeeping shared by the scripted engines.
#[derive(Default)]
pub struct Script {
    /// Slide number -> number of leading attempts that fail.
    failures: Mutex<HashMap<u32, u32>>,
    attempts: Mutex<HashMap<u32, u32>>,
    resets: Mutex<HashMap<u32, u32>>,
    current: Mutex<Option<u32>>,
    pub calls: AtomicU32,
    pub total_resets: AtomicU32,
    pub delay: Mutex<Duration>,
}

impl Script {
    pub fn fail(&self, slide_number: u32, attempts: u32) {
        self.failures.lock().insert(slide_number, attempts);
    }

    pub fn attempts(&self, slide_number: u32) -> u32 {
        self.attempts.lock().get(&slide_number).copied().unwrap_or(0)
    }

    pub fn resets(&self, slide_number: u32) -> u32 {
        self.resets.lock().get(&slide_number).copied().unwrap_or(0)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Record an attempt for `slide_number` and decide whether it fails.
    async fn attempt(&self, slide_number: u32, output: &Path, stage: &str) -> sc_core::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.current.lock() = Some(slide_number);
        let attempt = {
            let mut attempts = self.attempts.lock();
            let n = attempts.entry(slide_number).or_insert(0);
            *n += 1;
            *n
        };

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failing = self.failures.lock().get(&slide_number).copied().unwrap_or(0);
        if attempt <= failing {
            return Err(sc_core::Error::tool(
                stage,
                format!("scripted failure for slide {slide_number} (attempt {attempt})"),
            ));
        }
        std::fs::write(output, format!("{stage} {slide_number}"))?;
        Ok(())
    }

    fn reset(&self) {
        self.total_resets.fetch_add(1, Ordering::SeqCst);
        if let Some(n) = *self.current.lock() {
            *self.resets.lock().entry(n).or_insert(0) += 1;
        }
    }
}

fn slide_of(kind: ArtifactKind, path: &Path) -> u32 {
    path.file_name()
        .and_then(|n| kind.parse_slide_number(&n.to_string_lossy()))
        .unwrap_or(0)
}

#[derive(Default)]
pub struct FakeSynthesizer {
    pub script: Script,
}

#[async_trait]
impl Engine for FakeSynthesizer {
    fn name(&self) -> &str {
        "fake-synthesizer"
    }

    async fn reset(&self) -> sc_core::Result<()> {
        self.script.reset();
        Ok(())
    }
}

#[async_trait]
impl Synthesizer for FakeSynthesizer {
    async fn synthesize(
        &self,
        _text: &str,
        _voice: Option<&str>,
        output: &Path,
    ) -> sc_core::Result<()> {
        let n = slide_of(ArtifactKind::NarrationAudio, output);
        self.script.attempt(n, output, "synthesis").await
    }

    async fn voices(&self) -> sc_core::Result<Vec<Voice>> {
        Ok(vec![Voice {
            id: "en-us".into(),
            name: "English (America)".into(),
            gender: Some("M".into()),
        }])
    }
}

#[derive(Default)]
pub struct FakeAnimator {
    pub script: Script,
}

#[async_trait]
impl Engine for FakeAnimator {
    fn name(&self) -> &str {
        "fake-animator"
    }

    async fn reset(&self) -> sc_core::Result<()> {
        self.script.reset();
        Ok(())
    }
}

#[async_trait]
impl Animator for FakeAnimator {
    async fn animate(&self, audio: &Path, _face: &Path, output: &Path) -> sc_core::Result<()> {
        if !sc_core::is_present(audio) {
            return Err(sc_core::Error::missing_input(audio));
        }
        let n = slide_of(ArtifactKind::AnimatedVideo, output);
        self.script.attempt(n, output, "animation").await
    }
}

/// Records overlays and the segment list of every concatenation.
#[derive(Default)]
pub struct FakeCompositor {
    pub overlays: AtomicU32,
    pub concats: Mutex<Vec<Vec<PathBuf>>>,
    pub fail_overlay: AtomicBool,
    pub fail_concat: AtomicBool,
}

impl FakeCompositor {
    /// Segments of the most recent concatenation.
    pub fn last_concat(&self) -> Vec<PathBuf> {
        self.concats.lock().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Compositor for FakeCompositor {
    async fn overlay(
        &self,
        background: &Path,
        foreground: &Path,
        _geometry: &OverlayGeometry,
        _max_length: Duration,
        output: &Path,
    ) -> sc_core::Result<()> {
        self.overlays.fetch_add(1, Ordering::SeqCst);
        if self.fail_overlay.load(Ordering::SeqCst) {
            return Err(sc_core::Error::tool("ffmpeg", "scripted overlay failure"));
        }
        std::fs::write(
            output,
            format!("{} + {}", background.display(), foreground.display()),
        )?;
        Ok(())
    }

    async fn concat(&self, segments: &[PathBuf], output: &Path) -> sc_core::Result<()> {
        self.concats.lock().push(segments.to_vec());
        if self.fail_concat.load(Ordering::SeqCst) {
            return Err(sc_core::Error::tool("ffmpeg", "scripted concat failure"));
        }
        std::fs::write(output, format!("{} segments", segments.len()))?;
        Ok(())
    }
}

/// The fakes behind one [`Engines`] set, kept for assertions.
#[derive(Clone)]
pub struct Fakes {
    pub renderer: Arc<FakeRenderer>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub animator: Arc<FakeAnimator>,
    pub compositor: Arc<FakeCompositor>,
    pub slides: Vec<Slide>,
}

impl Fakes {
    pub fn with_slides(count: u32) -> Self {
        let slides = (1..=count)
            .map(|n| {
                let mut slide = Slide::new(
                    n,
                    format!("Slide {n}"),
                    format!("Content of slide {n}"),
                    String::new(),
                );
                slide.narration_text = format!("Narration for slide {n}.");
                slide
            })
            .collect();
        Self {
            renderer: Arc::default(),
            synthesizer: Arc::default(),
            animator: Arc::default(),
            compositor: Arc::default(),
            slides,
        }
    }

    pub fn engines(&self) -> Engines {
        Engines {
            source: Arc::new(FakeSource {
                slides: self.slides.clone(),
            }),
            renderer: self.renderer.clone(),
            synthesizer: self.synthesizer.clone(),
            animator: self.animator.clone(),
            compositor: self.compositor.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A config with every pause and backoff set to zero.
pub fn fast_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.storage.root = root.to_path_buf();
    config.synthesis.retry_backoff_ms = 0;
    config.synthesis.reset_cooldown_ms = 0;
    config.synthesis.settle_ms = 0;
    config.animation.retry_backoff_ms = 0;
    config.animation.settle_ms = 0;
    config
}

/// PNG bytes of a small face image.
pub fn face_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([200, 160, 140]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}

/// Write a deck placeholder and a face image under `dir`.
pub fn write_inputs(dir: &Path) -> JobRequest {
    let deck = dir.join("deck.pptx");
    let face = dir.join("face.png");
    std::fs::write(&deck, b"not parsed by the fake source").unwrap();
    std::fs::write(&face, face_png()).unwrap();
    JobRequest {
        deck,
        face,
        voice: None,
    }
}

// ---------------------------------------------------------------------------
// Pipeline harness
// ---------------------------------------------------------------------------

/// A pipeline over fake engines in a scratch directory.
pub struct PipelineHarness {
    pub dir: tempfile::TempDir,
    pub fakes: Fakes,
    pub pipeline: Pipeline,
    pub request: JobRequest,
}

impl PipelineHarness {
    pub fn new(slides: u32) -> Self {
        Self::with_config(slides, |_| {})
    }

    pub fn with_config(slides: u32, tweak: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = fast_config(dir.path());
        tweak(&mut config);
        let fakes = Fakes::with_slides(slides);
        let store = ArtifactStore::new(&config.storage);
        store.ensure().expect("layout");
        let pipeline = Pipeline::new(fakes.engines(), store, Arc::new(config));
        let request = write_inputs(dir.path());
        Self {
            dir,
            fakes,
            pipeline,
            request,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        self.pipeline.store()
    }

    /// Run one job to the end.
    pub async fn run(&self) -> (JobHandle, sc_core::Result<PathBuf>) {
        let job = JobHandle::detached();
        let result = self.pipeline.run(&job, &self.request).await;
        (job, result)
    }

    /// File names present for `kind`.
    pub fn listed(&self, kind: ArtifactKind) -> Vec<String> {
        self.store()
            .list(kind)
            .expect("list")
            .iter()
            .map(|a| a.file_name())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Server harness
// ---------------------------------------------------------------------------

/// Test harness wrapping a fully-constructed [`AppContext`] backed by fake
/// engines and a scratch storage root.
pub struct TestHarness {
    pub ctx: AppContext,
    pub fakes: Fakes,
    pub dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_slides(3)
    }

    pub fn with_slides(slides: u32) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = fast_config(dir.path());
        let fakes = Fakes::with_slides(slides);
        let store = ArtifactStore::new(&config.storage);
        let ctx = AppContext::with_engines(
            config,
            Arc::new(ToolRegistry::default()),
            store,
            fakes.engines(),
        );
        Self { ctx, fakes, dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = build_router(self.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Poll `/api/status` until the job leaves `processing`.
    pub async fn wait_idle(addr: SocketAddr) -> serde_json::Value {
        for _ in 0..200 {
            let status: serde_json::Value = reqwest::get(format!("http://{addr}/api/status"))
                .await
                .expect("status request")
                .json()
                .await
                .expect("status json");
            if status["status"] != "processing" {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("job did not finish in time");
    }
}

/// Multipart form with a deck and a face image.
pub fn upload_form(deck_name: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .part(
            "pptx_file",
            reqwest::multipart::Part::bytes(b"deck bytes".to_vec()).file_name(deck_name.to_string()),
        )
        .part(
            "face_file",
            reqwest::multipart::Part::bytes(face_png()).file_name("face.png"),
        )
}
