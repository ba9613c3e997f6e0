//! # sc-pipeline
//!
//! Orchestration of the slide-to-video pipeline.
//!
//! This crate provides:
//!
//! - **[`CacheGate`]** -- decides whether an expected artifact must be
//!   regenerated.
//! - **[`StatusTracker`]** and **[`JobManager`]** -- the shared progress
//!   record for the active job, admission control and reset.
//! - **Engine traits** ([`engine`]) -- the seams to the synthesis,
//!   animation, compositing, extraction and rendering collaborators, plus
//!   the [`EngineLease`] lifecycle wrapper.
//! - **[`BatchRunner`]** -- bounded per-slide retries with engine resets,
//!   backoff and progress mapping.
//! - **[`CompositorDriver`]** -- pairs slide images with animated videos and
//!   concatenates the composite segments.
//! - **[`Pipeline`]** -- the stage sequencer tying it all together.
//! - **Engine adapters** ([`engines`]) -- espeak-ng, Wav2Lip, ffmpeg and the
//!   deck reader/renderer behind the traits.

pub mod batch;
pub mod cache;
pub mod compositor;
pub mod engine;
pub mod engines;
pub mod job;
pub mod sequencer;
pub mod stages;
pub mod status;

pub use batch::{BatchItem, BatchOutcome, BatchRunner, ProgressWindow, Producer, RetryPolicy};
pub use cache::CacheGate;
pub use compositor::CompositorDriver;
pub use engines::default_engines;
pub use engine::{Animator, Compositor, Engine, EngineLease, SlideRenderer, SlideSource, Synthesizer};
pub use job::{JobHandle, JobManager};
pub use sequencer::{Engines, JobRequest, Pipeline};
pub use status::{JobState, JobStatus, StatusTracker};
