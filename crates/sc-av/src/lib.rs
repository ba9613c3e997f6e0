//! # sc-av
//!
//! External tool management and media actions for the slidecast pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg,
//!   ffprobe, pdftoppm, pdftotext, espeak-ng and python3.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Artifact storage** ([`ArtifactStore`]) -- the per-kind directory
//!   layout and deterministic artifact paths.
//! - **Action functions** ([`actions`]) -- speech synthesis, lip-sync
//!   inference, still-face video, segment overlay and concatenation, PDF
//!   text and page rasterization, and text-card rendering.

pub mod actions;
pub mod command;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use workspace::ArtifactStore;
