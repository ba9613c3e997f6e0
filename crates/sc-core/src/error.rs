//! Unified error type for slidecast.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`] and
//! for the batch runner to decide whether another attempt can help via
//! [`Error::is_retryable`].

use std::fmt;
use std::path::{Path, PathBuf};

/// Unified error type covering all failure modes in slidecast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "voice").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The uploaded presentation or face image cannot be used.
    #[error("Input error: {0}")]
    Input(String),

    /// The request conflicts with the current job state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (ffmpeg, espeak-ng, etc.) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// A file an engine needs does not exist.
    #[error("Missing input: {}", path.display())]
    MissingInput {
        /// The path that was expected to exist.
        path: PathBuf,
    },

    /// A pipeline stage failed.
    #[error("Pipeline error [{step}]: {message}")]
    Pipeline {
        /// The stage that failed.
        step: String,
        /// Human-readable error description.
        message: String,
    },

    /// The job was cancelled by a reset or cleanup request.
    #[error("Cancelled")]
    Cancelled,

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Input(_) => 422,
            Error::Conflict(_) => 409,
            Error::Io { .. } => 500,
            Error::Tool { .. } => 502,
            Error::MissingInput { .. } => 422,
            Error::Pipeline { .. } => 500,
            Error::Cancelled => 409,
            Error::Internal(_) => 500,
        }
    }

    /// Whether another attempt at the same operation could succeed.
    ///
    /// Engine failures (non-zero exit, timeout, I/O) are retryable. Missing
    /// preconditions, invalid input and cancellation are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Io { .. } | Error::Tool { .. } | Error::Pipeline { .. } | Error::Internal(_)
        )
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Pipeline`].
    pub fn pipeline(step: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Pipeline {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::MissingInput`].
    pub fn missing_input(path: &Path) -> Self {
        Error::MissingInput {
            path: path.to_path_buf(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
