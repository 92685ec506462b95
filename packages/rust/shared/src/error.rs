//! Error types for Chunkweave.
//!
//! Library crates use [`ChunkweaveError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Chunkweave operations.
#[derive(Debug, thiserror::Error)]
pub enum ChunkweaveError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Boundary-tag transcoding error (bad group table or payload).
    #[error("boundary tag decode error: {message}")]
    TagDecode { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// External summarization call error (degrades a single block).
    #[error("summarization error: {0}")]
    Summarize(String),

    /// Batch worker failure (task panicked or was cancelled).
    #[error("batch worker error: {0}")]
    Worker(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ChunkweaveError>;

impl ChunkweaveError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a tag-decode error from any displayable message.
    pub fn tag_decode(msg: impl Into<String>) -> Self {
        Self::TagDecode {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a summarization error from any displayable message.
    pub fn summarize(msg: impl Into<String>) -> Self {
        Self::Summarize(msg.into())
    }
}
