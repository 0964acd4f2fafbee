//! Error types for DocQA.
//!
//! Library crates use [`DocQaError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Malformed generator output is deliberately absent from this taxonomy: the
//! response parsers degrade to default field values instead of failing.

use std::path::PathBuf;

/// Top-level error type for all DocQA operations.
#[derive(Debug, thiserror::Error)]
pub enum DocQaError {
    /// A required argument was missing, empty, or out of range.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A prompt template was rendered without one of its variables.
    #[error("missing template variable `{name}` in {template} template")]
    MissingVariable {
        template: &'static str,
        name: String,
    },

    /// The text generator failed or returned an unusable envelope.
    #[error("generator error: {0}")]
    Generator(String),

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Document content rejected during ingestion.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON encoding error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocQaError>;

impl DocQaError {
    /// Create an invalid-input error from any displayable message.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
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

    /// Whether this error was caused by bad caller input rather than a failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}
