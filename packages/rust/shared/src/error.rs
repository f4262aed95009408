//! Error types for bootcfg.
//!
//! Every crate in the workspace returns [`BootcfgError`] via `thiserror`.
//! Appender errors travel through the pipeline untouched, so the variant a
//! caller sees is the one the failing step produced.

use std::path::PathBuf;

/// Top-level error type for all bootcfg operations.
#[derive(Debug, thiserror::Error)]
pub enum BootcfgError {
    /// The credential source failed to produce a payload.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// A payload could not be marshaled before embedding.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// An inline `data:` URL could not be decoded.
    #[error("malformed encoding: {message}")]
    MalformedEncoding { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid request or parameters.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BootcfgError>;

impl BootcfgError {
    /// Create a retrieval error from any displayable message.
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval(msg.into())
    }

    /// Create a serialization error from any displayable message.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
        }
    }

    /// Create a malformed-encoding error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedEncoding {
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
}
