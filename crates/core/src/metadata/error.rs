//! Error types for the metadata module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving media metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The identifier is neither a video id nor a supported URL.
    #[error("Invalid source identifier: {input:?}")]
    InvalidSource { input: String },

    /// The metadata tool could not be found.
    #[error("yt-dlp not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The metadata tool ran but reported a failure.
    #[error("Metadata lookup failed for {id}: {reason}")]
    LookupFailed { id: String, reason: String },

    /// The metadata tool output could not be understood.
    #[error("Failed to parse metadata: {reason}")]
    ParseError { reason: String },

    /// I/O error while running the metadata tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetadataError {
    /// Creates a new invalid source error.
    pub fn invalid_source(input: impl Into<String>) -> Self {
        Self::InvalidSource {
            input: input.into(),
        }
    }

    /// Creates a new lookup failed error.
    pub fn lookup_failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LookupFailed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }

    /// Whether the identifier itself was rejected.
    pub fn is_invalid_source(&self) -> bool {
        matches!(self, Self::InvalidSource { .. })
    }
}
