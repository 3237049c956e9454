//! Types for the pipeline orchestrator.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::metadata::MetadataError;
use crate::muxer::MuxError;
use crate::selector::{MediaKind, MediaType, SelectionError};
use crate::source::SourceError;

/// Errors that can end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The identifier could not be normalized.
    #[error("Invalid source: {input:?}")]
    InvalidSource { input: String },

    /// The metadata provider failed.
    #[error("Metadata unavailable: {0}")]
    MetadataUnavailable(#[source] MetadataError),

    /// No format offers a required track.
    #[error("{0} is not found")]
    MediaNotFound(MediaKind),

    /// A media stream could not be opened or read.
    #[error("Stream unavailable: {0}")]
    StreamUnavailable(#[source] SourceError),

    /// The encoder could not be started.
    #[error("Failed to start encoder: {reason}")]
    SpawnFailed { reason: String },

    /// The encoder exited abnormally.
    #[error("{source}")]
    EncodingFailed {
        code: Option<i32>,
        signal: Option<i32>,
        stderr: Option<String>,
        #[source]
        source: MuxError,
    },

    /// Filesystem error.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Streams could not be transferred into the encoder.
    #[error("Failed to feed encoder: {reason}")]
    PipeFailed { reason: String },
}

impl PipelineError {
    /// Creates a new I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Converts a muxer error, attributing I/O failures to the output path.
    pub fn from_mux(error: MuxError, output_path: &Path) -> Self {
        match error {
            MuxError::SpawnFailed { .. } => Self::SpawnFailed {
                reason: error.to_string(),
            },
            MuxError::EncodingFailed { code, signal, .. } => Self::EncodingFailed {
                code,
                signal,
                stderr: error.stderr().map(str::to_string),
                source: error,
            },
            MuxError::PipeFailed { .. } => Self::PipeFailed {
                reason: error.to_string(),
            },
            MuxError::Source(source) => Self::StreamUnavailable(source),
            MuxError::Io(source) => Self::io(output_path, source),
        }
    }

    /// Whether the run failed before any stream was opened.
    pub fn is_before_download(&self) -> bool {
        matches!(
            self,
            Self::InvalidSource { .. } | Self::MetadataUnavailable(_) | Self::MediaNotFound(_)
        )
    }
}

impl From<MetadataError> for PipelineError {
    fn from(error: MetadataError) -> Self {
        match error {
            MetadataError::InvalidSource { input } => Self::InvalidSource { input },
            other => Self::MetadataUnavailable(other),
        }
    }
}

impl From<SelectionError> for PipelineError {
    fn from(error: SelectionError) -> Self {
        match error {
            SelectionError::MediaNotFound(kind) => Self::MediaNotFound(kind),
        }
    }
}

impl From<SourceError> for PipelineError {
    fn from(error: SourceError) -> Self {
        Self::StreamUnavailable(error)
    }
}

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    ResolvingMetadata,
    SelectingMedia,
    /// Streams are downloading and being muxed.
    Transferring,
    Finalizing,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ResolvingMetadata => "resolving_metadata",
            Self::SelectingMedia => "selecting_media",
            Self::Transferring => "transferring",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    /// Full path of the written file.
    pub output_path: PathBuf,
    /// File name of the written file.
    pub file_name: String,
    /// Shape of the media that was written.
    pub kind: MediaType,
}
