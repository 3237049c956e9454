//! Error types for the muxer module.

use std::path::PathBuf;
use thiserror::Error;

use crate::source::SourceError;

/// Errors that can occur while muxing.
#[derive(Debug, Error)]
pub enum MuxError {
    /// The encoder process could not be started.
    #[error("Failed to start encoder {path}: {reason}")]
    SpawnFailed { path: PathBuf, reason: String },

    /// The encoder exited abnormally.
    #[error("Encoding failed: {}", exit_description(.code, .signal))]
    EncodingFailed {
        code: Option<i32>,
        signal: Option<i32>,
        stderr: Option<String>,
    },

    /// Writing a stream into the encoder failed.
    #[error("Failed to feed encoder input {input}: {reason}")]
    PipeFailed { input: usize, reason: String },

    /// Reading a stream failed.
    #[error("Stream error: {0}")]
    Source(#[from] SourceError),

    /// I/O error while supervising the encoder.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_description(code: &Option<i32>, signal: &Option<i32>) -> String {
    match (code, signal) {
        (Some(code), _) => format!("encoder exited with code {}", code),
        (None, Some(signal)) => format!("encoder killed by signal {}", signal),
        (None, None) => "encoder exited abnormally".to_string(),
    }
}

impl MuxError {
    /// Creates a new spawn failed error.
    pub fn spawn_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new pipe failed error.
    pub fn pipe_failed(input: usize, reason: impl Into<String>) -> Self {
        Self::PipeFailed {
            input,
            reason: reason.into(),
        }
    }

    /// Creates an encoding failed error from an exit status.
    pub fn from_exit_status(status: std::process::ExitStatus, stderr: Option<String>) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;

        Self::EncodingFailed {
            code: status.code(),
            signal,
            stderr: stderr.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Encoder stderr captured for a failed run.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::EncodingFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}
