//! Types for stream sources.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;

use crate::selector::MediaFormat;

/// Errors that can occur while opening or reading a media stream.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Format {format_id} has no download URL")]
    MissingUrl { format_id: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Unexpected HTTP status {status} for format {format_id}")]
    UnexpectedStatus { status: u16, format_id: String },

    #[error("Stream interrupted: {0}")]
    Interrupted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Body of a media stream.
pub type ByteStream = BoxStream<'static, Result<Bytes, SourceError>>;

/// An opened download of one [`MediaFormat`].
///
/// Bytes are only pulled from the network as the body is consumed, so the
/// download advances at the pace of whoever reads it.
pub struct MediaStream {
    format: MediaFormat,
    total_bytes: Option<u64>,
    body: ByteStream,
}

impl MediaStream {
    /// Wraps an already opened body.
    pub fn new(format: MediaFormat, total_bytes: Option<u64>, body: ByteStream) -> Self {
        Self {
            format,
            total_bytes,
            body,
        }
    }

    /// Builds a stream over in-memory chunks.
    pub fn from_chunks(format: MediaFormat, chunks: Vec<Bytes>) -> Self {
        let total = chunks.iter().map(|c| c.len() as u64).sum();
        let body = stream::iter(chunks.into_iter().map(Ok)).boxed();
        Self::new(format, Some(total), body)
    }

    /// The format being downloaded.
    pub fn format(&self) -> &MediaFormat {
        &self.format
    }

    /// Total size in bytes, when the source reported one.
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Attaches a `(downloaded, total)` observer, called after every chunk.
    pub fn observe<F>(self, observer: F) -> Self
    where
        F: Fn(u64, Option<u64>) + Send + Sync + 'static,
    {
        let total = self.total_bytes;
        let mut downloaded = 0u64;
        let body = self
            .body
            .map(move |chunk| {
                if let Ok(bytes) = &chunk {
                    downloaded += bytes.len() as u64;
                    observer(downloaded, total);
                }
                chunk
            })
            .boxed();

        Self { body, ..self }
    }

    /// Consumes the stream, returning its body.
    pub fn into_body(self) -> ByteStream {
        self.body
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("format", &self.format.id)
            .field("total_bytes", &self.total_bytes)
            .finish_non_exhaustive()
    }
}

/// Opens download streams for media formats.
#[async_trait]
pub trait StreamSource: Send + Sync {
    /// Returns the name of this source implementation.
    fn name(&self) -> &str;

    /// Opens a stream for `format`.
    async fn open(&self, format: &MediaFormat) -> Result<MediaStream, SourceError>;
}
