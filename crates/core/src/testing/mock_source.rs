//! Mock stream source for testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::selector::MediaFormat;
use crate::source::{MediaStream, SourceError, StreamSource};

/// Mock implementation of the StreamSource trait.
///
/// Streams in-memory chunks registered per format id. Unknown formats fail
/// with a 404 status.
#[derive(Debug, Default)]
pub struct MockStreamSource {
    streams: Arc<RwLock<HashMap<String, Vec<Bytes>>>>,
    opened: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<SourceError>>>,
}

impl MockStreamSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the body of a format.
    pub async fn add_stream(&self, format_id: &str, chunks: Vec<Vec<u8>>) {
        self.streams.write().await.insert(
            format_id.to_string(),
            chunks.into_iter().map(Bytes::from).collect(),
        );
    }

    /// Format ids opened so far, in call order.
    pub async fn opened(&self) -> Vec<String> {
        self.opened.read().await.clone()
    }

    /// Configure the next open to fail with the given error.
    pub async fn set_next_error(&self, error: SourceError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl StreamSource for MockStreamSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn open(&self, format: &MediaFormat) -> Result<MediaStream, SourceError> {
        self.opened.write().await.push(format.id.clone());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let chunks = self
            .streams
            .read()
            .await
            .get(&format.id)
            .cloned()
            .ok_or_else(|| SourceError::UnexpectedStatus {
                status: 404,
                format_id: format.id.clone(),
            })?;

        Ok(MediaStream::from_chunks(format.clone(), chunks))
    }
}
