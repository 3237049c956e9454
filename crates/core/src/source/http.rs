//! HTTP stream source.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tracing::debug;

use crate::config::HttpConfig;
use crate::selector::MediaFormat;

use super::types::{MediaStream, SourceError, StreamSource};

/// Downloads formats straight from their advertised URL.
pub struct HttpStreamSource {
    client: Client,
}

impl HttpStreamSource {
    /// Creates a source with the given HTTP configuration.
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| SourceError::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    /// Creates a source using an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn map_request_error(e: reqwest::Error) -> SourceError {
    if e.is_connect() {
        SourceError::ConnectionFailed(e.to_string())
    } else {
        SourceError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl StreamSource for HttpStreamSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn open(&self, format: &MediaFormat) -> Result<MediaStream, SourceError> {
        let url = format.url.as_deref().ok_or_else(|| SourceError::MissingUrl {
            format_id: format.id.clone(),
        })?;

        debug!("Opening stream for format {}", format.id);
        let mut request = self.client.get(url);
        for (name, value) in &format.http_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus {
                status: status.as_u16(),
                format_id: format.id.clone(),
            });
        }

        let total = response.content_length().or(format.content_length);
        debug!("Stream for format {} opened ({:?} bytes)", format.id, total);

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| SourceError::Interrupted(e.to_string())))
            .boxed();

        Ok(MediaStream::new(format.clone(), total, body))
    }
}
