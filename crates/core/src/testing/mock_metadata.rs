//! Mock metadata provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::metadata::{MediaInfo, MetadataError, MetadataProvider, SourceId};

/// Mock implementation of the MetadataProvider trait.
///
/// Serves pre-configured [`MediaInfo`] by id and records every lookup.
#[derive(Debug, Default)]
pub struct MockMetadataProvider {
    infos: Arc<RwLock<HashMap<String, MediaInfo>>>,
    resolved: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<MetadataError>>>,
}

impl MockMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers metadata, keyed by its id.
    pub async fn add_info(&self, info: MediaInfo) {
        self.infos
            .write()
            .await
            .insert(info.id.as_str().to_string(), info);
    }

    /// Ids resolved so far, in call order.
    pub async fn resolved_ids(&self) -> Vec<String> {
        self.resolved.read().await.clone()
    }

    /// Configure the next lookup to fail with the given error.
    pub async fn set_next_error(&self, error: MetadataError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve(&self, id: &SourceId) -> Result<MediaInfo, MetadataError> {
        self.resolved.write().await.push(id.as_str().to_string());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.infos
            .read()
            .await
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| MetadataError::lookup_failed(id.as_str(), "video unavailable"))
    }

    async fn validate(&self) -> Result<(), MetadataError> {
        Ok(())
    }
}
