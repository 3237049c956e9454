//! Trait definitions for the metadata module.

use async_trait::async_trait;

use super::error::MetadataError;
use super::types::{MediaInfo, SourceId};

/// Resolves the title information and available formats of a source.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Returns the name of this provider implementation.
    fn name(&self) -> &str;

    /// Resolves metadata for the given source.
    async fn resolve(&self, id: &SourceId) -> Result<MediaInfo, MetadataError>;

    /// Validates that the provider is properly configured and ready.
    async fn validate(&self) -> Result<(), MetadataError>;
}
