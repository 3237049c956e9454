//! Trait definitions for the muxer module.

use async_trait::async_trait;

use crate::progress::SharedProgress;

use super::error::MuxError;
use super::types::MuxJob;

/// Combines opened media streams into one output file.
#[async_trait]
pub trait Muxer: Send + Sync {
    /// Returns the name of this muxer implementation.
    fn name(&self) -> &str;

    /// Runs the job to completion.
    ///
    /// When `progress` is given, its conversion record is replaced with every
    /// progress update the encoder emits.
    async fn mux(&self, job: MuxJob, progress: Option<SharedProgress>) -> Result<(), MuxError>;

    /// Validates that the muxer is properly configured and ready.
    async fn validate(&self) -> Result<(), MuxError>;
}
