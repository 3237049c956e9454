//! Mock muxer for testing.

use async_trait::async_trait;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::muxer::{encoder_args, EncoderConfig, MuxError, MuxJob, MuxPlan, Muxer};
use crate::progress::{parse_progress, SharedProgress};

/// A recorded mux job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedMux {
    /// Planned layout and codecs.
    pub plan: MuxPlan,
    /// Arguments the FFmpeg muxer would have used.
    pub args: Vec<String>,
    /// Output path of the job.
    pub output_path: PathBuf,
    /// Format id of each input, in input order.
    pub format_ids: Vec<String>,
    /// Bytes consumed from each input, in input order.
    pub input_bytes: Vec<u64>,
}

/// Mock implementation of the Muxer trait.
///
/// Consumes every input stream (so download progress advances), optionally
/// publishes a scripted encoder progress block, then writes the concatenated
/// input bytes to the output path.
#[derive(Debug, Default)]
pub struct MockMuxer {
    config: EncoderConfig,
    jobs: Arc<RwLock<Vec<RecordedMux>>>,
    next_error: Arc<RwLock<Option<MuxError>>>,
    progress_output: Arc<RwLock<Option<String>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockMuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded jobs.
    pub async fn recorded_jobs(&self) -> Vec<RecordedMux> {
        self.jobs.read().await.clone()
    }

    /// Configure the next job to fail with the given error.
    ///
    /// The failing job still consumes its inputs before failing.
    pub async fn set_next_error(&self, error: MuxError) {
        *self.next_error.write().await = Some(error);
    }

    /// Keeps every following job running for `delay` after its inputs are
    /// consumed, like an encoder still finishing its output.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Encoder progress text published after the inputs are consumed.
    pub async fn set_progress_output(&self, output: impl Into<String>) {
        *self.progress_output.write().await = Some(output.into());
    }
}

#[async_trait]
impl Muxer for MockMuxer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn mux(&self, job: MuxJob, progress: Option<SharedProgress>) -> Result<(), MuxError> {
        let plan = job.plan();
        let args = encoder_args(&self.config, &plan, &job.output_path);
        let output_path = job.output_path.clone();

        let mut format_ids = Vec::new();
        let mut input_bytes = Vec::new();
        let mut output = Vec::new();
        for stream in job.into_streams() {
            format_ids.push(stream.format().id.clone());
            let mut body = stream.into_body();
            let mut consumed = 0u64;
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                consumed += chunk.len() as u64;
                output.extend_from_slice(&chunk);
            }
            input_bytes.push(consumed);
        }

        self.jobs.write().await.push(RecordedMux {
            plan,
            args,
            output_path: output_path.clone(),
            format_ids,
            input_bytes,
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let (Some(progress), Some(text)) = (&progress, self.progress_output.read().await.as_ref()) {
            progress.set_conversion(parse_progress(text));
        }

        tokio::fs::write(&output_path, output).await?;
        Ok(())
    }

    async fn validate(&self) -> Result<(), MuxError> {
        Ok(())
    }
}
