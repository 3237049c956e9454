//! FFmpeg-based muxer implementation.

use async_trait::async_trait;
use futures::future::try_join_all;
use futures::StreamExt;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::progress::{parse_progress_lines, SharedProgress};
use crate::source::MediaStream;

use super::args::encoder_args;
use super::config::EncoderConfig;
use super::error::MuxError;
use super::traits::Muxer;
use super::types::MuxJob;

/// Key that terminates one block of encoder progress output.
const PROGRESS_BLOCK_END: &str = "progress=";

/// FFmpeg-based muxer.
///
/// Streams are written into the encoder through numbered pipe channels, and
/// progress is read back from a dedicated channel. Nothing touches disk
/// except the output file.
pub struct FfmpegMuxer {
    config: EncoderConfig,
}

/// Whichever side of a run finished first.
enum FirstDone {
    Fed(Result<(), MuxError>),
    Exited(std::io::Result<ExitStatus>),
}

impl FfmpegMuxer {
    /// Creates a new FFmpeg muxer with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates a muxer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    fn map_spawn_error(&self, e: std::io::Error) -> MuxError {
        if e.kind() == std::io::ErrorKind::NotFound {
            MuxError::spawn_failed(&self.config.ffmpeg_path, "executable not found")
        } else {
            MuxError::spawn_failed(&self.config.ffmpeg_path, e.to_string())
        }
    }

    #[cfg(not(unix))]
    async fn run_encoder(
        &self,
        _job: MuxJob,
        _progress: Option<SharedProgress>,
    ) -> Result<(), MuxError> {
        Err(MuxError::spawn_failed(
            &self.config.ffmpeg_path,
            "numbered pipe channels are only supported on unix",
        ))
    }

    #[cfg(unix)]
    async fn run_encoder(
        &self,
        job: MuxJob,
        progress: Option<SharedProgress>,
    ) -> Result<(), MuxError> {
        use super::channels::ChannelSet;

        let plan = job.plan();
        let args = encoder_args(&self.config, &plan, &job.output_path);
        debug!("Running {:?} {}", self.config.ffmpeg_path, args.join(" "));

        let streams = job.into_streams();
        let channels =
            ChannelSet::new(streams.len()).map_err(|e| self.map_spawn_error(e))?;

        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        channels.attach(&mut command);

        let mut child = command.spawn().map_err(|e| self.map_spawn_error(e))?;
        let (progress_rx, inputs) = channels.into_parent_ends();

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MuxError::spawn_failed(&self.config.ffmpeg_path, "stderr not captured"))?;

        let supervise = async {
            let mut feed = Box::pin(feed_inputs(streams, inputs));

            let first = tokio::select! {
                result = &mut feed => FirstDone::Fed(result),
                status = child.wait() => FirstDone::Exited(status),
            };

            match first {
                FirstDone::Exited(status) => status.map_err(MuxError::from),
                FirstDone::Fed(Ok(())) => child.wait().await.map_err(MuxError::from),
                FirstDone::Fed(Err(MuxError::PipeFailed { input, reason })) => {
                    // The encoder closed an input; its exit status tells why.
                    drop(feed);
                    match child.wait().await {
                        Ok(status) if status.success() => {
                            Err(MuxError::PipeFailed { input, reason })
                        }
                        Ok(status) => Ok(status),
                        Err(e) => Err(MuxError::from(e)),
                    }
                }
                FirstDone::Fed(Err(e)) => {
                    debug!("Stopping encoder: {}", e);
                    if let Err(kill_err) = child.kill().await {
                        debug!("Failed to stop encoder: {}", kill_err);
                    }
                    Err(e)
                }
            }
        };

        let (status, (), stderr_text) = tokio::join!(
            supervise,
            drain_progress(progress_rx, progress),
            read_stderr(stderr)
        );

        // Nothing is logged here: the caller's progress display may still be
        // drawing. Encoder output travels with the error instead.
        let status = status?;
        if !status.success() {
            return Err(MuxError::from_exit_status(status, Some(stderr_text)));
        }

        Ok(())
    }
}

/// Feeds every stream into its encoder input concurrently.
///
/// The first failure drops the remaining feeders, closing their inputs.
pub(crate) async fn feed_inputs<W>(streams: Vec<MediaStream>, sinks: Vec<W>) -> Result<(), MuxError>
where
    W: AsyncWrite + Unpin,
{
    let feeders = streams
        .into_iter()
        .zip(sinks)
        .enumerate()
        .map(|(index, (stream, sink))| feed_input(index, stream, sink));

    try_join_all(feeders).await.map(|_| ())
}

async fn feed_input<W>(index: usize, stream: MediaStream, mut sink: W) -> Result<u64, MuxError>
where
    W: AsyncWrite + Unpin,
{
    let format_id = stream.format().id.clone();
    let mut body = stream.into_body();
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        sink.write_all(&chunk)
            .await
            .map_err(|e| MuxError::pipe_failed(index, e.to_string()))?;
        written += chunk.len() as u64;
    }

    sink.shutdown()
        .await
        .map_err(|e| MuxError::pipe_failed(index, e.to_string()))?;

    debug!("Fed {} bytes of format {} into input {}", written, format_id, index);
    Ok(written)
}

/// Reads encoder progress until end of file.
///
/// Lines are grouped into blocks ending with a `progress=` line; each block
/// replaces the conversion record. A trailing partial block is applied too.
pub(crate) async fn drain_progress<R>(reader: R, progress: Option<SharedProgress>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut block: Vec<String> = Vec::new();

    let publish = |block: &[String]| {
        if let Some(progress) = &progress {
            progress.set_conversion(parse_progress_lines(block.iter().map(String::as_str)));
        }
    };

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let ends_block = line.trim_start().starts_with(PROGRESS_BLOCK_END);
                block.push(line);
                if ends_block {
                    publish(&block);
                    block.clear();
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("Failed to read encoder progress: {}", e);
                break;
            }
        }
    }

    if !block.is_empty() {
        publish(&block);
    }
}

async fn read_stderr<R>(mut reader: R) -> String
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!("Failed to read encoder stderr: {}", e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn mux(&self, job: MuxJob, progress: Option<SharedProgress>) -> Result<(), MuxError> {
        self.run_encoder(job, progress).await
    }

    async fn validate(&self) -> Result<(), MuxError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(MuxError::from_exit_status(
                output.status,
                Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            ));
        }

        Ok(())
    }
}
