//! Pipeline orchestrator implementation.
//!
//! Drives one identifier through the run states:
//! 1. Resolving metadata (normalize the identifier, ask the provider)
//! 2. Selecting media (nothing is opened if a track is missing)
//! 3. Transferring (open streams, start the display, mux)
//! 4. Finalizing (the display is always stopped here)

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::metadata::{MetadataProvider, SourceId};
use crate::muxer::{MuxJob, Muxer};
use crate::progress::{DisplaySink, ProgressReporter, SharedProgress};
use crate::selector::{MediaRequest, MediaSelector, Selection};
use crate::session::MediaSession;
use crate::source::StreamSource;

use super::config::{AudioMode, PipelineConfig};
use super::naming::output_file_name;
use super::types::{PipelineError, PipelineOutcome, PipelineState};

type StateCallback = Box<dyn Fn(PipelineState) + Send + Sync>;

/// Collaborators shared by every pipeline run.
#[derive(Clone)]
pub struct PipelineContext {
    pub metadata: Arc<dyn MetadataProvider>,
    pub source: Arc<dyn StreamSource>,
    pub muxer: Arc<dyn Muxer>,
    pub selector: MediaSelector,
    pub config: PipelineConfig,
}

impl PipelineContext {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        source: Arc<dyn StreamSource>,
        muxer: Arc<dyn Muxer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            metadata,
            source,
            muxer,
            selector: MediaSelector::default(),
            config,
        }
    }

    /// Replaces the media selector.
    pub fn with_selector(mut self, selector: MediaSelector) -> Self {
        self.selector = selector;
        self
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("metadata", &self.metadata.name())
            .field("source", &self.source.name())
            .field("muxer", &self.muxer.name())
            .field("selector", &self.selector)
            .field("config", &self.config)
            .finish()
    }
}

/// Runs the pipeline for a single identifier.
///
/// An orchestrator is consumed by [`run`](Self::run), so a finished run can
/// never be restarted.
pub struct PipelineOrchestrator {
    identifier: String,
    context: PipelineContext,
    display: Option<DisplaySink>,
    state: PipelineState,
    on_state_change: Option<StateCallback>,
}

impl PipelineOrchestrator {
    pub fn new(identifier: impl Into<String>, context: PipelineContext) -> Self {
        Self {
            identifier: identifier.into(),
            context,
            display: None,
            state: PipelineState::Idle,
            on_state_change: None,
        }
    }

    /// Renders live progress into `sink` while transferring.
    pub fn with_display(mut self, sink: DisplaySink) -> Self {
        self.display = Some(sink);
        self
    }

    /// Registers a callback invoked on every state transition.
    pub fn on_state_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(PipelineState) + Send + Sync + 'static,
    {
        self.on_state_change = Some(Box::new(callback));
        self
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs the pipeline to completion.
    pub async fn run(mut self) -> Result<PipelineOutcome, PipelineError> {
        info!("Processing \"{}\"", self.identifier);

        let result = self.execute().await;
        match &result {
            Ok(outcome) => {
                self.transition(PipelineState::Done);
                info!("File \"{}\" is written", outcome.file_name);
            }
            Err(e) => {
                self.transition(PipelineState::Failed);
                debug!("Pipeline for \"{}\" failed: {}", self.identifier, e);
            }
        }
        result
    }

    async fn execute(&mut self) -> Result<PipelineOutcome, PipelineError> {
        self.transition(PipelineState::ResolvingMetadata);
        let id = SourceId::parse(&self.identifier)?;
        let info = self.context.metadata.resolve(&id).await?;

        self.transition(PipelineState::SelectingMedia);
        let audio_mode = self.context.config.audio;
        let request = match audio_mode {
            Some(_) => MediaRequest::Audio,
            None => MediaRequest::Compound,
        };
        let selection = self.context.selector.select(&info.formats, request)?;
        let kind = selection.media_type();

        let extension = output_extension(&selection, audio_mode);
        let file_name = output_file_name(&info.owner, &info.title, extension);
        let output_dir = self.context.config.output_dir.clone();
        let output_path = output_dir.join(&file_name);
        prepare_output(&output_dir, &output_path).await?;

        self.transition(PipelineState::Transferring);
        let progress = SharedProgress::new();
        let session = MediaSession::new(Arc::clone(&self.context.source), progress.clone());
        let media = session.open(&selection).await?;

        let reporter = self.display.take().map(|sink| {
            ProgressReporter::new(self.context.config.tick_interval).start(progress.clone(), sink)
        });

        let muxed = self
            .context
            .muxer
            .mux(MuxJob::new(media, &output_path), Some(progress))
            .await;

        self.transition(PipelineState::Finalizing);
        if let Some(reporter) = reporter {
            reporter.stop();
        }
        muxed.map_err(|e| PipelineError::from_mux(e, &output_path))?;

        Ok(PipelineOutcome {
            output_path,
            file_name,
            kind,
        })
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state.is_terminal() {
            return;
        }

        debug!("\"{}\": {} -> {}", self.identifier, self.state, next);
        self.state = next;
        if let Some(callback) = &self.on_state_change {
            callback(next);
        }
    }
}

/// Output extension for a selection.
fn output_extension(selection: &Selection, audio_mode: Option<AudioMode>) -> &str {
    match (selection, audio_mode) {
        (Selection::Audio(format), Some(mode)) => mode.extension(&format.container),
        (Selection::Audio(format), None) => &format.container,
        (Selection::Video(format) | Selection::Mixed(format), _) => &format.container,
        (Selection::Compound { video, .. }, _) => &video.container,
    }
}

/// Creates the output directory and removes a previous output file.
async fn prepare_output(output_dir: &Path, output_path: &Path) -> Result<(), PipelineError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| PipelineError::io(output_dir, e))?;

    match tokio::fs::remove_file(output_path).await {
        Ok(()) => {
            debug!("Removed existing file {}", output_path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::io(output_path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::MediaFormat;

    #[test]
    fn test_output_extension() {
        let audio = Selection::Audio(MediaFormat::audio("251", 160.0, "webm"));
        assert_eq!(output_extension(&audio, Some(AudioMode::Mp3)), "mp3");
        assert_eq!(output_extension(&audio, Some(AudioMode::Original)), "webm");

        let compound = Selection::Compound {
            video: MediaFormat::video("137", 5000.0, "mp4"),
            audio: MediaFormat::audio("251", 160.0, "webm"),
        };
        assert_eq!(output_extension(&compound, None), "mp4");

        let mixed = Selection::Mixed(MediaFormat::mixed("18", 600.0, 96.0, "mp4"));
        assert_eq!(output_extension(&mixed, None), "mp4");
    }

    #[tokio::test]
    async fn test_prepare_output_removes_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("nested");
        let output_path = output_dir.join("a.mp4");

        prepare_output(&output_dir, &output_path).await.unwrap();
        assert!(output_dir.is_dir());

        std::fs::write(&output_path, b"old").unwrap();
        prepare_output(&output_dir, &output_path).await.unwrap();
        assert!(!output_path.exists());
    }
}
