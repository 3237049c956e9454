//! Media pipeline coordination.
//!
//! Resolves a video's metadata, picks the best audio and video formats,
//! downloads them concurrently and pipes them into an encoder that muxes them
//! into one file, with a live three line progress display.

pub mod config;
pub mod metadata;
pub mod muxer;
pub mod orchestrator;
pub mod progress;
pub mod selector;
pub mod session;
pub mod source;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config,
    ConfigError, HttpConfig, OutputConfig, ReporterConfig,
};
pub use metadata::{MediaInfo, MetadataConfig, MetadataError, MetadataProvider, SourceId, YtDlpMetadataProvider};
pub use muxer::{EncoderConfig, FfmpegMuxer, MuxError, MuxJob, Muxer};
pub use orchestrator::{
    AudioMode, PipelineConfig, PipelineContext, PipelineError, PipelineOrchestrator,
    PipelineOutcome, PipelineState,
};
pub use progress::{
    DisplaySink, DownloadProgress, MediaProgress, ProgressReporter, ReporterHandle,
    SharedProgress,
};
pub use selector::{MediaFormat, MediaKind, MediaRequest, MediaSelector, MediaType, Selection};
pub use session::{MediaSession, SelectedMedia};
pub use source::{HttpStreamSource, MediaStream, SourceError, StreamSource};
