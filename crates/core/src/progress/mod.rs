//! Progress tracking for a pipeline run.
//!
//! Three independent event sources feed one [`MediaProgress`] record:
//! the video download, the audio download and the encoder's progress channel.
//! [`ProgressReporter`] periodically renders the latest state of that record.

mod parser;
mod reporter;
mod types;

pub use parser::{parse_progress, parse_progress_lines};
pub use reporter::{
    format_percent, render_lines, DisplaySink, ProgressReporter, ReporterHandle,
    DEFAULT_TICK_INTERVAL, PERCENT_PLACEHOLDER,
};
pub use types::{
    ConversionProgress, DownloadProgress, MediaProgress, SharedProgress, ZERO_TIMESTAMP,
};
