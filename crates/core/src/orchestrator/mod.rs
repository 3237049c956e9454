//! Pipeline orchestrator.
//!
//! Sequences one run: resolve metadata, select media, prepare the output
//! path, then download and mux while the progress display is live. The
//! display is torn down on every exit path.

mod config;
mod naming;
mod runner;
mod types;

pub use config::{AudioMode, PipelineConfig};
pub use naming::{output_file_name, sanitize_file_name, MAX_FILE_NAME_LENGTH};
pub use runner::{PipelineContext, PipelineOrchestrator};
pub use types::{PipelineError, PipelineOutcome, PipelineState};
