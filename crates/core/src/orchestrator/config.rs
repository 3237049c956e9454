//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::progress::DEFAULT_TICK_INTERVAL;

/// Audio-only extraction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    /// Keep the source audio codec and container.
    Original,
    /// Re-encode to MP3.
    Mp3,
}

impl AudioMode {
    /// Output extension for an audio source stored in `source_container`.
    pub fn extension<'a>(&self, source_container: &'a str) -> &'a str {
        match self {
            Self::Original => source_container,
            Self::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for AudioMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "original"),
            Self::Mp3 => write!(f, "mp3"),
        }
    }
}

impl FromStr for AudioMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "mp3" => Ok(Self::Mp3),
            other => Err(format!("unknown audio mode: {}", other)),
        }
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory the output file is written to.
    pub output_dir: PathBuf,

    /// Extract audio only, in the given mode.
    #[serde(default)]
    pub audio: Option<AudioMode>,

    /// Redraw interval of the progress display.
    #[serde(default = "default_tick_interval")]
    pub tick_interval: Duration,
}

fn default_tick_interval() -> Duration {
    DEFAULT_TICK_INTERVAL
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            audio: None,
            tick_interval: default_tick_interval(),
        }
    }
}

impl PipelineConfig {
    /// Creates a config writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Sets the audio-only mode.
    pub fn with_audio(mut self, audio: Option<AudioMode>) -> Self {
        self.audio = audio;
        self
    }

    /// Sets the progress redraw interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            output_dir: config.output.directory.clone(),
            audio: None,
            tick_interval: config.reporter.tick_interval(),
        }
    }
}
