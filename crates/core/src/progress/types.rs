//! Progress state shared between the downloads, the encoder and the display.

use std::sync::{Arc, RwLock};

/// Zero timestamp reported before the encoder produced a parseable `out_time`.
pub const ZERO_TIMESTAMP: &str = "00:00:00.000";

/// Download progress of a single stream.
///
/// `total` stays `None` until the first progress event so that an empty
/// download never renders as complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes received so far.
    pub downloaded: u64,
    /// Total size in bytes, when known.
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Creates a progress record, clamping `downloaded` to a known `total`.
    ///
    /// A total of zero carries no information and is treated as unknown.
    pub fn new(downloaded: u64, total: Option<u64>) -> Self {
        let total = total.filter(|t| *t > 0);
        let downloaded = match total {
            Some(t) => downloaded.min(t),
            None => downloaded,
        };
        Self { downloaded, total }
    }

    /// Completion percentage, or `None` while the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        self.total
            .map(|total| self.downloaded as f64 / total as f64 * 100.0)
    }
}

/// Encoder-side progress, as reported on the progress channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionProgress {
    /// Output timestamp, `HH:MM:SS.mmm`.
    pub time: String,
    /// Frames written.
    pub frame: u64,
    /// Current encoding speed in frames per second.
    pub fps: f64,
    /// Bytes written to the output so far.
    pub converted_bytes: u64,
    /// Output bitrate, verbatim (e.g. `128.0kbits/s` or `N/A`).
    pub bitrate: String,
    /// Speed relative to realtime, verbatim (e.g. `1.5x`).
    pub speed: String,
}

impl Default for ConversionProgress {
    fn default() -> Self {
        Self {
            time: ZERO_TIMESTAMP.to_string(),
            frame: 0,
            fps: 0.0,
            converted_bytes: 0,
            bitrate: String::new(),
            speed: String::new(),
        }
    }
}

/// Aggregate progress of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaProgress {
    pub video: DownloadProgress,
    pub audio: DownloadProgress,
    pub conversion: ConversionProgress,
}

/// Handle to the [`MediaProgress`] of a run, shared by every event source.
///
/// Writers replace one sub-record at a time, so a reader never observes a
/// half-updated record.
#[derive(Debug, Clone, Default)]
pub struct SharedProgress {
    inner: Arc<RwLock<MediaProgress>>,
}

impl SharedProgress {
    /// Creates a fresh progress record in its initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> MediaProgress {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the video download record.
    pub fn set_video(&self, progress: DownloadProgress) {
        self.update(|p| p.video = progress);
    }

    /// Replaces the audio download record.
    pub fn set_audio(&self, progress: DownloadProgress) {
        self.update(|p| p.audio = progress);
    }

    /// Replaces the conversion record.
    pub fn set_conversion(&self, progress: ConversionProgress) {
        self.update(|p| p.conversion = progress);
    }

    fn update(&self, apply: impl FnOnce(&mut MediaProgress)) {
        match self.inner.write() {
            Ok(mut guard) => apply(&mut guard),
            Err(poisoned) => apply(&mut poisoned.into_inner()),
        }
    }
}
