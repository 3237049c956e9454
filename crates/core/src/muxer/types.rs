//! Types for the muxer module.

use std::path::{Path, PathBuf};

use crate::selector::MediaType;
use crate::session::SelectedMedia;
use crate::source::MediaStream;

/// Standard MP3 bitrates in kbps, ascending.
pub const MP3_BITRATES: [u32; 7] = [32, 96, 128, 160, 192, 256, 320];

/// Smallest standard MP3 bitrate not below the source bitrate.
///
/// Returns `None` when the source exceeds every standard rate.
pub fn mp3_bitrate(source_kbps: f64) -> Option<u32> {
    MP3_BITRATES
        .iter()
        .copied()
        .find(|rate| f64::from(*rate) >= source_kbps)
}

/// How the encoder inputs map onto output tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// One input, video track only.
    Video,
    /// One input, audio track only.
    Audio,
    /// One input carrying both tracks.
    Mixed,
    /// Video from input 0, audio from input 1.
    Compound,
}

impl InputLayout {
    /// Number of encoder inputs.
    pub fn input_count(&self) -> usize {
        match self {
            Self::Compound => 2,
            _ => 1,
        }
    }

    /// Stream specifiers passed to `-map`, in order.
    pub fn maps(&self) -> &'static [&'static str] {
        match self {
            Self::Video => &["0:v"],
            Self::Audio => &["0:a"],
            Self::Mixed => &["0:v", "0:a"],
            Self::Compound => &["0:v", "1:a"],
        }
    }

    pub fn has_video(&self) -> bool {
        !matches!(self, Self::Audio)
    }

    pub fn has_audio(&self) -> bool {
        !matches!(self, Self::Video)
    }
}

impl From<MediaType> for InputLayout {
    fn from(media_type: MediaType) -> Self {
        match media_type {
            MediaType::Video => Self::Video,
            MediaType::Audio => Self::Audio,
            MediaType::Mixed => Self::Mixed,
            MediaType::Compound => Self::Compound,
        }
    }
}

/// Audio codec treatment for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodecPlan {
    /// Keep the source codec.
    Copy,
    /// Re-encode to MP3, at the given bitrate when the source bitrate is known.
    Mp3 { bitrate_kbps: Option<u32> },
}

impl AudioCodecPlan {
    /// Plans the audio codec for an output path.
    ///
    /// Only `.mp3` outputs are re-encoded. A source above every standard MP3
    /// rate is copied.
    pub fn for_output(output: &Path, source_kbps: Option<f64>) -> Self {
        let is_mp3 = output
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"));

        if !is_mp3 {
            return Self::Copy;
        }

        match source_kbps {
            Some(kbps) => match mp3_bitrate(kbps) {
                Some(rate) => Self::Mp3 {
                    bitrate_kbps: Some(rate),
                },
                None => Self::Copy,
            },
            None => Self::Mp3 { bitrate_kbps: None },
        }
    }
}

/// Everything the argument builder needs to know about a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxPlan {
    pub layout: InputLayout,
    pub audio_codec: AudioCodecPlan,
}

/// A mux job: opened streams plus the output path.
#[derive(Debug)]
pub struct MuxJob {
    pub media: SelectedMedia,
    pub output_path: PathBuf,
}

impl MuxJob {
    pub fn new(media: SelectedMedia, output_path: impl Into<PathBuf>) -> Self {
        Self {
            media,
            output_path: output_path.into(),
        }
    }

    /// Input layout of this job.
    pub fn layout(&self) -> InputLayout {
        self.media.media_type().into()
    }

    /// Plans layout and codecs for this job.
    pub fn plan(&self) -> MuxPlan {
        let layout = self.layout();
        let audio_codec = if layout.has_audio() {
            let source_kbps = self.media.audio_format().and_then(|f| f.audio_bitrate);
            AudioCodecPlan::for_output(&self.output_path, source_kbps)
        } else {
            AudioCodecPlan::Copy
        };

        MuxPlan {
            layout,
            audio_codec,
        }
    }

    /// Consumes the job, returning its streams in input order.
    pub fn into_streams(self) -> Vec<MediaStream> {
        self.media.into_streams()
    }
}
