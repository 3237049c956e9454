//! Types for media selection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// One encoded representation of a source, as advertised by the metadata provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFormat {
    /// Opaque format identifier (itag).
    pub id: String,
    /// Whether the representation carries a video track.
    pub has_video: bool,
    /// Whether the representation carries an audio track.
    pub has_audio: bool,
    /// Video bitrate in kbps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_bitrate: Option<f64>,
    /// Audio bitrate in kbps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_bitrate: Option<f64>,
    /// Container / file extension (e.g. `mp4`, `webm`, `m4a`).
    pub container: String,
    /// Direct download URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Advertised size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    /// Human readable label (e.g. `1080p`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Headers the download request must carry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub http_headers: BTreeMap<String, String>,
}

impl MediaFormat {
    /// A video-only representation.
    pub fn video(id: impl Into<String>, bitrate: f64, container: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            has_video: true,
            has_audio: false,
            video_bitrate: Some(bitrate),
            audio_bitrate: None,
            container: container.into(),
            url: None,
            content_length: None,
            label: None,
            http_headers: BTreeMap::new(),
        }
    }

    /// An audio-only representation.
    pub fn audio(id: impl Into<String>, bitrate: f64, container: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            has_video: false,
            has_audio: true,
            video_bitrate: None,
            audio_bitrate: Some(bitrate),
            container: container.into(),
            url: None,
            content_length: None,
            label: None,
            http_headers: BTreeMap::new(),
        }
    }

    /// A representation carrying both tracks.
    pub fn mixed(
        id: impl Into<String>,
        video_bitrate: f64,
        audio_bitrate: f64,
        container: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            has_video: true,
            has_audio: true,
            video_bitrate: Some(video_bitrate),
            audio_bitrate: Some(audio_bitrate),
            container: container.into(),
            url: None,
            content_length: None,
            label: None,
            http_headers: BTreeMap::new(),
        }
    }

    /// Sets the download URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the advertised size.
    pub fn with_content_length(mut self, bytes: u64) -> Self {
        self.content_length = Some(bytes);
        self
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a header to send with the download request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_headers.insert(name.into(), value.into());
        self
    }
}

/// A track capability a selection can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// What the caller asks the selector for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaRequest {
    /// Best video only.
    Video,
    /// Best audio only.
    Audio,
    /// Best video and best audio, combined when they come from different formats.
    #[default]
    Compound,
}

/// Shape of a selected media result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Video,
    Audio,
    Mixed,
    Compound,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Mixed => "mixed",
            Self::Compound => "compound",
        };
        write!(f, "{}", name)
    }
}

/// Formats chosen by the selector, before any stream is opened.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Video(MediaFormat),
    Audio(MediaFormat),
    /// One format already carrying both tracks.
    Mixed(MediaFormat),
    /// Two distinct formats to be muxed together.
    Compound {
        video: MediaFormat,
        audio: MediaFormat,
    },
}

impl Selection {
    /// Shape of this selection.
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Video(_) => MediaType::Video,
            Self::Audio(_) => MediaType::Audio,
            Self::Mixed(_) => MediaType::Mixed,
            Self::Compound { .. } => MediaType::Compound,
        }
    }

    /// The format providing the video track, if any.
    pub fn video_format(&self) -> Option<&MediaFormat> {
        match self {
            Self::Video(f) | Self::Mixed(f) => Some(f),
            Self::Compound { video, .. } => Some(video),
            Self::Audio(_) => None,
        }
    }

    /// The format providing the audio track, if any.
    pub fn audio_format(&self) -> Option<&MediaFormat> {
        match self {
            Self::Audio(f) | Self::Mixed(f) => Some(f),
            Self::Compound { audio, .. } => Some(audio),
            Self::Video(_) => None,
        }
    }

    /// Number of streams that have to be downloaded.
    pub fn stream_count(&self) -> usize {
        match self {
            Self::Compound { .. } => 2,
            _ => 1,
        }
    }
}

/// Errors that can occur during selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// No format offers the required track.
    #[error("{0} is not found")]
    MediaNotFound(MediaKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_accessors() {
        let video = MediaFormat::video("137", 5000.0, "mp4");
        let audio = MediaFormat::audio("140", 128.0, "m4a");
        let selection = Selection::Compound {
            video: video.clone(),
            audio: audio.clone(),
        };

        assert_eq!(selection.media_type(), MediaType::Compound);
        assert_eq!(selection.video_format(), Some(&video));
        assert_eq!(selection.audio_format(), Some(&audio));
        assert_eq!(selection.stream_count(), 2);

        let mixed = Selection::Mixed(MediaFormat::mixed("18", 500.0, 96.0, "mp4"));
        assert_eq!(mixed.video_format(), mixed.audio_format());
        assert_eq!(mixed.stream_count(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = SelectionError::MediaNotFound(MediaKind::Video);
        assert_eq!(err.to_string(), "video is not found");
    }

    #[test]
    fn test_default_request_is_compound() {
        assert_eq!(MediaRequest::default(), MediaRequest::Compound);
    }

    #[test]
    fn test_format_deserialization_defaults() {
        let json = r#"{"id":"251","has_video":false,"has_audio":true,"audio_bitrate":160.0,"container":"webm"}"#;
        let format: MediaFormat = serde_json::from_str(json).unwrap();
        assert_eq!(format.id, "251");
        assert_eq!(format.video_bitrate, None);
        assert_eq!(format.url, None);
    }
}
