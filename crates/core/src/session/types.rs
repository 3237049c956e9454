//! Types for media sessions.

use crate::selector::{MediaFormat, MediaType};
use crate::source::MediaStream;

/// Opened streams for a selection.
#[derive(Debug)]
pub enum SelectedMedia {
    Video(MediaStream),
    Audio(MediaStream),
    /// One stream carrying both tracks.
    Mixed(MediaStream),
    /// Two independent streams to be muxed together.
    Compound {
        video: MediaStream,
        audio: MediaStream,
    },
}

impl SelectedMedia {
    /// Shape of this media.
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::Video(_) => MediaType::Video,
            Self::Audio(_) => MediaType::Audio,
            Self::Mixed(_) => MediaType::Mixed,
            Self::Compound { .. } => MediaType::Compound,
        }
    }

    /// The format providing the audio track, if any.
    pub fn audio_format(&self) -> Option<&MediaFormat> {
        match self {
            Self::Audio(s) | Self::Mixed(s) => Some(s.format()),
            Self::Compound { audio, .. } => Some(audio.format()),
            Self::Video(_) => None,
        }
    }

    /// Number of streams.
    pub fn stream_count(&self) -> usize {
        match self {
            Self::Compound { .. } => 2,
            _ => 1,
        }
    }

    /// Consumes the media, returning its streams in encoder input order.
    pub fn into_streams(self) -> Vec<MediaStream> {
        match self {
            Self::Video(s) | Self::Audio(s) | Self::Mixed(s) => vec![s],
            Self::Compound { video, audio } => vec![video, audio],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn stream(format: MediaFormat) -> MediaStream {
        MediaStream::from_chunks(format, vec![Bytes::from_static(b"data")])
    }

    #[test]
    fn test_compound_stream_order() {
        let media = SelectedMedia::Compound {
            video: stream(MediaFormat::video("137", 5000.0, "mp4")),
            audio: stream(MediaFormat::audio("140", 128.0, "m4a")),
        };
        assert_eq!(media.media_type(), MediaType::Compound);
        assert_eq!(media.stream_count(), 2);
        assert_eq!(media.audio_format().unwrap().id, "140");

        let ids: Vec<String> = media
            .into_streams()
            .iter()
            .map(|s| s.format().id.clone())
            .collect();
        assert_eq!(ids, vec!["137", "140"]);
    }

    #[test]
    fn test_video_has_no_audio_format() {
        let media = SelectedMedia::Video(stream(MediaFormat::video("137", 5000.0, "mp4")));
        assert!(media.audio_format().is_none());
        assert_eq!(media.into_streams().len(), 1);
    }
}
