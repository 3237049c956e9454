//! Testing utilities and mock implementations for end-to-end tests.
//!
//! Every collaborator of the pipeline has an in-memory mock here, so whole
//! runs can be exercised without network access, yt-dlp or ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use tubemux_core::testing::{fixtures, MockMetadataProvider, MockMuxer, MockStreamSource};
//!
//! let metadata = MockMetadataProvider::new();
//! metadata.add_info(fixtures::media_info("dQw4w9WgXcQ", fixtures::compound_formats())).await;
//!
//! let source = MockStreamSource::new();
//! source.add_stream("137", vec![vec![0u8; 1024]]).await;
//! ```

mod captured_display;
mod mock_metadata;
mod mock_muxer;
mod mock_source;

pub use captured_display::CapturedDisplay;
pub use mock_metadata::MockMetadataProvider;
pub use mock_muxer::{MockMuxer, RecordedMux};
pub use mock_source::MockStreamSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::metadata::{MediaInfo, SourceId};
    use crate::selector::MediaFormat;

    /// A valid source id used across tests.
    pub const SOURCE_ID: &str = "dQw4w9WgXcQ";

    /// Metadata for `id` with the given formats.
    pub fn media_info(id: &str, formats: Vec<MediaFormat>) -> MediaInfo {
        MediaInfo {
            id: SourceId::parse(id).unwrap_or_else(|e| panic!("fixture id {}: {}", id, e)),
            title: "Never Gonna Give You Up".to_string(),
            owner: "Rick Astley".to_string(),
            formats,
        }
    }

    /// One 1080p video-only format and one audio-only format.
    pub fn compound_formats() -> Vec<MediaFormat> {
        vec![
            MediaFormat::video("137", 5000.0, "mp4").with_label("1080p"),
            MediaFormat::audio("140", 128.0, "m4a"),
        ]
    }

    /// A single audio-only format at 190 kbps.
    pub fn audio_formats() -> Vec<MediaFormat> {
        vec![MediaFormat::audio("251", 190.0, "webm")]
    }

    /// A body of `len` bytes split into chunks of `chunk` bytes.
    pub fn chunked_body(len: usize, chunk: usize) -> Vec<Vec<u8>> {
        (0..len)
            .map(|i| (i % 251) as u8)
            .collect::<Vec<u8>>()
            .chunks(chunk.max(1))
            .map(|c| c.to_vec())
            .collect()
    }
}
