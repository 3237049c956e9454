//! Opens selected streams and wires their download progress.

use std::sync::Arc;

use tracing::debug;

use crate::progress::{DownloadProgress, SharedProgress};
use crate::selector::{MediaFormat, Selection};
use crate::source::{MediaStream, SourceError, StreamSource};

use super::types::SelectedMedia;

/// Which progress records a stream feeds.
#[derive(Debug, Clone, Copy)]
enum Track {
    Video,
    Audio,
    Both,
}

/// Opens the streams of a [`Selection`] against a [`StreamSource`].
///
/// Every opened stream reports `(downloaded, total)` into the shared
/// progress record as it is consumed. A mixed stream feeds both the video and
/// the audio record.
pub struct MediaSession {
    source: Arc<dyn StreamSource>,
    progress: SharedProgress,
}

impl MediaSession {
    pub fn new(source: Arc<dyn StreamSource>, progress: SharedProgress) -> Self {
        Self { source, progress }
    }

    /// Opens every stream the selection needs.
    ///
    /// Compound selections open video and audio concurrently. If either fails,
    /// the other is dropped and the error is returned.
    pub async fn open(&self, selection: &Selection) -> Result<SelectedMedia, SourceError> {
        debug!(
            "Opening {} media via {} source",
            selection.media_type(),
            self.source.name()
        );

        match selection {
            Selection::Video(format) => Ok(SelectedMedia::Video(
                self.open_tracked(format, Track::Video).await?,
            )),
            Selection::Audio(format) => Ok(SelectedMedia::Audio(
                self.open_tracked(format, Track::Audio).await?,
            )),
            Selection::Mixed(format) => Ok(SelectedMedia::Mixed(
                self.open_tracked(format, Track::Both).await?,
            )),
            Selection::Compound { video, audio } => {
                let (video, audio) = futures::try_join!(
                    self.open_tracked(video, Track::Video),
                    self.open_tracked(audio, Track::Audio)
                )?;
                Ok(SelectedMedia::Compound { video, audio })
            }
        }
    }

    async fn open_tracked(
        &self,
        format: &MediaFormat,
        track: Track,
    ) -> Result<MediaStream, SourceError> {
        let stream = self.source.open(format).await?;
        let progress = self.progress.clone();

        Ok(stream.observe(move |downloaded, total| {
            let record = DownloadProgress::new(downloaded, total);
            match track {
                Track::Video => progress.set_video(record),
                Track::Audio => progress.set_audio(record),
                Track::Both => {
                    progress.set_video(record);
                    progress.set_audio(record);
                }
            }
        }))
    }
}
