//! Best-format selection.

use std::sync::Arc;

use tracing::debug;

use super::policy::{HighestBitrate, SelectionPolicy};
use super::types::{MediaFormat, MediaKind, MediaRequest, Selection, SelectionError};

/// Picks the best audio and video formats under a [`SelectionPolicy`].
#[derive(Clone)]
pub struct MediaSelector {
    policy: Arc<dyn SelectionPolicy>,
}

impl Default for MediaSelector {
    fn default() -> Self {
        Self::new(HighestBitrate)
    }
}

impl std::fmt::Debug for MediaSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaSelector")
            .field("policy", &self.policy.name())
            .finish()
    }
}

impl MediaSelector {
    /// Creates a selector using the given policy.
    pub fn new(policy: impl SelectionPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Returns the name of the active policy.
    pub fn policy_name(&self) -> &str {
        self.policy.name()
    }

    /// Formats carrying video, best first.
    pub fn rank_video<'a>(&self, formats: &'a [MediaFormat]) -> Vec<&'a MediaFormat> {
        let mut videos: Vec<&MediaFormat> = formats.iter().filter(|f| f.has_video).collect();
        // Stable sort: equally ranked formats keep their original order
        videos.sort_by(|a, b| self.policy.compare_video(b, a));
        videos
    }

    /// Formats carrying audio, best first.
    pub fn rank_audio<'a>(&self, formats: &'a [MediaFormat]) -> Vec<&'a MediaFormat> {
        let mut audios: Vec<&MediaFormat> = formats.iter().filter(|f| f.has_audio).collect();
        audios.sort_by(|a, b| self.policy.compare_audio(b, a));
        audios
    }

    /// The best format carrying video.
    pub fn best_video<'a>(&self, formats: &'a [MediaFormat]) -> Option<&'a MediaFormat> {
        self.rank_video(formats).into_iter().next()
    }

    /// The best format carrying audio.
    pub fn best_audio<'a>(&self, formats: &'a [MediaFormat]) -> Option<&'a MediaFormat> {
        self.rank_audio(formats).into_iter().next()
    }

    /// Selects formats for `request`.
    ///
    /// A compound request whose best video and best audio are the same format
    /// yields [`Selection::Mixed`], so only one stream is downloaded.
    pub fn select(
        &self,
        formats: &[MediaFormat],
        request: MediaRequest,
    ) -> Result<Selection, SelectionError> {
        let video = self.best_video(formats);
        let audio = self.best_audio(formats);

        let selection = match request {
            MediaRequest::Video => {
                let video = video.ok_or(SelectionError::MediaNotFound(MediaKind::Video))?;
                Selection::Video(video.clone())
            }
            MediaRequest::Audio => {
                let audio = audio.ok_or(SelectionError::MediaNotFound(MediaKind::Audio))?;
                Selection::Audio(audio.clone())
            }
            MediaRequest::Compound => {
                let video = video.ok_or(SelectionError::MediaNotFound(MediaKind::Video))?;
                let audio = audio.ok_or(SelectionError::MediaNotFound(MediaKind::Audio))?;
                if video.id == audio.id {
                    Selection::Mixed(video.clone())
                } else {
                    Selection::Compound {
                        video: video.clone(),
                        audio: audio.clone(),
                    }
                }
            }
        };

        debug!(
            "Selected {} media (video: {:?}, audio: {:?}) using {}",
            selection.media_type(),
            selection.video_format().map(|f| f.id.as_str()),
            selection.audio_format().map(|f| f.id.as_str()),
            self.policy.name()
        );

        Ok(selection)
    }
}
