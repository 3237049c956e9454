//! Ranking policies used by the selector.

use std::cmp::Ordering;

use super::types::MediaFormat;

/// Decides which of two candidate formats is preferred.
///
/// `Ordering::Greater` means `a` is preferred over `b`. Equal candidates keep
/// their original relative order.
pub trait SelectionPolicy: Send + Sync {
    /// Returns the name of this policy.
    fn name(&self) -> &str;

    /// Compares two formats carrying video.
    fn compare_video(&self, a: &MediaFormat, b: &MediaFormat) -> Ordering;

    /// Compares two formats carrying audio.
    fn compare_audio(&self, a: &MediaFormat, b: &MediaFormat) -> Ordering;
}

/// Prefers the highest bitrate; formats without a bitrate rank last.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestBitrate;

impl SelectionPolicy for HighestBitrate {
    fn name(&self) -> &str {
        "highest_bitrate"
    }

    fn compare_video(&self, a: &MediaFormat, b: &MediaFormat) -> Ordering {
        compare_bitrate(a.video_bitrate, b.video_bitrate)
    }

    fn compare_audio(&self, a: &MediaFormat, b: &MediaFormat) -> Ordering {
        compare_bitrate(a.audio_bitrate, b.audio_bitrate)
    }
}

fn compare_bitrate(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.unwrap_or(f64::NEG_INFINITY);
    let b = b.unwrap_or(f64::NEG_INFINITY);
    a.total_cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_bitrate_video() {
        let low = MediaFormat::video("a", 1000.0, "mp4");
        let high = MediaFormat::video("b", 5000.0, "mp4");
        assert_eq!(HighestBitrate.compare_video(&high, &low), Ordering::Greater);
        assert_eq!(HighestBitrate.compare_video(&low, &high), Ordering::Less);
    }

    #[test]
    fn test_missing_bitrate_ranks_last() {
        let mut unknown = MediaFormat::audio("a", 0.0, "webm");
        unknown.audio_bitrate = None;
        let known = MediaFormat::audio("b", 48.0, "webm");
        assert_eq!(HighestBitrate.compare_audio(&known, &unknown), Ordering::Greater);
    }
}
