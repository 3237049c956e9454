//! Parser for the encoder's `key=value` progress records.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::{ConversionProgress, ZERO_TIMESTAMP};

static TIME_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}:\d{2}:\d{2}\.\d{3})").unwrap());
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").unwrap());

/// Parses one flushed batch of progress records.
pub fn parse_progress(chunk: &str) -> ConversionProgress {
    parse_progress_lines(chunk.lines())
}

/// Parses progress records given line by line.
///
/// The result always starts from [`ConversionProgress::default`]; values from
/// earlier batches are never carried over.
pub fn parse_progress_lines<'a, I>(lines: I) -> ConversionProgress
where
    I: IntoIterator<Item = &'a str>,
{
    let mut progress = ConversionProgress::default();

    for line in lines {
        let mut parts = line.split('=');
        let (Some(name), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();

        match name {
            "out_time" => {
                progress.time = TIME_PREFIX
                    .captures(value)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| ZERO_TIMESTAMP.to_string());
            }
            "frame" => {
                if let Some(frame) = parse_integer(value) {
                    progress.frame = frame;
                }
            }
            "fps" => {
                if DECIMAL.is_match(value) {
                    if let Ok(fps) = value.parse::<f64>() {
                        progress.fps = fps;
                    }
                }
            }
            "total_size" => {
                if let Some(size) = parse_integer(value) {
                    progress.converted_bytes = size;
                }
            }
            "bitrate" => progress.bitrate = value.to_string(),
            "speed" => progress.speed = value.to_string(),
            _ => {}
        }
    }

    progress
}

fn parse_integer(value: &str) -> Option<u64> {
    if INTEGER.is_match(value) {
        value.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognized_keys() {
        let progress = parse_progress_lines([
            "out_time=00:01:02.345 extra",
            "frame=120",
            "fps=29.97",
            "bitrate=128k",
        ]);

        assert_eq!(
            progress,
            ConversionProgress {
                time: "00:01:02.345".to_string(),
                frame: 120,
                fps: 29.97,
                converted_bytes: 0,
                bitrate: "128k".to_string(),
                speed: String::new(),
            }
        );
    }

    #[test]
    fn test_unparsable_out_time_resets() {
        let progress = parse_progress_lines(["out_time=garbage"]);
        assert_eq!(progress.time, "00:00:00.000");
    }

    #[test]
    fn test_negative_out_time_resets() {
        // ffmpeg reports a negative timestamp before the first packet
        let progress = parse_progress("out_time=-577014:32:22.775808\n");
        assert_eq!(progress.time, ZERO_TIMESTAMP);
    }

    #[test]
    fn test_parse_ffmpeg_block() {
        let block = "frame=240\nfps=48.00\nstream_0_0_q=-1.0\nbitrate=1544.2kbits/s\n\
                     total_size=1966128\nout_time_us=10186667\nout_time_ms=10186667\n\
                     out_time=00:00:10.186667\ndup_frames=0\ndrop_frames=0\nspeed=2.04x\n\
                     progress=continue\n";

        let progress = parse_progress(block);
        assert_eq!(progress.time, "00:00:10.186");
        assert_eq!(progress.frame, 240);
        assert_eq!(progress.fps, 48.0);
        assert_eq!(progress.converted_bytes, 1966128);
        assert_eq!(progress.bitrate, "1544.2kbits/s");
        assert_eq!(progress.speed, "2.04x");
    }

    #[test]
    fn test_malformed_lines_are_ignored() {
        let progress = parse_progress_lines([
            "no separator here",
            "a=b=c",
            "",
            "=",
            "frame=12",
        ]);
        assert_eq!(progress.frame, 12);
    }

    #[test]
    fn test_invalid_numbers_keep_zero_state() {
        let progress = parse_progress_lines([
            "frame=-3",
            "fps=N/A",
            "total_size=12.5",
            "fps=1.2.3",
        ]);
        assert_eq!(progress.frame, 0);
        assert_eq!(progress.fps, 0.0);
        assert_eq!(progress.converted_bytes, 0);
    }

    #[test]
    fn test_keys_and_values_are_trimmed() {
        let progress = parse_progress_lines(["  frame = 7 ", " speed =  1.5x"]);
        assert_eq!(progress.frame, 7);
        assert_eq!(progress.speed, "1.5x");
    }

    #[test]
    fn test_each_parse_starts_from_zero_state() {
        let first = parse_progress("frame=10\nspeed=1x\n");
        assert_eq!(first.frame, 10);

        let second = parse_progress("bitrate=64k\n");
        assert_eq!(second.frame, 0);
        assert_eq!(second.speed, "");
        assert_eq!(second.bitrate, "64k");
    }
}
