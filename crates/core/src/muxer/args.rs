//! Encoder command line construction.

use std::path::Path;

use super::config::EncoderConfig;
use super::types::{AudioCodecPlan, MuxPlan};

/// Channel the encoder writes progress records to.
pub const PROGRESS_CHANNEL: i32 = 3;

/// Channel of the first encoder input; further inputs follow consecutively.
pub const FIRST_INPUT_CHANNEL: i32 = 4;

/// Channel number for the input at `index`.
pub fn input_channel(index: usize) -> i32 {
    FIRST_INPUT_CHANNEL + index as i32
}

/// Builds the ffmpeg argument list for a planned job.
pub fn encoder_args(config: &EncoderConfig, plan: &MuxPlan, output_path: &Path) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        config.log_level.clone(),
        "-nostdin".to_string(),
        "-y".to_string(),
        "-progress".to_string(),
        format!("pipe:{}", PROGRESS_CHANNEL),
    ];

    for index in 0..plan.layout.input_count() {
        args.extend(["-i".to_string(), format!("pipe:{}", input_channel(index))]);
    }

    for map in plan.layout.maps() {
        args.extend(["-map".to_string(), map.to_string()]);
    }

    if plan.layout.has_video() {
        args.extend(["-c:v".to_string(), "copy".to_string()]);
    }

    if plan.layout.has_audio() {
        match plan.audio_codec {
            AudioCodecPlan::Copy => args.extend(["-c:a".to_string(), "copy".to_string()]),
            AudioCodecPlan::Mp3 { bitrate_kbps } => {
                args.extend(["-c:a".to_string(), "libmp3lame".to_string()]);
                if let Some(bitrate) = bitrate_kbps {
                    args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
                }
            }
        }
    }

    args.extend(config.extra_args.iter().cloned());
    args.push(output_path.to_string_lossy().to_string());

    args
}
