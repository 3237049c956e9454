//! Muxing.
//!
//! A [`Muxer`] combines the opened media streams of a selection into one
//! output file. The FFmpeg implementation speaks to the encoder over numbered
//! pipe channels:
//!
//! - `pipe:3` carries `key=value` progress records back to us
//! - `pipe:4` (and `pipe:5` for compound media) carry the input streams
//!
//! Codecs are copied, except when the output is MP3 and the audio track has
//! to be re-encoded.

mod args;
#[cfg(unix)]
mod channels;
mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use args::{encoder_args, input_channel, FIRST_INPUT_CHANNEL, PROGRESS_CHANNEL};
pub use config::EncoderConfig;
pub use error::MuxError;
pub use ffmpeg::FfmpegMuxer;
pub use traits::Muxer;
pub use types::{mp3_bitrate, AudioCodecPlan, InputLayout, MuxJob, MuxPlan, MP3_BITRATES};
