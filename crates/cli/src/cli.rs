use std::path::PathBuf;

use clap::Parser;
use tubemux_core::AudioMode;

#[derive(Parser, Debug)]
#[command(name = "tubemux", version)]
#[command(about = "Download the best audio and video streams of a video and mux them into one file")]
pub struct Args {
    /// Video ids, URLs, or files listing one identifier per line
    #[arg(required = true, value_name = "ITEMS")]
    pub items: Vec<String>,

    /// Output directory (default: output.directory from the config)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Extract audio only: original | mp3
    #[arg(short, long, value_name = "MODE")]
    pub audio: Option<AudioMode>,

    /// Configuration file (default: tubemux.toml if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable the live progress display
    #[arg(long)]
    pub no_progress: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_options() {
        let args = Args::try_parse_from([
            "tubemux", "-o", "/tmp/out", "-a", "mp3", "--no-progress", "dQw4w9WgXcQ", "list.txt",
        ])
        .unwrap();

        assert_eq!(args.items, vec!["dQw4w9WgXcQ", "list.txt"]);
        assert_eq!(args.output, Some(PathBuf::from("/tmp/out")));
        assert_eq!(args.audio, Some(AudioMode::Mp3));
        assert!(args.no_progress);
        assert!(!args.log_json);
    }

    #[test]
    fn test_rejects_unknown_audio_mode() {
        let result = Args::try_parse_from(["tubemux", "--audio", "flac", "dQw4w9WgXcQ"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_requires_items() {
        assert!(Args::try_parse_from(["tubemux"]).is_err());
    }
}
