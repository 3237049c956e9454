use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::metadata::MetadataConfig;
use crate::muxer::EncoderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub reporter: ReporterConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP client configuration used by the stream source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("tubemux/{}", env!("CARGO_PKG_VERSION"))
}

/// Progress display configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReporterConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl ReporterConfig {
    /// Redraw interval of the progress display.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    100
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.encoder.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.metadata.ytdlp_path, PathBuf::from("yt-dlp"));
        assert!(config.reporter.enabled);
        assert_eq!(config.reporter.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert!(config.http.user_agent.starts_with("tubemux/"));
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let toml = r#"
[encoder]
log_level = "error"

[reporter]
enabled = false

[output]
directory = "/tmp/media"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.encoder.log_level, "error");
        assert_eq!(config.encoder.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert!(!config.reporter.enabled);
        assert_eq!(config.reporter.tick_interval_ms, 100);
        assert_eq!(config.output.directory, PathBuf::from("/tmp/media"));
    }

    #[test]
    fn test_unknown_field_type_fails() {
        let toml = r#"
[reporter]
tick_interval_ms = "fast"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }
}
