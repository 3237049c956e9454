//! yt-dlp based metadata provider.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::selector::MediaFormat;

use super::config::MetadataConfig;
use super::error::MetadataError;
use super::traits::MetadataProvider;
use super::types::{MediaInfo, SourceId};

const UNKNOWN_OWNER: &str = "Unknown";

/// Resolves metadata by running `yt-dlp -J`.
pub struct YtDlpMetadataProvider {
    config: MetadataConfig,
}

#[derive(Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    #[serde(default)]
    formats: Vec<YtDlpFormat>,
}

#[derive(Deserialize)]
struct YtDlpFormat {
    format_id: String,
    ext: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
    vbr: Option<f64>,
    abr: Option<f64>,
    tbr: Option<f64>,
    url: Option<String>,
    protocol: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
    format_note: Option<String>,
    #[serde(default)]
    http_headers: BTreeMap<String, String>,
}

fn has_codec(codec: &Option<String>) -> bool {
    codec.as_deref().is_some_and(|c| c != "none")
}

impl YtDlpFormat {
    fn is_streamable(&self) -> bool {
        self.url.is_some() && matches!(self.protocol.as_deref(), Some("http" | "https"))
    }

    fn into_media_format(self) -> MediaFormat {
        let has_video = has_codec(&self.vcodec);
        let has_audio = has_codec(&self.acodec);

        let video_bitrate = if has_video { self.vbr.or(self.tbr) } else { None };
        let audio_bitrate = match (has_video, has_audio) {
            (_, false) => None,
            (false, true) => self.abr.or(self.tbr),
            (true, true) => self.abr,
        };

        MediaFormat {
            id: self.format_id,
            has_video,
            has_audio,
            video_bitrate,
            audio_bitrate,
            container: self.ext.unwrap_or_else(|| "bin".to_string()),
            url: self.url,
            content_length: self
                .filesize
                .or(self.filesize_approx)
                .filter(|size| *size > 0.0)
                .map(|size| size as u64),
            label: self.format_note,
            http_headers: self.http_headers,
        }
    }
}

impl YtDlpMetadataProvider {
    /// Creates a provider with the given configuration.
    pub fn new(config: MetadataConfig) -> Self {
        Self { config }
    }

    /// Creates a provider with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MetadataConfig::default())
    }

    /// Builds yt-dlp arguments for a lookup.
    fn build_args(&self, id: &SourceId) -> Vec<String> {
        let mut args = vec![
            "-J".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(id.url());
        args
    }

    /// Parses `yt-dlp -J` output into [`MediaInfo`].
    pub fn parse_info(id: &SourceId, output: &str) -> Result<MediaInfo, MetadataError> {
        let info: YtDlpInfo = serde_json::from_str(output)
            .map_err(|e| MetadataError::parse_error(format!("Invalid yt-dlp output: {}", e)))?;

        let owner = info
            .channel
            .or(info.uploader)
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string());

        let formats: Vec<MediaFormat> = info
            .formats
            .into_iter()
            .filter(YtDlpFormat::is_streamable)
            .map(YtDlpFormat::into_media_format)
            .filter(|f| f.has_video || f.has_audio)
            .collect();

        Ok(MediaInfo {
            id: id.clone(),
            title: info.title.unwrap_or_else(|| id.to_string()),
            owner,
            formats,
        })
    }

    fn map_spawn_error(&self, e: std::io::Error) -> MetadataError {
        if e.kind() == std::io::ErrorKind::NotFound {
            MetadataError::ToolNotFound {
                path: self.config.ytdlp_path.clone(),
            }
        } else {
            MetadataError::Io(e)
        }
    }
}

#[async_trait]
impl MetadataProvider for YtDlpMetadataProvider {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn resolve(&self, id: &SourceId) -> Result<MediaInfo, MetadataError> {
        debug!("Resolving metadata for {}", id);

        let output = Command::new(&self.config.ytdlp_path)
            .args(self.build_args(id))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MetadataError::lookup_failed(id.as_str(), stderr.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info = Self::parse_info(id, &stdout)?;
        debug!(
            "Resolved {} ({} streamable formats)",
            id,
            info.formats.len()
        );
        Ok(info)
    }

    async fn validate(&self) -> Result<(), MetadataError> {
        let output = Command::new(&self.config.ytdlp_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(MetadataError::lookup_failed(
                "--version",
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        Ok(())
    }
}
