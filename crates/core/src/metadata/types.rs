//! Types for the metadata module.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::Url;
use std::fmt;
use std::str::FromStr;

use crate::selector::MediaFormat;

use super::error::MetadataError;

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

const HOST_PREFIXES: &[&str] = &["www.", "m.", "music."];
const PATH_FORMS: &[&str] = &["shorts", "embed", "v", "live"];

/// A normalized video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(String);

impl SourceId {
    /// Parses a bare id or a video URL.
    pub fn parse(input: &str) -> Result<Self, MetadataError> {
        let trimmed = input.trim();
        if VIDEO_ID.is_match(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }

        extract_from_url(trimmed)
            .filter(|id| VIDEO_ID.is_match(id))
            .map(Self)
            .ok_or_else(|| MetadataError::invalid_source(input))
    }

    /// The bare 11 character id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this id.
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SourceId {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn extract_from_url(input: &str) -> Option<String> {
    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    let host = HOST_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .unwrap_or(host.as_str());

    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            form if PATH_FORMS.contains(&form) => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    }
}

/// Metadata resolved for one source.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub id: SourceId,
    pub title: String,
    /// Channel or uploader name.
    pub owner: String,
    pub formats: Vec<MediaFormat>,
}
