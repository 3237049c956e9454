//! Metadata resolution.
//!
//! Normalizes user supplied identifiers into a [`SourceId`] and resolves the
//! title information and downloadable formats through a [`MetadataProvider`].

mod config;
mod error;
mod traits;
mod types;
mod ytdlp;

pub use config::MetadataConfig;
pub use error::MetadataError;
pub use traits::MetadataProvider;
pub use types::{MediaInfo, SourceId};
pub use ytdlp::YtDlpMetadataProvider;
