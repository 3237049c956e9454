//! Stream sources.
//!
//! A [`StreamSource`] turns a [`MediaFormat`](crate::selector::MediaFormat)
//! into a [`MediaStream`]: a lazily pulled byte stream that knows its total
//! size and can report download progress to an observer.

mod http;
mod types;

pub use http::HttpStreamSource;
pub use types::{ByteStream, MediaStream, SourceError, StreamSource};
