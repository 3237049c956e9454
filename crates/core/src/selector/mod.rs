//! Media selection.
//!
//! Given the formats advertised for a source, the selector picks the best
//! video and the best audio representation and decides whether the result is
//! a single stream or a compound of two streams that must be muxed.

mod policy;
mod media_selector;
mod types;

pub use policy::{HighestBitrate, SelectionPolicy};
pub use media_selector::MediaSelector;
pub use types::{MediaFormat, MediaKind, MediaRequest, MediaType, Selection, SelectionError};
