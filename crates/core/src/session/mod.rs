//! Media sessions.
//!
//! A [`MediaSession`] opens the streams chosen by the selector and keeps the
//! shared progress record up to date while they are consumed.

mod media_session;
mod types;

pub use media_session::MediaSession;
pub use types::SelectedMedia;
