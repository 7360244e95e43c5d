//! Audio playback subsystem.
//!
//! Exposes `AudioPlayer`, the one process-wide audio output, and the
//! `AudioOutput` contract the player binds to. The output accepts a source,
//! plays/pauses/seeks it, keeps volume and mute local, and reports loaded,
//! failed and finished sources as events.

mod error;
mod player;
mod sink;
mod source;
mod thread;
mod types;

pub use error::AudioError;
pub use player::AudioPlayer;
pub use source::resolve_source;
pub use types::*;

#[cfg(test)]
mod tests;
