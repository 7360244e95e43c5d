//! Playback core: the queue/transport state machine and the service that
//! binds it to the single audio output.
//!
//! `Transport` decides what should play; `PlayerService` makes the audio
//! output follow that decision and feeds engine events back into it.

mod queue;
mod service;
mod transport;

pub use queue::Queue;
pub use service::{PlaybackFailure, PlayerService};
pub use transport::*;
