//! Per-track side data kept next to playback: favorites, lyrics and playlists.
//!
//! None of this feeds back into the transport. Lookups run on a worker
//! thread and their answers are applied to whichever presentation adapter
//! asked, as long as that adapter still shows the same track.

mod state;
mod store;
mod worker;

pub use state::{AdapterId, Lyrics, TrackExtras};
pub use store::{LocalStore, Playlist, SideStore, StoreError};
pub use worker::{SideQueries, SideQuery, SideRequest, SideRequester, SideResponse, SideValue};

#[cfg(test)]
mod tests;
