use tracing::debug;

use crate::catalog::TrackId;

use super::worker::{SideQuery, SideRequest, SideRequester, SideResponse, SideValue};

/// Which presentation adapter issued a side request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterId {
    Footer,
    SidePanel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Lyrics {
    #[default]
    NotRequested,
    Loading,
    Ready(Option<String>),
}

/// One adapter's view of the current track's side data.
///
/// Each adapter keeps its own copy and fetches independently; nothing here
/// is shared with the transport or with the other adapter.
#[derive(Debug)]
pub struct TrackExtras {
    adapter: AdapterId,
    track_id: Option<TrackId>,
    favorite: Option<bool>,
    lyrics: Lyrics,
}

impl TrackExtras {
    pub fn new(adapter: AdapterId) -> Self {
        Self {
            adapter,
            track_id: None,
            favorite: None,
            lyrics: Lyrics::NotRequested,
        }
    }

    pub fn adapter(&self) -> AdapterId {
        self.adapter
    }

    pub fn track_id(&self) -> Option<&TrackId> {
        self.track_id.as_ref()
    }

    /// `None` until the lookup for the current track has answered.
    pub fn favorite(&self) -> Option<bool> {
        self.favorite
    }

    pub fn lyrics(&self) -> &Lyrics {
        &self.lyrics
    }

    /// Track the transport's current track.
    ///
    /// On a change the old side data is dropped and the favorite flag is
    /// re-requested. Returns whether the track changed.
    pub fn follow(&mut self, track: Option<&TrackId>, queries: &impl SideRequester) -> bool {
        if self.track_id.as_ref() == track {
            return false;
        }
        self.track_id = track.cloned();
        self.favorite = None;
        self.lyrics = Lyrics::NotRequested;
        if let Some(id) = track {
            self.send(id.clone(), SideQuery::Favorite, queries);
        }
        true
    }

    pub fn request_lyrics(&mut self, queries: &impl SideRequester) {
        let Some(id) = self.track_id.clone() else {
            return;
        };
        if matches!(self.lyrics, Lyrics::Ready(_) | Lyrics::Loading) {
            return;
        }
        self.lyrics = Lyrics::Loading;
        self.send(id, SideQuery::Lyrics, queries);
    }

    /// Ask the store to flip the favorite flag. The shown flag changes only
    /// once the store has answered.
    pub fn toggle_favorite(&mut self, queries: &impl SideRequester) -> bool {
        let Some(id) = self.track_id.clone() else {
            return false;
        };
        let target = !self.favorite.unwrap_or(false);
        self.send(id, SideQuery::SetFavorite(target), queries);
        true
    }

    /// Apply a worker answer. Answers for another adapter or for a track that
    /// is no longer current are discarded. Returns whether it was applied.
    pub fn apply(&mut self, response: &SideResponse) -> bool {
        if response.adapter != self.adapter || self.track_id.as_ref() != Some(&response.track_id) {
            debug!(
                adapter = ?response.adapter,
                track = %response.track_id,
                "discarding stale side response"
            );
            return false;
        }
        match &response.value {
            SideValue::Favorite(flag) | SideValue::FavoriteSet(flag) => self.favorite = Some(*flag),
            SideValue::Lyrics(text) => self.lyrics = Lyrics::Ready(text.clone()),
        }
        true
    }

    fn send(&self, track_id: TrackId, query: SideQuery, queries: &impl SideRequester) {
        queries.request(SideRequest {
            adapter: self.adapter,
            track_id,
            query,
        });
    }
}
