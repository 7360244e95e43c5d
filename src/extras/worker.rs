use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::catalog::TrackId;

use super::state::AdapterId;
use super::store::SideStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideQuery {
    Favorite,
    Lyrics,
    SetFavorite(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideRequest {
    pub adapter: AdapterId,
    pub track_id: TrackId,
    pub query: SideQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideValue {
    Favorite(bool),
    Lyrics(Option<String>),
    /// Result of a write: the flag as stored afterwards.
    FavoriteSet(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideResponse {
    pub adapter: AdapterId,
    pub track_id: TrackId,
    pub value: SideValue,
}

/// Anything that can accept side-data requests without blocking.
pub trait SideRequester {
    fn request(&self, request: SideRequest);
}

/// Background worker answering side-data requests against a `SideStore`.
///
/// Requests are answered in order. Store failures never surface as errors:
/// they degrade to "not a favorite" / "no lyrics" and are logged.
pub struct SideQueries {
    tx: Option<Sender<SideRequest>>,
    rx: Receiver<SideResponse>,
    join: Option<JoinHandle<()>>,
}

impl SideQueries {
    pub fn spawn(store: Arc<dyn SideStore>, user: Option<String>) -> Self {
        let (tx, requests) = mpsc::channel::<SideRequest>();
        let (responses, rx) = mpsc::channel::<SideResponse>();
        let join = thread::spawn(move || {
            for request in requests {
                let value = answer(store.as_ref(), user.as_deref(), &request);
                let response = SideResponse {
                    adapter: request.adapter,
                    track_id: request.track_id,
                    value,
                };
                if responses.send(response).is_err() {
                    break;
                }
            }
            debug!("side query worker exited");
        });
        Self {
            tx: Some(tx),
            rx,
            join: Some(join),
        }
    }

    pub fn try_recv(&self) -> Option<SideResponse> {
        self.rx.try_recv().ok()
    }
}

impl SideRequester for SideQueries {
    fn request(&self, request: SideRequest) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(request).is_err() {
            warn!("side query worker is gone; request dropped");
        }
    }
}

impl Drop for SideQueries {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.tx.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Resolve one request. Never fails; errors degrade to empty answers.
pub(super) fn answer(
    store: &dyn SideStore,
    user: Option<&str>,
    request: &SideRequest,
) -> SideValue {
    let track = &request.track_id;
    match request.query {
        SideQuery::Favorite => {
            let Some(user) = user else {
                return SideValue::Favorite(false);
            };
            SideValue::Favorite(store.is_favorite(user, track).unwrap_or_else(|err| {
                warn!(%track, error = %err, "favorite lookup failed");
                false
            }))
        }
        SideQuery::Lyrics => SideValue::Lyrics(store.lyrics(track).unwrap_or_else(|err| {
            warn!(%track, error = %err, "lyrics lookup failed");
            None
        })),
        SideQuery::SetFavorite(favorite) => {
            let Some(user) = user else {
                warn!(%track, "no user configured; favorite not saved");
                return SideValue::FavoriteSet(false);
            };
            match store.set_favorite(user, track, favorite) {
                Ok(()) => SideValue::FavoriteSet(favorite),
                Err(err) => {
                    warn!(%track, error = %err, "saving favorite failed");
                    SideValue::FavoriteSet(!favorite)
                }
            }
        }
    }
}
