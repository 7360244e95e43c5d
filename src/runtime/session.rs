use std::sync::Arc;

use tracing::{debug, warn};

use crate::app::{Activation, App, Popup, Route};
use crate::audio::AudioOutput;
use crate::catalog::TrackId;
use crate::config::UiSettings;
use crate::extras::{AdapterId, SideQueries, SideResponse, SideStore, SideValue};
use crate::mpris::MprisHandle;
use crate::player::{PlaybackStatus, PlayerService};
use crate::ui::{FooterBar, PlayerAdapter, SidePanel};

/// Everything the event loop drives: the browsing model, the one player
/// service, both presentation adapters and the side-data plumbing.
pub struct Session<O: AudioOutput> {
    pub app: App,
    pub player: PlayerService<O>,
    pub footer: FooterBar,
    /// Mounted only while the route shows it.
    pub side_panel: Option<SidePanel>,
    queries: SideQueries,
    store: Arc<dyn SideStore>,
    user: Option<String>,
    last_mpris: Option<(Option<TrackId>, PlaybackStatus)>,
}

impl<O: AudioOutput> Session<O> {
    pub fn new(
        app: App,
        player: PlayerService<O>,
        store: Arc<dyn SideStore>,
        user: Option<String>,
    ) -> Self {
        let queries = SideQueries::spawn(store.clone(), user.clone());
        Self {
            app,
            player,
            footer: FooterBar::new(),
            side_panel: None,
            queries,
            store,
            user,
            last_mpris: None,
        }
    }

    /// Housekeeping before each frame.
    pub fn sync(&mut self, ui: &UiSettings) {
        self.player.pump_events();

        while let Some(response) = self.queries.try_recv() {
            self.apply_side_response(response);
        }

        let wants_panel = self.app.route().shows_side_panel(&ui.side_panel_routes);
        match (wants_panel, self.side_panel.is_some()) {
            (true, false) => self.side_panel = Some(SidePanel::mount()),
            (false, true) => {
                self.side_panel = None;
                debug!("side panel unmounted");
            }
            _ => {}
        }

        let changed = self.footer.follow(&self.player, &self.queries);
        if let Some(panel) = &mut self.side_panel {
            panel.follow(&self.player, &self.queries);
        }
        if changed && !self.app.filter_mode {
            if let Some(id) = self.player.transport().current_track().map(|t| t.id.clone()) {
                self.app.follow_track(&id);
            }
        }

        if matches!(self.app.popup, Some(Popup::Lyrics)) {
            let queries = &self.queries;
            let extras = match &mut self.side_panel {
                Some(panel) => panel.extras_mut(),
                None => self.footer.extras_mut(),
            };
            extras.request_lyrics(queries);
        }
    }

    pub fn apply_side_response(&mut self, response: SideResponse) {
        if let SideValue::FavoriteSet(flag) = response.value {
            self.app.set_favorite(&response.track_id, flag);
        }
        let applied = match response.adapter {
            AdapterId::Footer => self.footer.extras_mut().apply(&response),
            AdapterId::SidePanel => match &mut self.side_panel {
                Some(panel) => panel.extras_mut().apply(&response),
                None => false,
            },
        };
        if !applied {
            debug!(track = %response.track_id, "side response had no taker");
        }
    }

    pub fn toggle_favorite(&mut self) {
        if self.user.is_none() {
            self.app.status = Some("set user.id in the config to keep favorites".into());
            return;
        }
        let queries = &self.queries;
        let extras = match &mut self.side_panel {
            Some(panel) => panel.extras_mut(),
            None => self.footer.extras_mut(),
        };
        if !extras.toggle_favorite(queries) {
            self.app.status = Some("nothing playing".into());
        }
    }

    /// Play the row under the cursor, or open it when it is an album or
    /// playlist.
    pub fn activate_selection(&mut self) {
        if let Activation::Play { track, queue } = self.app.activate() {
            self.app.follow_playback = true;
            self.player.play(track, queue);
        }
    }

    pub fn create_playlist(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        match self.store.create_playlist(self.user.as_deref(), name) {
            Ok(()) => self.reload_playlists(),
            Err(e) => {
                warn!(error = %e, "creating playlist failed");
                self.app.status = Some(e.to_string());
            }
        }
    }

    pub fn add_to_playlist(&mut self, name: &str, track: &TrackId) {
        match self.store.add_to_playlist(name, track) {
            Ok(()) => {
                self.reload_playlists();
                self.app.status = Some(format!("added to {name}"));
            }
            Err(e) => {
                warn!(error = %e, "adding to playlist failed");
                self.app.status = Some(e.to_string());
            }
        }
    }

    /// Remove the selected row from the open playlist, or unfavorite it on
    /// the favorites page.
    pub fn remove_selected(&mut self) {
        if let Some((name, position)) = self.app.selected_playlist_entry() {
            match self.store.remove_from_playlist(&name, position) {
                Ok(()) => self.reload_playlists(),
                Err(e) => {
                    warn!(error = %e, "removing from playlist failed");
                    self.app.status = Some(e.to_string());
                }
            }
            return;
        }
        if *self.app.route() == Route::Favorites {
            let (Some(user), Some(track)) = (
                self.user.as_deref(),
                self.app.selected_track().map(|t| t.id.clone()),
            ) else {
                return;
            };
            match self.store.set_favorite(user, &track, false) {
                Ok(()) => {
                    self.app.set_favorite(&track, false);
                    // Forget cached flags so mounted adapters fetch again.
                    self.footer.extras_mut().follow(None, &self.queries);
                    if let Some(panel) = &mut self.side_panel {
                        panel.extras_mut().follow(None, &self.queries);
                    }
                }
                Err(e) => warn!(error = %e, "removing favorite failed"),
            }
        }
    }

    fn reload_playlists(&mut self) {
        match self.store.playlists(self.user.as_deref()) {
            Ok(playlists) => self.app.set_playlists(playlists),
            Err(e) => warn!(error = %e, "reloading playlists failed"),
        }
    }

    /// Push the player state to MPRIS when it changed since the last call.
    pub fn sync_mpris(&mut self, mpris: &MprisHandle) {
        let transport = self.player.transport();
        let snapshot = (
            transport.current_track().map(|t| t.id.clone()),
            transport.status(),
        );
        if self.last_mpris.as_ref() == Some(&snapshot) {
            return;
        }
        mpris.set_track_metadata(transport.current_track());
        mpris.set_playback(snapshot.1);
        self.last_mpris = Some(snapshot);
    }
}
