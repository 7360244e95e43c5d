//! Application model types: `App`, `Popup` and `Activation`.
//!
//! The `App` struct holds the catalog, the per-user lists (favorites and
//! playlists), the current route and the list cursor used by the UI and
//! runtime.

use crate::catalog::{Catalog, Track, TrackId};
use crate::extras::Playlist;

use super::route::Route;

/// Overlay drawn on top of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    Lyrics,
    Metadata,
    /// Choose a playlist to add `track` to.
    AddToPlaylist { track: TrackId, cursor: usize },
    /// Type the name of a new playlist.
    NewPlaylist { name: String },
}

/// What opening the selected row asks the runtime to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    Nothing,
    /// The app moved to another page.
    Navigated,
    /// Play `track` with `queue` as the new queue.
    Play { track: Track, queue: Vec<Track> },
}

/// The main application model.
pub struct App {
    catalog: Catalog,
    favorites: Vec<TrackId>,
    playlists: Vec<Playlist>,

    route: Route,
    back_stack: Vec<(Route, usize)>,

    /// Row index (into the unfiltered rows of the route) under the cursor.
    pub selected: usize,

    pub filter_mode: bool,
    pub filter_query: String,

    /// The cursor jumps to the playing track when it is on this page.
    pub follow_playback: bool,

    pub popup: Option<Popup>,
    /// One-line message shown until the next key press.
    pub status: Option<String>,
}

impl App {
    /// Create a new `App` on the library page.
    pub fn new(catalog: Catalog, favorites: Vec<TrackId>, playlists: Vec<Playlist>) -> Self {
        Self {
            catalog,
            favorites,
            playlists,
            route: Route::Library,
            back_stack: Vec::new(),
            selected: 0,
            filter_mode: false,
            filter_query: String::new(),
            follow_playback: true,
            popup: None,
            status: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn favorites(&self) -> &[TrackId] {
        &self.favorites
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn is_favorite(&self, id: &TrackId) -> bool {
        self.favorites.contains(id)
    }

    /// Mirror a favorite change confirmed by the store.
    pub fn set_favorite(&mut self, id: &TrackId, favorite: bool) {
        let present = self.favorites.contains(id);
        if favorite && !present {
            self.favorites.push(id.clone());
        } else if !favorite && present {
            self.favorites.retain(|f| f != id);
        }
        self.ensure_selected_visible();
    }

    pub fn set_playlists(&mut self, playlists: Vec<Playlist>) {
        self.playlists = playlists;
        self.ensure_selected_visible();
    }

    /// Move to `route`, remembering where we came from.
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        let from = std::mem::replace(&mut self.route, route);
        self.back_stack.push((from, self.selected));
        self.reset_view();
    }

    /// Jump to a top-level page, dropping the back stack.
    pub fn switch_to(&mut self, route: Route) {
        self.back_stack.clear();
        if route != self.route {
            self.route = route;
            self.reset_view();
        }
    }

    /// Return to the previous page. Returns false when there is none.
    pub fn back(&mut self) -> bool {
        let Some((route, selected)) = self.back_stack.pop() else {
            return false;
        };
        self.route = route;
        self.filter_query.clear();
        self.filter_mode = false;
        self.selected = selected;
        self.ensure_selected_visible();
        true
    }

    fn reset_view(&mut self) {
        self.selected = 0;
        self.filter_query.clear();
        self.filter_mode = false;
    }

    /// Tracks listed by the current page, in page order. Empty for pages
    /// that list albums or playlists.
    pub fn route_tracks(&self) -> Vec<&Track> {
        match &self.route {
            Route::Library => self.catalog.tracks().iter().collect(),
            Route::Album(key) => self
                .catalog
                .album(key)
                .map(|a| self.resolve(&a.track_ids))
                .unwrap_or_default(),
            Route::Playlist(name) => self
                .playlist(name)
                .map(|p| self.resolve(&p.tracks))
                .unwrap_or_default(),
            Route::Favorites => self.resolve(&self.favorites),
            Route::Albums | Route::Playlists => Vec::new(),
        }
    }

    fn resolve<'a>(&'a self, ids: &'a [TrackId]) -> Vec<&'a Track> {
        self.catalog.tracks_for(ids)
    }

    pub fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.name == name)
    }

    /// Labels of every row on the current page, before filtering.
    pub fn row_labels(&self) -> Vec<String> {
        match &self.route {
            Route::Albums => self
                .catalog
                .albums()
                .iter()
                .map(|a| match a.release_year {
                    Some(year) => format!("{} ({year})", a.key),
                    None => a.key.to_string(),
                })
                .collect(),
            Route::Playlists => self
                .playlists
                .iter()
                .map(|p| format!("{} [{}]", p.name, p.tracks.len()))
                .collect(),
            _ => self
                .route_tracks()
                .into_iter()
                .map(|t| t.display.clone())
                .collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        match &self.route {
            Route::Albums => self.catalog.albums().len(),
            Route::Playlists => self.playlists.len(),
            _ => self.route_tracks().len(),
        }
    }

    /// Return the display order of row indices, taking active filtering into
    /// account.
    pub fn display_indices(&self) -> Vec<usize> {
        let query = self.filter_query.trim();
        if query.is_empty() {
            return (0..self.row_count()).collect();
        }
        self.row_labels()
            .iter()
            .enumerate()
            .filter(|(_, label)| Self::fuzzy_match_positions(label, query).is_some())
            .map(|(i, _)| i)
            .collect()
    }

    /// The queue handed to the player: the tracks shown on this page, in the
    /// order they are shown.
    pub fn visible_tracks(&self) -> Vec<Track> {
        let tracks = self.route_tracks();
        self.display_indices()
            .into_iter()
            .filter_map(|i| tracks.get(i).map(|t| (*t).clone()))
            .collect()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.route_tracks().get(self.selected).copied()
    }

    /// Open the row under the cursor.
    pub fn activate(&mut self) -> Activation {
        if !self.display_indices().contains(&self.selected) {
            return Activation::Nothing;
        }
        match &self.route {
            Route::Albums => {
                let Some(album) = self.catalog.albums().get(self.selected) else {
                    return Activation::Nothing;
                };
                let key = album.key.clone();
                self.navigate(Route::Album(key));
                Activation::Navigated
            }
            Route::Playlists => {
                let Some(playlist) = self.playlists.get(self.selected) else {
                    return Activation::Nothing;
                };
                let name = playlist.name.clone();
                self.navigate(Route::Playlist(name));
                Activation::Navigated
            }
            _ => match self.selected_track().cloned() {
                Some(track) => Activation::Play {
                    track,
                    queue: self.visible_tracks(),
                },
                None => Activation::Nothing,
            },
        }
    }

    /// Position in the stored playlist of the selected row, skipping entries
    /// whose track is no longer in the library.
    pub fn selected_playlist_entry(&self) -> Option<(String, usize)> {
        let Route::Playlist(name) = &self.route else {
            return None;
        };
        let playlist = self.playlist(name)?;
        let position = playlist
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, id)| self.catalog.track(id).is_some())
            .map(|(pos, _)| pos)
            .nth(self.selected)?;
        Some((name.clone(), position))
    }

    /// Move the cursor onto `id` if this page lists it.
    pub fn follow_track(&mut self, id: &TrackId) {
        if !self.follow_playback {
            return;
        }
        let Some(row) = self.route_tracks().iter().position(|t| &t.id == id) else {
            return;
        };
        if self.display_indices().contains(&row) {
            self.selected = row;
        }
    }

    /// Return the next visible index in the current display order after `current`.
    /// Wraps around to the first element.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index in the current display order before `current`.
    /// Wraps around to the last element.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(0) | None => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
        }
    }

    /// Move selection to the next visible row.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible row.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }

    pub fn select_first(&mut self) {
        if let Some(&first) = self.display_indices().first() {
            self.selected = first;
        }
    }

    pub fn select_last(&mut self) {
        if let Some(&last) = self.display_indices().last() {
            self.selected = last;
        }
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Enter filter mode: the cursor stops following playback while typing.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.follow_playback = false;
        self.ensure_selected_visible();
    }

    /// Leave filter mode, keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
        self.follow_playback = true;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.follow_playback = true;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible row.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    pub fn toggle_popup(&mut self, popup: Popup) {
        if self.popup.as_ref() == Some(&popup) {
            self.popup = None;
        } else {
            self.popup = Some(popup);
        }
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Open the playlist picker for the selected track.
    pub fn open_add_to_playlist(&mut self) {
        let Some(track) = self.selected_track().map(|t| t.id.clone()) else {
            return;
        };
        if self.playlists.is_empty() {
            self.status = Some("no playlists yet; create one with n on the playlists page".into());
            return;
        }
        self.popup = Some(Popup::AddToPlaylist { track, cursor: 0 });
    }

    /// Move the playlist picker cursor by `delta`, wrapping.
    pub fn move_picker(&mut self, delta: isize) {
        let len = self.playlists.len();
        if let Some(Popup::AddToPlaylist { cursor, .. }) = &mut self.popup
            && len > 0
        {
            *cursor = (*cursor as isize + delta).rem_euclid(len as isize) as usize;
        }
    }

    /// Name of the playlist under the picker cursor and the track to add.
    pub fn picker_choice(&self) -> Option<(String, TrackId)> {
        let Some(Popup::AddToPlaylist { track, cursor }) = &self.popup else {
            return None;
        };
        let playlist = self.playlists.get(*cursor)?;
        Some((playlist.name.clone(), track.clone()))
    }
}
