use crate::catalog::AlbumKey;
use crate::config::RouteKind;

/// A browsable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Every scanned track.
    Library,
    Albums,
    Album(AlbumKey),
    Playlists,
    Playlist(String),
    Favorites,
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Self::Library => RouteKind::Library,
            Self::Albums => RouteKind::Albums,
            Self::Album(_) => RouteKind::Album,
            Self::Playlists => RouteKind::Playlists,
            Self::Playlist(_) => RouteKind::Playlist,
            Self::Favorites => RouteKind::Favorites,
        }
    }

    /// Whether this page swaps the footer bar for the side panel.
    pub fn shows_side_panel(&self, side_routes: &[RouteKind]) -> bool {
        side_routes.contains(&self.kind())
    }

    pub fn title(&self) -> String {
        match self {
            Self::Library => "Library".to_string(),
            Self::Albums => "Albums".to_string(),
            Self::Album(key) => format!("Album: {key}"),
            Self::Playlists => "Playlists".to_string(),
            Self::Playlist(name) => format!("Playlist: {name}"),
            Self::Favorites => "Favorites".to_string(),
        }
    }
}
