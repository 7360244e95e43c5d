use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::TrackId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no playlist named {0:?}")]
    UnknownPlaylist(String),
    #[error("a playlist named {0:?} already exists")]
    DuplicatePlaylist(String),
    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub tracks: Vec<TrackId>,
}

/// Remote-style data keyed by user id and track id.
///
/// Implementations must be shareable with the side-query worker thread.
pub trait SideStore: Send + Sync {
    fn is_favorite(&self, user: &str, track: &TrackId) -> Result<bool, StoreError>;
    fn set_favorite(&self, user: &str, track: &TrackId, favorite: bool) -> Result<(), StoreError>;
    fn favorites(&self, user: &str) -> Result<Vec<TrackId>, StoreError>;
    fn lyrics(&self, track: &TrackId) -> Result<Option<String>, StoreError>;
    /// Playlists visible to `user`: their own plus unowned ones.
    fn playlists(&self, user: Option<&str>) -> Result<Vec<Playlist>, StoreError>;
    fn create_playlist(&self, user: Option<&str>, name: &str) -> Result<(), StoreError>;
    fn add_to_playlist(&self, name: &str, track: &TrackId) -> Result<(), StoreError>;
    /// Remove the entry at `position`; out-of-range positions are ignored.
    fn remove_from_playlist(&self, name: &str, position: usize) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreData {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    favorites: BTreeMap<String, Vec<TrackId>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    lyrics: BTreeMap<TrackId, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    playlists: Vec<Playlist>,
}

/// `SideStore` backed by a single TOML file.
///
/// A missing file is an empty store. Every write is flushed to disk before
/// the call returns. Without a path the store lives in memory only.
#[derive(Debug)]
pub struct LocalStore {
    path: Option<PathBuf>,
    data: Mutex<StoreData>,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file missing; starting empty");
                StoreData::default()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        info!(
            path = %path.display(),
            playlists = data.playlists.len(),
            "side store opened"
        );
        Ok(Self {
            path: Some(path),
            data: Mutex::new(data),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(StoreData::default()),
        }
    }

    /// Seed lyrics text for a track. Lyrics are otherwise edited by hand in
    /// the store file.
    #[cfg(test)]
    pub fn set_lyrics(&self, track: &TrackId, text: impl Into<String>) -> Result<(), StoreError> {
        let text = text.into();
        self.update(|data| {
            data.lyrics.insert(track.clone(), text);
            Ok(true)
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreData>, StoreError> {
        self.data.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Apply `edit` to a copy of the data and keep it only once it is on
    /// disk. `edit` returns whether anything changed.
    fn update(
        &self,
        edit: impl FnOnce(&mut StoreData) -> Result<bool, StoreError>,
    ) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        let mut next = data.clone();
        if !edit(&mut next)? {
            return Ok(());
        }
        self.persist(&next)?;
        *data = next;
        Ok(())
    }

    fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = toml::to_string_pretty(data)?;
        write_file(path, &text)
    }
}

fn write_file(path: &Path, text: &str) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, text).map_err(write_err)
}

fn find_playlist<'a>(data: &'a mut StoreData, name: &str) -> Result<&'a mut Playlist, StoreError> {
    data.playlists
        .iter_mut()
        .find(|p| p.name == name)
        .ok_or_else(|| StoreError::UnknownPlaylist(name.to_string()))
}

impl SideStore for LocalStore {
    fn is_favorite(&self, user: &str, track: &TrackId) -> Result<bool, StoreError> {
        let data = self.lock()?;
        Ok(data
            .favorites
            .get(user)
            .is_some_and(|ids| ids.contains(track)))
    }

    fn set_favorite(&self, user: &str, track: &TrackId, favorite: bool) -> Result<(), StoreError> {
        self.update(|data| {
            let ids = data.favorites.entry(user.to_string()).or_default();
            match (favorite, ids.contains(track)) {
                (true, false) => ids.push(track.clone()),
                (false, true) => ids.retain(|id| id != track),
                _ => return Ok(false),
            }
            Ok(true)
        })
    }

    fn favorites(&self, user: &str) -> Result<Vec<TrackId>, StoreError> {
        let data = self.lock()?;
        Ok(data.favorites.get(user).cloned().unwrap_or_default())
    }

    fn lyrics(&self, track: &TrackId) -> Result<Option<String>, StoreError> {
        let data = self.lock()?;
        Ok(data.lyrics.get(track).cloned())
    }

    fn playlists(&self, user: Option<&str>) -> Result<Vec<Playlist>, StoreError> {
        let data = self.lock()?;
        Ok(data
            .playlists
            .iter()
            .filter(|p| p.owner.is_none() || p.owner.as_deref() == user)
            .cloned()
            .collect())
    }

    fn create_playlist(&self, user: Option<&str>, name: &str) -> Result<(), StoreError> {
        self.update(|data| {
            if data.playlists.iter().any(|p| p.name == name) {
                return Err(StoreError::DuplicatePlaylist(name.to_string()));
            }
            data.playlists.push(Playlist {
                name: name.to_string(),
                owner: user.map(str::to_string),
                tracks: Vec::new(),
            });
            Ok(true)
        })
    }

    fn add_to_playlist(&self, name: &str, track: &TrackId) -> Result<(), StoreError> {
        self.update(|data| {
            find_playlist(data, name)?.tracks.push(track.clone());
            Ok(true)
        })
    }

    fn remove_from_playlist(&self, name: &str, position: usize) -> Result<(), StoreError> {
        self.update(|data| {
            let playlist = find_playlist(data, name)?;
            if position >= playlist.tracks.len() {
                return Ok(false);
            }
            playlist.tracks.remove(position);
            Ok(true)
        })
    }
}
