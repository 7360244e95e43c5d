use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::model::{Track, TrackId};

/// Albums are keyed by (band, album name); tracks without an album tag are
/// left out of the album view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlbumKey {
    pub band: String,
    pub name: String,
}

impl fmt::Display for AlbumKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.band.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} - {}", self.band, self.name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Album {
    pub key: AlbumKey,
    pub name: String,
    pub band_name: Option<String>,
    pub release_year: Option<u32>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
    pub track_ids: Vec<TrackId>,
}

/// The scanned library: all tracks plus the album grouping used for browsing.
#[derive(Debug, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
    by_id: HashMap<TrackId, usize>,
    albums: Vec<Album>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        let by_id = tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        let mut grouped: BTreeMap<AlbumKey, Vec<&Track>> = BTreeMap::new();
        for t in &tracks {
            let Some(name) = t.album_name.as_deref() else {
                continue;
            };
            let key = AlbumKey {
                band: t.band_name.clone().unwrap_or_default(),
                name: name.to_string(),
            };
            grouped.entry(key).or_default().push(t);
        }

        let albums = grouped
            .into_iter()
            .map(|(key, mut members)| {
                members.sort_by(|a, b| a.audio_url.cmp(&b.audio_url));
                let first = members[0];
                Album {
                    name: key.name.clone(),
                    band_name: first.band_name.clone(),
                    release_year: members.iter().find_map(|t| t.release_year),
                    genre: members.iter().find_map(|t| t.genre.clone()),
                    cover_url: members.iter().find_map(|t| t.album_cover_url.clone()),
                    track_ids: members.iter().map(|t| t.id.clone()).collect(),
                    key,
                }
            })
            .collect();

        Self {
            tracks,
            by_id,
            albums,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.by_id.get(id).map(|&i| &self.tracks[i])
    }

    pub fn album(&self, key: &AlbumKey) -> Option<&Album> {
        self.albums.iter().find(|a| &a.key == key)
    }

    /// Resolve `ids` in order; unknown ids are skipped.
    pub fn tracks_for<'a>(&self, ids: impl IntoIterator<Item = &'a TrackId>) -> Vec<&Track> {
        ids.into_iter().filter_map(|id| self.track(id)).collect()
    }
}
