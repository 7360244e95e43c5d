use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Opaque unique key of a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A playable song and its denormalized display metadata.
///
/// Two tracks are equal when their ids are equal; the metadata is display
/// data only.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    /// `file://` URL or plain filesystem path handed to the audio engine.
    pub audio_url: String,
    pub album_cover_url: Option<String>,
    pub band_name: Option<String>,
    pub album_name: Option<String>,
    pub release_year: Option<u32>,
    pub genre: Option<String>,
    /// Unknown until the tags or the decoder report it.
    pub duration: Option<Duration>,
    pub display: String,
}

impl Track {
    /// Build a bare track; enrichment fields start empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: TrackId::new(id),
            display: name.clone(),
            name,
            audio_url: audio_url.into(),
            album_cover_url: None,
            band_name: None,
            album_name: None,
            release_year: None,
            genre: None,
            duration: None,
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
