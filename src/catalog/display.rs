use std::path::Path;

use crate::config::TrackDisplayField;

use super::model::Track;

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Build a display string for `track` from the configured `fields` and separator.
///
/// Fields are composed in the configured order; empty values are skipped and
/// the track name is used when nothing was produced.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Display => {
                // "display" inside the list means the default "band - name".
                if let Some(b) = non_empty(track.band_name.as_deref()) {
                    parts.push(b.to_string());
                }
                if let Some(n) = non_empty(Some(&track.name)) {
                    parts.push(n.to_string());
                }
            }
            TrackDisplayField::Name => {
                if let Some(n) = non_empty(Some(&track.name)) {
                    parts.push(n.to_string());
                }
            }
            TrackDisplayField::Band => {
                if let Some(b) = non_empty(track.band_name.as_deref()) {
                    parts.push(b.to_string());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = non_empty(track.album_name.as_deref()) {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Genre => {
                if let Some(g) = non_empty(track.genre.as_deref()) {
                    parts.push(g.to_string());
                }
            }
            TrackDisplayField::Year => {
                if let Some(y) = track.release_year {
                    parts.push(y.to_string());
                }
            }
            TrackDisplayField::Filename => {
                let stem = Path::new(&track.audio_url)
                    .file_stem()
                    .and_then(|s| s.to_str());
                if let Some(stem) = stem.filter(|s| !s.trim().is_empty()) {
                    parts.push(stem.to_string());
                }
            }
            TrackDisplayField::Path => {
                parts.push(track.audio_url.clone());
            }
        }
    }

    if parts.is_empty() {
        track.name.clone()
    } else {
        parts.join(sep)
    }
}
