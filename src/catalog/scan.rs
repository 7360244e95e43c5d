use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::display_from_fields;
use super::model::{Track, TrackId};

const COVER_STEMS: [&str; 3] = ["cover", "folder", "front"];
const COVER_EXTS: [&str; 3] = ["jpg", "jpeg", "png"];

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Stable id for a file: its path relative to the library root, `/`-separated.
fn track_id_for(root: &Path, path: &Path) -> TrackId {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    TrackId::new(parts.join("/"))
}

/// Look for a cover image next to the audio file.
fn find_cover(dir: &Path) -> Option<String> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut found: Option<PathBuf> = None;
    for entry in entries.filter_map(Result::ok) {
        let p = entry.path();
        let (Some(stem), Some(ext)) = (
            p.file_stem().and_then(|s| s.to_str()),
            p.extension().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        let stem = stem.to_ascii_lowercase();
        let ext = ext.to_ascii_lowercase();
        if COVER_STEMS.contains(&stem.as_str()) && COVER_EXTS.contains(&ext.as_str()) {
            // Prefer the lexicographically smallest name so results are stable.
            if found.as_ref().is_none_or(|f| p < *f) {
                found = Some(p);
            }
        }
    }
    found.map(|p| p.display().to_string())
}

fn trimmed(v: Option<std::borrow::Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Scan `dir` for audio files and return enriched tracks sorted by display text.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();
    let mut covers: HashMap<PathBuf, Option<String>> = HashMap::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !(path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings))
        {
            continue;
        }

        let default_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        let mut track = Track::new(
            track_id_for(dir, path).as_str(),
            default_name,
            path.display().to_string(),
        );

        match lofty::read_from_path(path) {
            Ok(tagged) => {
                let duration: Duration = tagged.properties().duration();
                if !duration.is_zero() {
                    track.duration = Some(duration);
                }

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = trimmed(tag.title()) {
                        track.name = v;
                    }
                    track.band_name = trimmed(tag.artist());
                    track.album_name = trimmed(tag.album());
                    track.genre = trimmed(tag.genre());
                    track.release_year = tag.year().filter(|y| *y > 0);
                }
            }
            Err(e) => debug!(path = %path.display(), error = %e, "no readable tags"),
        }

        if let Some(parent) = path.parent() {
            track.album_cover_url = covers
                .entry(parent.to_path_buf())
                .or_insert_with(|| find_cover(parent))
                .clone();
        }

        track.display = display_from_fields(
            &track,
            &settings.display_fields,
            &settings.display_separator,
        );
        tracks.push(track);
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    info!(dir = %dir.display(), count = tracks.len(), "library scanned");
    tracks
}
