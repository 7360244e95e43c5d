use std::time::Duration;

use ratatui::layout::Rect;

use crate::audio::{AudioOutput, PlaybackInfo};
use crate::catalog::{Track, display_from_fields};
use crate::config::{TimeField, UiSettings};
use crate::player::{PlaybackStatus, PlayerService, Transport};

/// Format a `Duration` as `MM:SS`.
pub(super) fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format an optional duration, rounding up partial seconds, showing total seconds.
pub(super) fn format_duration_mmss_ceil(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return "-".to_string();
    };

    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs = total_secs.saturating_add(1);
    }

    format!("{}:{:02} ({}s)", total_secs / 60, total_secs % 60, total_secs)
}

/// Build the "now playing" track text according to `ui` settings.
pub(super) fn now_playing_track_text(track: &Track, ui: &UiSettings) -> String {
    display_from_fields(
        track,
        &ui.now_playing_track_fields,
        &ui.now_playing_track_separator,
    )
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
pub(super) fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .filter_map(|f| match f {
            TimeField::Elapsed => Some(format_mmss(elapsed)),
            TimeField::Total => total.map(format_mmss),
            TimeField::Remaining => {
                total.map(|t| format!("-{}", format_mmss(t.saturating_sub(elapsed))))
            }
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join(&ui.now_playing_time_separator))
}

/// Position of the current track, as far as the output knows it.
///
/// The output snapshot only counts when it describes the current track's
/// source; otherwise the track has not started yet.
pub(super) struct Progress {
    pub elapsed: Duration,
    pub total: Option<Duration>,
}

impl Progress {
    pub fn of<O: AudioOutput>(player: &PlayerService<O>) -> Self {
        let Some(track) = player.transport().current_track() else {
            return Self {
                elapsed: Duration::ZERO,
                total: None,
            };
        };
        let info: PlaybackInfo = player.position();
        if info.source.as_deref() == Some(track.audio_url.as_str()) {
            Self {
                elapsed: info.elapsed,
                total: info.duration.or(track.duration),
            }
        } else {
            Self {
                elapsed: Duration::ZERO,
                total: track.duration,
            }
        }
    }

    pub fn ratio(&self) -> f64 {
        PlaybackInfo {
            elapsed: self.elapsed,
            duration: self.total,
            ..PlaybackInfo::default()
        }
        .progress()
        .unwrap_or(0.0)
    }
}

pub(super) fn status_label(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => "Playing",
        PlaybackStatus::Paused => "Paused",
        PlaybackStatus::Stopped => "Stopped",
    }
}

/// "shuffle on • repeat all" style summary of the transport flags.
pub(super) fn flags_text(transport: &Transport) -> String {
    format!(
        "shuffle {} • repeat {}",
        if transport.is_shuffling() { "on" } else { "off" },
        transport.repeat_mode().label()
    )
}

pub(super) fn volume_text(info: &PlaybackInfo) -> String {
    if info.muted {
        "muted".to_string()
    } else {
        format!("vol {:.0}%", info.volume * 100.0)
    }
}

pub(super) fn favorite_mark(favorite: Option<bool>) -> &'static str {
    match favorite {
        Some(true) => "♥",
        Some(false) => "♡",
        None => "·",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
pub(super) fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}
