use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Gauge, Padding, Paragraph},
};

use crate::audio::AudioOutput;
use crate::config::UiSettings;
use crate::extras::{AdapterId, TrackExtras};
use crate::player::PlayerService;

use super::PlayerAdapter;
use super::format::{
    Progress, favorite_mark, flags_text, now_playing_time_text, now_playing_track_text,
    status_label, volume_text,
};

/// Compact now-playing bar at the bottom of the screen.
///
/// Created once at startup and kept for the whole session, including while
/// a side-panel page hides it.
pub struct FooterBar {
    extras: TrackExtras,
}

impl FooterBar {
    pub const HEIGHT: u16 = 5;

    pub fn new() -> Self {
        Self {
            extras: TrackExtras::new(AdapterId::Footer),
        }
    }

    pub fn render<O: AudioOutput>(
        &self,
        frame: &mut Frame,
        area: Rect,
        player: &PlayerService<O>,
        ui: &UiSettings,
    ) {
        let block = Block::bordered()
            .padding(Padding {
                left: 1,
                right: 1,
                top: 0,
                bottom: 0,
            })
            .title(" now playing ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let transport = player.transport();
        let info = player.position();

        let Some(track) = transport.current_track() else {
            frame.render_widget(
                Paragraph::new("Nothing playing. Press enter on a track to start."),
                rows[0],
            );
            frame.render_widget(
                Paragraph::new(format!("{} • {}", flags_text(transport), volume_text(&info))),
                rows[2],
            );
            return;
        };

        let mut title = vec![
            Span::styled(
                format!("{} ", status_label(transport.status())),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(now_playing_track_text(track, ui)),
        ];
        if let Some(year) = track.release_year {
            title.push(Span::raw(format!(" ({year})")));
        }
        title.push(Span::raw(format!(" {}", favorite_mark(self.extras.favorite()))));
        frame.render_widget(Paragraph::new(Line::from(title)), rows[0]);

        let progress = Progress::of(player);
        let label = now_playing_time_text(progress.elapsed, progress.total, ui).unwrap_or_default();
        frame.render_widget(Gauge::default().ratio(progress.ratio()).label(label), rows[1]);

        let last = match player.last_failure() {
            Some(failure) if failure.track_id == track.id => {
                Line::from(format!("failed to load: {} • [R] retry", failure.reason)).red()
            }
            _ => Line::from(format!("{} • {}", flags_text(transport), volume_text(&info))),
        };
        frame.render_widget(Paragraph::new(last), rows[2]);
    }
}

impl Default for FooterBar {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerAdapter for FooterBar {
    fn extras(&self) -> &TrackExtras {
        &self.extras
    }

    fn extras_mut(&mut self) -> &mut TrackExtras {
        &mut self.extras
    }
}
