use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Stylize,
    text::Line,
    widgets::{Block, Gauge, Padding, Paragraph, Wrap},
};
use tracing::debug;

use crate::app::Route;
use crate::audio::AudioOutput;
use crate::catalog::Track;
use crate::config::UiSettings;
use crate::extras::{AdapterId, TrackExtras};
use crate::player::PlayerService;

use super::PlayerAdapter;
use super::format::{
    Progress, favorite_mark, flags_text, format_duration_mmss_ceil, now_playing_time_text,
    status_label, volume_text,
};

/// Full now-playing panel shown beside album, playlist and favorites pages.
///
/// Lives only while such a page is open: the runtime creates it when the
/// route starts showing it and drops it when the route stops. A fresh panel
/// has no side data, so it fetches again on mount.
pub struct SidePanel {
    extras: TrackExtras,
}

impl SidePanel {
    pub fn mount() -> Self {
        debug!("side panel mounted");
        Self {
            extras: TrackExtras::new(AdapterId::SidePanel),
        }
    }

    pub fn render<O: AudioOutput>(
        &self,
        frame: &mut Frame,
        area: Rect,
        player: &PlayerService<O>,
        route: &Route,
        page_tracks: usize,
        ui: &UiSettings,
    ) {
        let block = Block::bordered()
            .padding(Padding {
                left: 1,
                right: 1,
                top: 0,
                bottom: 0,
            })
            .title(" player ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let transport = player.transport();
        let Some(track) = transport.current_track() else {
            let text = vec![
                Line::from("Nothing playing.").bold(),
                Line::from(""),
                Line::from(route.title()),
                Line::from(format!("{page_tracks} tracks • enter plays from here")),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
            return;
        };

        let [details, gauge, footer] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(self.detail_lines(track)).wrap(Wrap { trim: true }),
            details,
        );

        let progress = Progress::of(player);
        let label = now_playing_time_text(progress.elapsed, progress.total, ui).unwrap_or_default();
        frame.render_widget(Gauge::default().ratio(progress.ratio()).label(label), gauge);

        let info = player.position();
        let mut lines = vec![
            Line::from(status_label(transport.status())).bold(),
            Line::from(format!("{} • {}", flags_text(transport), volume_text(&info))),
        ];
        if let Some(failure) = player.last_failure().filter(|f| f.track_id == track.id) {
            lines.push(Line::from(format!("failed: {} • [R] retry", failure.reason)).red());
        }
        frame.render_widget(Paragraph::new(lines), footer);
    }

    fn detail_lines(&self, track: &Track) -> Vec<Line<'static>> {
        let field = |label: &str, value: Option<String>| {
            Line::from(format!("{label}: {}", value.unwrap_or_else(|| "-".to_string())))
        };
        vec![
            Line::from(format!("{} {}", track.name, favorite_mark(self.extras.favorite()))).bold(),
            field("Band", track.band_name.clone()),
            field("Album", track.album_name.clone()),
            field("Genre", track.genre.clone()),
            field("Year", track.release_year.map(|y| y.to_string())),
            Line::from(format!("Duration: {}", format_duration_mmss_ceil(track.duration))),
            field("Cover", track.album_cover_url.clone()),
        ]
    }
}

impl PlayerAdapter for SidePanel {
    fn extras(&self) -> &TrackExtras {
        &self.extras
    }

    fn extras_mut(&mut self) -> &mut TrackExtras {
        &mut self.extras
    }
}
