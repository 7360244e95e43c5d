//! UI rendering for the terminal user interface.
//!
//! The page list fills the screen. Below it sits either the footer bar or,
//! on side-panel routes, the side panel beside the list. Both adapters read
//! the one `PlayerService`; neither owns playback state.

mod browser;
mod footer;
mod format;
mod popups;
mod side_panel;

use std::{collections::BTreeMap, sync::LazyLock};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::AudioOutput;
use crate::config::{ControlsSettings, UiSettings};
use crate::extras::{SideRequester, TrackExtras};
use crate::player::PlayerService;

pub use footer::FooterBar;
pub use side_panel::SidePanel;

/// A presentation adapter over the shared player.
///
/// Adapters keep only their own side data (favorite flag, lyrics) for the
/// current track and refresh it independently of each other.
pub trait PlayerAdapter {
    fn extras(&self) -> &TrackExtras;
    fn extras_mut(&mut self) -> &mut TrackExtras;

    /// Re-key side data on the player's current track. Returns whether the
    /// track changed.
    fn follow<O: AudioOutput>(
        &mut self,
        player: &PlayerService<O>,
        queries: &impl SideRequester,
    ) -> bool {
        let current = player.transport().current_track().map(|t| &t.id);
        self.extras_mut().follow(current, queries)
    }
}

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("j/k", "up/down"),
        ("gg/G", "top/bottom"),
        ("enter", "open/play"),
        ("space/p", "play/pause"),
        ("h/l", "prev/next song"),
        // H/L is filled dynamically from config.
        ("/", "filter"),
        ("s", "shuffle"),
        ("r", "repeat"),
        ("+/-", "volume"),
        ("m", "mute"),
        ("f", "favorite"),
        ("a", "add to playlist"),
        ("y", "lyrics"),
        ("K", "metadata"),
        ("1-4", "library/albums/playlists/favorites"),
        ("esc", "back"),
        ("q", "quit"),
    ])
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "gg/G", "s", "r", "+/-", "m", "f", "a", "y",
        "K", "/", "1-4", "esc", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{scrub_seconds}s"))
            } else {
                CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Everything one frame needs.
pub struct Screen<'a, O: AudioOutput> {
    pub app: &'a App,
    pub player: &'a PlayerService<O>,
    pub footer: &'a FooterBar,
    /// Present exactly while the route shows the side panel.
    pub side_panel: Option<&'a SidePanel>,
    pub ui: &'a UiSettings,
    pub controls: &'a ControlsSettings,
}

/// Render the entire UI into the provided `frame`.
pub fn draw<O: AudioOutput>(frame: &mut Frame, screen: &Screen<'_, O>) {
    let app = screen.app;
    let bottom_height = if screen.side_panel.is_some() {
        0
    } else {
        FooterBar::HEIGHT
    };
    let [header, body, bottom, controls] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(bottom_height),
        Constraint::Length(4),
    ])
    .areas(frame.area());

    // Header
    let mut header_text = screen.ui.header_text.clone();
    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        header_text.push_str(&format!(" • filter: {q}"));
    }
    if let Some(status) = &app.status {
        header_text.push_str(&format!(" • {status}"));
    }
    let header_par = Paragraph::new(header_text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header_par, header);

    // Body: list, plus the side panel when mounted.
    let (list_area, visible_extras) = match screen.side_panel {
        Some(panel) => {
            let percent = screen.ui.side_panel_percent;
            let [list_area, panel_area] = Layout::horizontal([
                Constraint::Percentage(100u16.saturating_sub(percent)),
                Constraint::Percentage(percent),
            ])
            .areas(body);
            panel.render(
                frame,
                panel_area,
                screen.player,
                app.route(),
                app.route_tracks().len(),
                screen.ui,
            );
            (list_area, panel.extras())
        }
        None => {
            screen.footer.render(frame, bottom, screen.player, screen.ui);
            (body, screen.footer.extras())
        }
    };
    browser::render_rows(frame, list_area, app);
    popups::render_popup(
        frame,
        body,
        app,
        screen.player.transport().current_track(),
        visible_extras,
    );

    let help = Paragraph::new(controls_text(screen.controls.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(help, controls);
}

#[cfg(test)]
mod tests;
