use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{Popup, Route};
use crate::audio::AudioOutput;
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::ui;

use super::session::Session;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: handles input, UI drawing, engine events and
/// MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run<O: AudioOutput>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    session: &mut Session<O>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<()> {
    loop {
        session.sync(&settings.ui);
        session.sync_mpris(mpris);

        terminal.draw(|f| {
            ui::draw(
                f,
                &ui::Screen {
                    app: &session.app,
                    player: &session.player,
                    footer: &session.footer,
                    side_panel: session.side_panel.as_ref(),
                    ui: &settings.ui,
                    controls: &settings.controls,
                },
            )
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, session) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, session, state) {
                    return Ok(());
                }
            }
        }
    }
}

/// Apply a desktop media-control command. Returns true on quit.
pub fn handle_control_cmd<O: AudioOutput>(cmd: ControlCmd, session: &mut Session<O>) -> bool {
    let transport = session.player.transport();
    let has_current = transport.current_track().is_some();
    let playing = transport.is_playing();

    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play if !has_current => session.activate_selection(),
        ControlCmd::Play if !playing => session.player.toggle_play(),
        ControlCmd::Play => {}
        ControlCmd::Pause if playing => session.player.toggle_play(),
        ControlCmd::Pause => {}
        ControlCmd::PlayPause if !has_current => session.activate_selection(),
        ControlCmd::PlayPause => session.player.toggle_play(),
        ControlCmd::Stop => session.player.stop(),
        ControlCmd::Next => session.player.next(),
        ControlCmd::Prev => session.player.previous(),
    }
    false
}

/// Apply one key press. Returns true on quit.
pub fn handle_key_event<O: AudioOutput>(
    key: KeyEvent,
    settings: &config::Settings,
    session: &mut Session<O>,
    state: &mut EventLoopState,
) -> bool {
    session.app.status = None;

    if session.app.filter_mode {
        state.pending_gg = false;
        handle_filter_key(key, session);
        return false;
    }

    if let Some(popup) = session.app.popup.clone() {
        if handle_popup_key(key, popup, session) {
            state.pending_gg = false;
            return false;
        }
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    let app = &mut session.app;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback = false;
            app.select_last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.follow_playback = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.follow_playback = false;
            app.prev();
        }
        KeyCode::Enter => session.activate_selection(),
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            if session.player.transport().current_track().is_none() {
                session.activate_selection();
            } else {
                session.player.toggle_play();
            }
        }
        KeyCode::Char('l') => session.player.next(),
        KeyCode::Char('h') => session.player.previous(),
        KeyCode::Char('L') => session.player.seek_by(scrub_secs(settings)),
        KeyCode::Char('H') => session.player.seek_by(-scrub_secs(settings)),
        KeyCode::Char('s') => session.player.toggle_shuffle(),
        KeyCode::Char('r') => session.player.toggle_repeat(),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            session.player.adjust_volume(settings.controls.volume_step)
        }
        KeyCode::Char('-') => session.player.adjust_volume(-settings.controls.volume_step),
        KeyCode::Char('m') => session.player.toggle_mute(),
        KeyCode::Char('R') => session.player.retry(),
        KeyCode::Char('f') => session.toggle_favorite(),
        KeyCode::Char('x') => session.remove_selected(),
        KeyCode::Char('a') => app.open_add_to_playlist(),
        KeyCode::Char('n') if *app.route() == Route::Playlists => {
            app.popup = Some(Popup::NewPlaylist {
                name: String::new(),
            });
        }
        KeyCode::Char('y') => app.toggle_popup(Popup::Lyrics),
        KeyCode::Char('K') => app.toggle_popup(Popup::Metadata),
        KeyCode::Char('1') => app.switch_to(Route::Library),
        KeyCode::Char('2') => app.switch_to(Route::Albums),
        KeyCode::Char('3') => app.switch_to(Route::Playlists),
        KeyCode::Char('4') => app.switch_to(Route::Favorites),
        KeyCode::Backspace | KeyCode::Esc => {
            if app.popup.is_some() {
                app.close_popup();
            } else if !app.filter_query.is_empty() {
                app.clear_filter();
            } else {
                app.back();
            }
        }
        _ => {}
    }

    false
}

fn scrub_secs(settings: &config::Settings) -> i64 {
    settings.controls.scrub_seconds.min(i64::MAX as u64) as i64
}

fn handle_filter_key<O: AudioOutput>(key: KeyEvent, session: &mut Session<O>) {
    let app = &mut session.app;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Char('j' | 'n') if ctrl => app.next(),
        KeyCode::Char('k' | 'p') if ctrl => app.prev(),
        KeyCode::Down => app.next(),
        KeyCode::Up => app.prev(),
        KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c),
        KeyCode::Enter => {
            if app.display_indices().is_empty() {
                return;
            }
            app.exit_filter_mode();
            session.activate_selection();
        }
        _ => {}
    }
}

/// Keys consumed by modal popups. Returns true when the key was handled.
fn handle_popup_key<O: AudioOutput>(key: KeyEvent, popup: Popup, session: &mut Session<O>) -> bool {
    match popup {
        Popup::AddToPlaylist { .. } => {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => session.app.move_picker(1),
                KeyCode::Char('k') | KeyCode::Up => session.app.move_picker(-1),
                KeyCode::Enter => {
                    if let Some((name, track)) = session.app.picker_choice() {
                        session.add_to_playlist(&name, &track);
                    }
                    session.app.close_popup();
                }
                KeyCode::Esc | KeyCode::Char('q') => session.app.close_popup(),
                _ => {}
            }
            true
        }
        Popup::NewPlaylist { mut name } => {
            match key.code {
                KeyCode::Enter => {
                    session.app.close_popup();
                    session.create_playlist(&name);
                }
                KeyCode::Esc => session.app.close_popup(),
                KeyCode::Backspace => {
                    name.pop();
                    session.app.popup = Some(Popup::NewPlaylist { name });
                }
                KeyCode::Char(c) if !c.is_control() => {
                    name.push(c);
                    session.app.popup = Some(Popup::NewPlaylist { name });
                }
                _ => {}
            }
            true
        }
        // Lyrics and metadata overlays leave the keys to the player.
        Popup::Lyrics | Popup::Metadata => false,
    }
}
