use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::catalog::{Catalog, scan};
use crate::config::Settings;
use crate::extras::{LocalStore, SideStore};
use crate::mpris::ControlCmd;
use crate::player::{PlayerService, Transport};

mod event_loop;
mod logging;
mod session;
mod settings;

pub use session::Session;

pub fn run() -> Result<()> {
    let (settings, settings_warning) = settings::load_settings();
    let log_file = logging::init(&settings.logging, settings.log_path());
    info!(log_file = ?log_file, "cadenza starting");
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    let dir = library_root(&settings);
    let tracks = scan(&dir, &settings.library);
    let store = open_store(&settings);
    let user = settings.user.id.clone();
    let app = initial_app(Catalog::new(tracks), store.as_ref(), user.as_deref());

    // The one audio output of the process; the player service owns it.
    let audio_player = AudioPlayer::new(settings.audio.clone());
    let transport = Transport::new().with_modes(
        settings.playback.shuffle,
        settings.playback.repeat_mode.into(),
    );
    let player = PlayerService::new(transport, audio_player, settings.playback.skip_on_error);
    let mut session = Session::new(app, player, store, user);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut session,
        &mpris,
        &control_rx,
        &mut state,
    );

    session
        .player
        .output()
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        warn!(error = %e, "event loop failed");
    }
    info!("cadenza stopped");
    run_result
}

/// First CLI argument, then `library.root`, then the working directory.
fn library_root(settings: &Settings) -> PathBuf {
    env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"))
}

/// Open the side-data store; an unusable store degrades to an in-memory one.
fn open_store(settings: &Settings) -> Arc<dyn SideStore> {
    let Some(path) = settings.store_path() else {
        warn!("no data directory; favorites and playlists will not persist");
        return Arc::new(LocalStore::in_memory());
    };
    match LocalStore::open(&path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "side store unavailable; using an empty in-memory store");
            Arc::new(LocalStore::in_memory())
        }
    }
}

/// Build the browsing model with the user's favorites and playlists.
pub fn initial_app(catalog: Catalog, store: &dyn SideStore, user: Option<&str>) -> App {
    let favorites = match user {
        Some(user) => store.favorites(user).unwrap_or_else(|e| {
            warn!(error = %e, "loading favorites failed");
            Vec::new()
        }),
        None => Vec::new(),
    };
    let playlists = store.playlists(user).unwrap_or_else(|e| {
        warn!(error = %e, "loading playlists failed");
        Vec::new()
    });
    App::new(catalog, favorites, playlists)
}

#[cfg(test)]
mod tests;
