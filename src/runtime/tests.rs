use std::cell::RefCell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::event_loop::{EventLoopState, handle_control_cmd, handle_key_event};
use super::*;
use crate::app::{Popup, Route};
use crate::audio::{AudioCmd, AudioEvent, AudioOutput, PlaybackInfo};
use crate::catalog::{Track, TrackId};
use crate::player::{PlaybackStatus, RepeatMode};
use crate::ui::PlayerAdapter;

#[derive(Default)]
struct FakeOutput {
    sent: RefCell<Vec<AudioCmd>>,
}

impl AudioOutput for FakeOutput {
    fn send(&self, cmd: AudioCmd) {
        self.sent.borrow_mut().push(cmd);
    }

    fn info(&self) -> PlaybackInfo {
        PlaybackInfo::default()
    }

    fn poll_event(&self) -> Option<AudioEvent> {
        None
    }
}

fn t(id: &str, band: &str, album: &str) -> Track {
    let mut track = Track::new(id, format!("{band} - {id}"), format!("/m/{id}.mp3"));
    track.band_name = Some(band.into());
    track.album_name = Some(album.into());
    track
}

fn session_with(store: Arc<LocalStore>, user: Option<&str>) -> Session<FakeOutput> {
    let catalog = Catalog::new(vec![
        t("a", "Tool", "Lateralus"),
        t("b", "Tool", "Lateralus"),
        t("c", "Opeth", "Damnation"),
    ]);
    let app = initial_app(catalog, store.as_ref(), user);
    let transport =
        Transport::with_rng(StdRng::seed_from_u64(3)).with_modes(false, RepeatMode::None);
    let player = PlayerService::new(transport, FakeOutput::default(), true);
    Session::new(app, player, store, user.map(str::to_string))
}

fn session() -> Session<FakeOutput> {
    session_with(Arc::new(LocalStore::in_memory()), Some("me"))
}

fn press(
    session: &mut Session<FakeOutput>,
    state: &mut EventLoopState,
    settings: &Settings,
    code: KeyCode,
) -> bool {
    handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), settings, session, state)
}

fn type_text(
    session: &mut Session<FakeOutput>,
    state: &mut EventLoopState,
    settings: &Settings,
    text: &str,
) {
    for c in text.chars() {
        press(session, state, settings, KeyCode::Char(c));
    }
}

fn current_id(session: &Session<FakeOutput>) -> Option<String> {
    session
        .player
        .transport()
        .current_track()
        .map(|t| t.id.as_str().to_string())
}

/// Sync until `done` holds; side queries are answered on another thread.
fn sync_until(
    session: &mut Session<FakeOutput>,
    settings: &Settings,
    done: impl Fn(&Session<FakeOutput>) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(&*session) && Instant::now() < deadline {
        session.sync(&settings.ui);
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn enter_plays_the_selected_row_with_the_page_as_queue() {
    let settings = Settings::default();
    let mut session = session();
    let mut state = EventLoopState::default();

    press(&mut session, &mut state, &settings, KeyCode::Char('j'));
    press(&mut session, &mut state, &settings, KeyCode::Enter);

    assert_eq!(current_id(&session).as_deref(), Some("b"));
    assert_eq!(session.player.transport().queue().len(), 3);
    assert!(
        session
            .player
            .output()
            .sent
            .borrow()
            .contains(&AudioCmd::Load {
                source: "/m/b.mp3".into(),
                autoplay: true,
            })
    );
}

#[test]
fn gg_and_shift_g_jump_to_the_ends() {
    let settings = Settings::default();
    let mut session = session();
    let mut state = EventLoopState::default();

    press(&mut session, &mut state, &settings, KeyCode::Char('G'));
    assert_eq!(session.app.selected, 2);

    press(&mut session, &mut state, &settings, KeyCode::Char('g'));
    assert!(state.pending_gg);
    assert_eq!(session.app.selected, 2);
    press(&mut session, &mut state, &settings, KeyCode::Char('g'));
    assert_eq!(session.app.selected, 0);
    assert!(!state.pending_gg);
}

#[test]
fn side_panel_mounts_on_configured_routes_only() {
    let settings = Settings::default();
    let mut session = session();
    let mut state = EventLoopState::default();

    session.sync(&settings.ui);
    assert!(session.side_panel.is_none());

    press(&mut session, &mut state, &settings, KeyCode::Char('4'));
    session.sync(&settings.ui);
    assert!(session.side_panel.is_some());

    press(&mut session, &mut state, &settings, KeyCode::Char('1'));
    session.sync(&settings.ui);
    assert!(session.side_panel.is_none());
}

#[test]
fn control_commands_drive_the_shared_player() {
    let mut session = session();

    // Nothing loaded yet: play-pause starts the selection.
    assert!(!handle_control_cmd(ControlCmd::PlayPause, &mut session));
    assert_eq!(current_id(&session).as_deref(), Some("a"));
    assert_eq!(session.player.transport().status(), PlaybackStatus::Playing);

    handle_control_cmd(ControlCmd::Play, &mut session);
    assert!(session.player.transport().is_playing());
    handle_control_cmd(ControlCmd::Pause, &mut session);
    assert_eq!(session.player.transport().status(), PlaybackStatus::Paused);
    handle_control_cmd(ControlCmd::Pause, &mut session);
    assert_eq!(session.player.transport().status(), PlaybackStatus::Paused);

    handle_control_cmd(ControlCmd::Next, &mut session);
    assert_eq!(current_id(&session).as_deref(), Some("b"));
    handle_control_cmd(ControlCmd::Prev, &mut session);
    assert_eq!(current_id(&session).as_deref(), Some("a"));

    assert!(handle_control_cmd(ControlCmd::Quit, &mut session));
}

#[test]
fn quit_key_ends_the_loop_but_not_inside_the_filter() {
    let settings = Settings::default();
    let mut session = session();
    let mut state = EventLoopState::default();

    press(&mut session, &mut state, &settings, KeyCode::Char('/'));
    assert!(!press(&mut session, &mut state, &settings, KeyCode::Char('q')));
    assert_eq!(session.app.filter_query, "q");

    press(&mut session, &mut state, &settings, KeyCode::Esc);
    assert!(press(&mut session, &mut state, &settings, KeyCode::Char('q')));
}

#[test]
fn new_playlist_popup_creates_and_lists_the_playlist() {
    let settings = Settings::default();
    let store = Arc::new(LocalStore::in_memory());
    let mut session = session_with(store.clone(), Some("me"));
    let mut state = EventLoopState::default();

    press(&mut session, &mut state, &settings, KeyCode::Char('3'));
    press(&mut session, &mut state, &settings, KeyCode::Char('n'));
    assert!(matches!(session.app.popup, Some(Popup::NewPlaylist { .. })));
    type_text(&mut session, &mut state, &settings, "Nightt");
    press(&mut session, &mut state, &settings, KeyCode::Backspace);
    press(&mut session, &mut state, &settings, KeyCode::Enter);

    assert!(session.app.popup.is_none());
    assert_eq!(session.app.row_labels(), vec!["Night [0]"]);
    let stored = store.playlists(Some("me")).unwrap();
    assert_eq!(stored[0].owner.as_deref(), Some("me"));
}

#[test]
fn adding_and_removing_playlist_entries_goes_through_the_store() {
    let settings = Settings::default();
    let store = Arc::new(LocalStore::in_memory());
    store.create_playlist(Some("me"), "Mix").unwrap();
    let mut session = session_with(store.clone(), Some("me"));
    let mut state = EventLoopState::default();

    press(&mut session, &mut state, &settings, KeyCode::Char('G'));
    press(&mut session, &mut state, &settings, KeyCode::Char('a'));
    press(&mut session, &mut state, &settings, KeyCode::Enter);
    assert_eq!(session.app.status.as_deref(), Some("added to Mix"));
    assert_eq!(store.playlists(Some("me")).unwrap()[0].tracks, vec![TrackId::from("c")]);

    press(&mut session, &mut state, &settings, KeyCode::Char('3'));
    press(&mut session, &mut state, &settings, KeyCode::Enter);
    assert_eq!(session.app.route(), &Route::Playlist("Mix".into()));
    press(&mut session, &mut state, &settings, KeyCode::Char('x'));
    assert!(store.playlists(Some("me")).unwrap()[0].tracks.is_empty());
    assert!(session.app.visible_tracks().is_empty());
}

#[test]
fn favorite_toggle_round_trips_through_the_worker() {
    let settings = Settings::default();
    let store = Arc::new(LocalStore::in_memory());
    let mut session = session_with(store.clone(), Some("me"));
    let mut state = EventLoopState::default();

    press(&mut session, &mut state, &settings, KeyCode::Enter);
    sync_until(&mut session, &settings, |s| s.footer.extras().favorite().is_some());
    assert_eq!(session.footer.extras().favorite(), Some(false));

    press(&mut session, &mut state, &settings, KeyCode::Char('f'));
    sync_until(&mut session, &settings, |s| s.footer.extras().favorite() == Some(true));
    assert_eq!(session.footer.extras().favorite(), Some(true));
    assert!(session.app.is_favorite(&TrackId::from("a")));
    assert!(store.is_favorite("me", &TrackId::from("a")).unwrap());
}

#[test]
fn favorite_without_user_only_reports_status() {
    let settings = Settings::default();
    let mut session = session_with(Arc::new(LocalStore::in_memory()), None);
    let mut state = EventLoopState::default();

    press(&mut session, &mut state, &settings, KeyCode::Enter);
    press(&mut session, &mut state, &settings, KeyCode::Char('f'));
    assert!(session.app.status.is_some());
}
