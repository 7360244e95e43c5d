use super::*;
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    let mut track = Track::new("test.mp3", "Test Title", "/tmp/music/test.mp3");
    track.band_name = Some("Test Band".to_string());
    track.album_name = Some("Test Album".to_string());
    track.duration = Some(Duration::from_micros(1_234_567));
    track
}

fn handle_with_state() -> (MprisHandle, Arc<Mutex<SharedState>>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    (
        MprisHandle {
            state: state.clone(),
        },
        state,
    )
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, state) = handle_with_state();

    let track = make_track();
    handle.set_track_metadata(Some(&track));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist, vec!["Test Band".to_string()]);
        assert_eq!(s.album.as_deref(), Some("Test Album"));
        assert_eq!(s.url.as_deref(), Some("file:///tmp/music/test.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_deref(),
            Some("/org/mpris/MediaPlayer2/track/test_2emp3")
        );
    }

    handle.set_track_metadata(None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert!(s.artist.is_empty());
        assert_eq!(s.album, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn track_object_path_is_derived_from_the_track_id() {
    let path = track_object_path(&TrackId::from("Band/01 Intro.flac"));
    assert_eq!(path, "/org/mpris/MediaPlayer2/track/Band_2f01_20Intro_2eflac");
    assert!(ObjectPath::try_from(path.as_str()).is_ok());

    // Distinct ids stay distinct even when they only differ in escaped bytes.
    assert_ne!(
        track_object_path(&TrackId::from("a_b")),
        track_object_path(&TrackId::from("a.b"))
    );
    assert!(ObjectPath::try_from(track_object_path(&TrackId::from("")).as_str()).is_ok());
}

#[test]
fn url_is_kept_when_it_already_has_a_scheme() {
    assert_eq!(track_url("file:///a/b.mp3"), "file:///a/b.mp3");
    assert_eq!(track_url("relative/b.mp3"), "relative/b.mp3");
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let (handle, state) = handle_with_state();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    assert_eq!(iface.playback_status(), "Stopped");
    handle.set_playback(PlaybackStatus::Playing);
    assert_eq!(iface.playback_status(), "Playing");
    handle.set_playback(PlaybackStatus::Paused);
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, state) = handle_with_state();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    handle.set_track_metadata(Some(&make_track()));

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "xesam:url",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn metadata_without_track_has_only_a_title() {
    let (_handle, state) = handle_with_state();
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    let map = iface.metadata();
    assert_eq!(map.len(), 1);
    assert!(map.contains_key("xesam:title"));
}

#[test]
fn method_calls_forward_control_commands() {
    let (_handle, state) = handle_with_state();
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx: tx.clone(), state };
    let root = RootIface { tx };

    iface.play_pause();
    iface.next();
    iface.previous();
    root.quit();

    let got: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::PlayPause,
            ControlCmd::Next,
            ControlCmd::Prev,
            ControlCmd::Quit
        ]
    );
}
