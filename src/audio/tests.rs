use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::thread::Engine;
use super::*;

fn engine_without_device() -> (Engine, mpsc::Receiver<AudioEvent>, PlaybackHandle) {
    let (tx, rx) = mpsc::channel();
    let info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));
    (Engine::new(None, tx, info.clone(), 0.8), rx, info)
}

#[test]
fn resolve_source_accepts_plain_paths_and_file_urls() {
    assert_eq!(
        resolve_source("/music/a.mp3").unwrap(),
        PathBuf::from("/music/a.mp3")
    );
    assert_eq!(
        resolve_source("file:///music/a%20b.mp3").unwrap(),
        PathBuf::from("/music/a b.mp3")
    );
    assert_eq!(
        resolve_source("relative/a.mp3").unwrap(),
        PathBuf::from("relative/a.mp3")
    );
}

#[test]
fn resolve_source_rejects_remote_and_empty_sources() {
    assert!(matches!(
        resolve_source("https://cdn.example.com/a.mp3"),
        Err(AudioError::UnsupportedSource(_))
    ));
    assert!(matches!(resolve_source("  "), Err(AudioError::UnsupportedSource(_))));
}

#[test]
fn load_without_device_reports_failure_and_keeps_source() {
    let (mut engine, events, info) = engine_without_device();

    engine.handle(AudioCmd::Load {
        source: "/music/a.mp3".into(),
        autoplay: true,
    });

    assert_eq!(
        events.try_recv().unwrap(),
        AudioEvent::LoadFailed {
            source: "/music/a.mp3".into(),
            reason: "no audio output device".into(),
        }
    );
    let info = info.lock().unwrap().clone();
    assert_eq!(info.source.as_deref(), Some("/music/a.mp3"));
    assert!(!info.playing);
    assert!(!info.finished);
}

#[test]
fn load_of_remote_source_fails_before_touching_the_device() {
    let (mut engine, events, _) = engine_without_device();
    engine.handle(AudioCmd::Load {
        source: "http://example.com/a.mp3".into(),
        autoplay: false,
    });
    match events.try_recv().unwrap() {
        AudioEvent::LoadFailed { reason, .. } => assert!(reason.starts_with("unsupported source")),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn volume_and_mute_are_engine_local_and_clamped() {
    let (mut engine, _, info) = engine_without_device();
    assert_eq!(info.lock().unwrap().volume, 0.8);

    engine.handle(AudioCmd::SetVolume(1.7));
    assert_eq!(info.lock().unwrap().volume, 1.0);

    engine.handle(AudioCmd::SetMuted(true));
    engine.handle(AudioCmd::SetVolume(-0.3));
    let snapshot = info.lock().unwrap().clone();
    assert_eq!(snapshot.volume, 0.0);
    assert!(snapshot.muted);
}

#[test]
fn stop_clears_the_loaded_source() {
    let (mut engine, _, info) = engine_without_device();
    engine.handle(AudioCmd::Load {
        source: "/music/a.mp3".into(),
        autoplay: false,
    });
    engine.handle(AudioCmd::Stop);
    assert_eq!(info.lock().unwrap().source, None);
}

#[test]
fn progress_is_a_clamped_fraction_of_known_duration() {
    let mut info = PlaybackInfo {
        elapsed: Duration::from_secs(30),
        duration: Some(Duration::from_secs(120)),
        ..PlaybackInfo::default()
    };
    assert_eq!(info.progress(), Some(0.25));

    info.elapsed = Duration::from_secs(500);
    assert_eq!(info.progress(), Some(1.0));

    info.duration = None;
    assert_eq!(info.progress(), None);
}
