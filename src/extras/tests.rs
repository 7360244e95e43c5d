use std::cell::RefCell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::tempdir;

use super::worker::answer;
use super::*;
use crate::catalog::TrackId;

#[derive(Default)]
struct Recorder(RefCell<Vec<SideRequest>>);

impl SideRequester for Recorder {
    fn request(&self, request: SideRequest) {
        self.0.borrow_mut().push(request);
    }
}

impl Recorder {
    fn take(&self) -> Vec<SideRequest> {
        self.0.borrow_mut().drain(..).collect()
    }
}

fn id(s: &str) -> TrackId {
    TrackId::from(s)
}

fn response(adapter: AdapterId, track: &str, value: SideValue) -> SideResponse {
    SideResponse {
        adapter,
        track_id: id(track),
        value,
    }
}

#[test]
fn missing_store_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = LocalStore::open(dir.path().join("store.toml")).unwrap();
    assert!(!store.is_favorite("me", &id("a.mp3")).unwrap());
    assert!(store.favorites("me").unwrap().is_empty());
    assert!(store.playlists(Some("me")).unwrap().is_empty());
    assert_eq!(store.lyrics(&id("a.mp3")).unwrap(), None);
}

#[test]
fn writes_persist_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("store.toml");

    {
        let store = LocalStore::open(&path).unwrap();
        store.set_favorite("me", &id("x/a.mp3"), true).unwrap();
        store.set_lyrics(&id("x/a.mp3"), "la la la\nsecond line").unwrap();
        store.create_playlist(Some("me"), "Road").unwrap();
        store.add_to_playlist("Road", &id("x/a.mp3")).unwrap();
    }

    let store = LocalStore::open(&path).unwrap();
    assert!(store.is_favorite("me", &id("x/a.mp3")).unwrap());
    assert_eq!(
        store.lyrics(&id("x/a.mp3")).unwrap().as_deref(),
        Some("la la la\nsecond line")
    );
    let playlists = store.playlists(Some("me")).unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].tracks, vec![id("x/a.mp3")]);
}

#[test]
fn reads_hand_written_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.toml");
    std::fs::write(
        &path,
        r#"
[favorites]
me = ["a.mp3", "b.mp3"]

[lyrics]
"a.mp3" = "hello"

[[playlists]]
name = "Shared"
tracks = ["b.mp3"]

[[playlists]]
name = "Private"
owner = "someone-else"
"#,
    )
    .unwrap();

    let store = LocalStore::open(&path).unwrap();
    assert_eq!(store.favorites("me").unwrap(), vec![id("a.mp3"), id("b.mp3")]);
    let names: Vec<_> = store
        .playlists(Some("me"))
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Shared"]);
}

#[test]
fn malformed_store_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.toml");
    std::fs::write(&path, "favorites = 3").unwrap();
    assert!(matches!(
        LocalStore::open(&path),
        Err(StoreError::Parse { .. })
    ));
}

#[test]
fn favorite_toggle_is_idempotent() {
    let store = LocalStore::in_memory();
    store.set_favorite("me", &id("a"), true).unwrap();
    store.set_favorite("me", &id("a"), true).unwrap();
    assert_eq!(store.favorites("me").unwrap(), vec![id("a")]);
    store.set_favorite("me", &id("a"), false).unwrap();
    assert!(store.favorites("me").unwrap().is_empty());
}

#[test]
fn playlist_edits() {
    let store = LocalStore::in_memory();
    store.create_playlist(None, "Mix").unwrap();
    assert!(matches!(
        store.create_playlist(None, "Mix"),
        Err(StoreError::DuplicatePlaylist(_))
    ));
    assert!(matches!(
        store.add_to_playlist("Nope", &id("a")),
        Err(StoreError::UnknownPlaylist(_))
    ));

    store.add_to_playlist("Mix", &id("a")).unwrap();
    store.add_to_playlist("Mix", &id("b")).unwrap();
    store.remove_from_playlist("Mix", 0).unwrap();
    store.remove_from_playlist("Mix", 9).unwrap();
    assert_eq!(store.playlists(None).unwrap()[0].tracks, vec![id("b")]);
}

#[test]
fn failed_writes_leave_the_store_unchanged() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let store = LocalStore::open(data_dir.join("store.toml")).unwrap();
    store.create_playlist(None, "Mix").unwrap();

    // A regular file where the data directory should be makes every write fail.
    std::fs::remove_dir_all(&data_dir).unwrap();
    std::fs::write(&data_dir, b"in the way").unwrap();

    assert!(matches!(
        store.set_favorite("u", &id("a"), true),
        Err(StoreError::Write { .. })
    ));
    assert!(!store.is_favorite("u", &id("a")).unwrap());
    assert!(store.create_playlist(None, "Other").is_err());
    assert!(store.add_to_playlist("Mix", &id("a")).is_err());
    let playlists = store.playlists(None).unwrap();
    assert_eq!(playlists.len(), 1);
    assert!(playlists[0].tracks.is_empty());

    let req = SideRequest {
        adapter: AdapterId::Footer,
        track_id: id("a"),
        query: SideQuery::SetFavorite(true),
    };
    assert_eq!(answer(&store, Some("u"), &req), SideValue::FavoriteSet(false));
    let req = SideRequest {
        query: SideQuery::Favorite,
        ..req
    };
    assert_eq!(answer(&store, Some("u"), &req), SideValue::Favorite(false));
}

#[test]
fn answers_without_user_degrade() {
    let store = LocalStore::in_memory();
    let req = |query| SideRequest {
        adapter: AdapterId::Footer,
        track_id: id("a"),
        query,
    };
    assert_eq!(answer(&store, None, &req(SideQuery::Favorite)), SideValue::Favorite(false));
    assert_eq!(
        answer(&store, None, &req(SideQuery::SetFavorite(true))),
        SideValue::FavoriteSet(false)
    );
    assert!(store.favorites("anyone").unwrap().is_empty());
    assert_eq!(answer(&store, None, &req(SideQuery::Lyrics)), SideValue::Lyrics(None));
}

#[test]
fn follow_requests_favorite_once_per_track() {
    let rec = Recorder::default();
    let mut extras = TrackExtras::new(AdapterId::Footer);

    assert!(extras.follow(Some(&id("a")), &rec));
    assert!(!extras.follow(Some(&id("a")), &rec));
    let sent = rec.take();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].query, SideQuery::Favorite);
    assert_eq!(sent[0].track_id, id("a"));
    assert_eq!(extras.favorite(), None);

    assert!(extras.follow(None, &rec));
    assert!(rec.take().is_empty());
    assert!(extras.track_id().is_none());
}

#[test]
fn responses_for_a_previous_track_are_discarded() {
    let rec = Recorder::default();
    let mut extras = TrackExtras::new(AdapterId::SidePanel);
    extras.follow(Some(&id("a")), &rec);
    extras.follow(Some(&id("b")), &rec);

    // The slow answer for "a" arrives after the switch to "b".
    assert!(!extras.apply(&response(AdapterId::SidePanel, "a", SideValue::Favorite(true))));
    assert_eq!(extras.favorite(), None);

    assert!(extras.apply(&response(AdapterId::SidePanel, "b", SideValue::Favorite(false))));
    assert_eq!(extras.favorite(), Some(false));
}

#[test]
fn responses_for_the_other_adapter_are_discarded() {
    let rec = Recorder::default();
    let mut footer = TrackExtras::new(AdapterId::Footer);
    footer.follow(Some(&id("a")), &rec);
    assert!(!footer.apply(&response(AdapterId::SidePanel, "a", SideValue::Favorite(true))));
    assert_eq!(footer.favorite(), None);
}

#[test]
fn lyrics_are_requested_on_demand_and_reset_on_track_change() {
    let rec = Recorder::default();
    let mut extras = TrackExtras::new(AdapterId::Footer);
    extras.request_lyrics(&rec);
    assert!(rec.take().is_empty());

    extras.follow(Some(&id("a")), &rec);
    rec.take();
    extras.request_lyrics(&rec);
    extras.request_lyrics(&rec);
    assert_eq!(rec.take().len(), 1);
    assert_eq!(extras.lyrics(), &Lyrics::Loading);

    extras.apply(&response(AdapterId::Footer, "a", SideValue::Lyrics(Some("words".into()))));
    assert_eq!(extras.lyrics(), &Lyrics::Ready(Some("words".into())));

    extras.follow(Some(&id("b")), &rec);
    assert_eq!(extras.lyrics(), &Lyrics::NotRequested);
}

#[test]
fn toggle_favorite_requests_the_flipped_flag() {
    let rec = Recorder::default();
    let mut extras = TrackExtras::new(AdapterId::Footer);
    assert!(!extras.toggle_favorite(&rec));

    extras.follow(Some(&id("a")), &rec);
    extras.apply(&response(AdapterId::Footer, "a", SideValue::Favorite(true)));
    rec.take();

    assert!(extras.toggle_favorite(&rec));
    assert_eq!(rec.take()[0].query, SideQuery::SetFavorite(false));
    // Unchanged until the store confirms.
    assert_eq!(extras.favorite(), Some(true));
}

#[test]
fn worker_answers_in_order() {
    let store = Arc::new(LocalStore::in_memory());
    store.set_lyrics(&id("a"), "text").unwrap();
    let queries = SideQueries::spawn(store.clone(), Some("me".into()));

    queries.request(SideRequest {
        adapter: AdapterId::Footer,
        track_id: id("a"),
        query: SideQuery::SetFavorite(true),
    });
    queries.request(SideRequest {
        adapter: AdapterId::SidePanel,
        track_id: id("a"),
        query: SideQuery::Lyrics,
    });

    let mut got = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while got.len() < 2 && Instant::now() < deadline {
        match queries.try_recv() {
            Some(r) => got.push(r),
            None => std::thread::sleep(Duration::from_millis(5)),
        }
    }

    assert_eq!(
        got,
        vec![
            response(AdapterId::Footer, "a", SideValue::FavoriteSet(true)),
            response(AdapterId::SidePanel, "a", SideValue::Lyrics(Some("text".into()))),
        ]
    );
    assert!(store.is_favorite("me", &id("a")).unwrap());
}
