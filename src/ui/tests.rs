use std::cell::RefCell;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{Terminal, backend::TestBackend};

use super::format::{format_duration_mmss_ceil, format_mmss, now_playing_time_text};
use super::*;
use crate::app::Route;
use crate::audio::{AudioCmd, AudioEvent, PlaybackInfo};
use crate::catalog::{Catalog, Track};
use crate::config::TimeField;
use crate::extras::{AdapterId, SideRequest, SideResponse, SideValue};
use crate::player::Transport;

struct FakeOutput {
    info: RefCell<PlaybackInfo>,
}

impl AudioOutput for FakeOutput {
    fn send(&self, _cmd: AudioCmd) {}

    fn info(&self) -> PlaybackInfo {
        self.info.borrow().clone()
    }

    fn poll_event(&self) -> Option<AudioEvent> {
        None
    }
}

#[derive(Default)]
struct Recorder(RefCell<Vec<SideRequest>>);

impl SideRequester for Recorder {
    fn request(&self, request: SideRequest) {
        self.0.borrow_mut().push(request);
    }
}

fn track() -> Track {
    let mut t = Track::new("ride.mp3", "Ride the Lightning", "/m/ride.mp3");
    t.band_name = Some("Metallica".into());
    t.album_name = Some("Ride".into());
    t.release_year = Some(1984);
    t.display = "Metallica - Ride the Lightning".into();
    t
}

fn player() -> PlayerService<FakeOutput> {
    let output = FakeOutput {
        info: RefCell::new(PlaybackInfo {
            source: Some("/m/ride.mp3".into()),
            elapsed: Duration::from_secs(65),
            duration: Some(Duration::from_secs(396)),
            playing: true,
            ..PlaybackInfo::default()
        }),
    };
    PlayerService::new(Transport::with_rng(StdRng::seed_from_u64(1)), output, true)
}

fn render(
    app: &App,
    player: &PlayerService<FakeOutput>,
    footer: &FooterBar,
    panel: Option<&SidePanel>,
) -> String {
    let ui = UiSettings::default();
    let controls = ControlsSettings::default();
    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal
        .draw(|f| {
            draw(
                f,
                &Screen {
                    app,
                    player,
                    footer,
                    side_panel: panel,
                    ui: &ui,
                    controls: &controls,
                },
            )
        })
        .unwrap();
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

#[test]
fn format_helpers() {
    assert_eq!(format_mmss(Duration::from_secs(65)), "01:05");
    assert_eq!(format_duration_mmss_ceil(Some(Duration::from_millis(61_200))), "1:02 (62s)");
    assert_eq!(format_duration_mmss_ceil(None), "-");

    let mut ui = UiSettings::default();
    ui.now_playing_time_fields = vec![TimeField::Elapsed, TimeField::Remaining];
    assert_eq!(
        now_playing_time_text(Duration::from_secs(10), Some(Duration::from_secs(70)), &ui)
            .as_deref(),
        Some("00:10 / -01:00")
    );
    ui.now_playing_time_fields = vec![TimeField::Total];
    assert_eq!(now_playing_time_text(Duration::ZERO, None, &ui), None);
}

#[test]
fn controls_text_includes_scrub_seconds() {
    let text = controls_text(7);
    assert!(text.contains("[H/L] scrub -/+7s"));
    assert!(text.starts_with("[j/k] up/down"));
}

#[test]
fn footer_renders_current_track_and_time() {
    let mut player = player();
    player.play(track(), vec![track()]);
    let app = App::new(Catalog::new(vec![track()]), Vec::new(), Vec::new());
    let footer = FooterBar::new();

    let screen = render(&app, &player, &footer, None);
    assert!(screen.contains(" now playing "));
    assert!(screen.contains("Playing Metallica - Ride the Lightning (1984)"));
    assert!(screen.contains("01:05 / 06:36"));
    assert!(screen.contains("shuffle off • repeat off • vol 100%"));
}

#[test]
fn side_panel_replaces_footer_on_side_routes() {
    let mut player = player();
    player.play(track(), vec![track()]);
    let mut app = App::new(Catalog::new(vec![track()]), vec![track().id], Vec::new());
    app.switch_to(Route::Favorites);
    let footer = FooterBar::new();
    let panel = SidePanel::mount();

    let screen = render(&app, &player, &footer, Some(&panel));
    assert!(!screen.contains(" now playing "));
    assert!(screen.contains(" player "));
    assert!(screen.contains("Band: Metallica"));
    assert!(screen.contains("Year: 1984"));
}

#[test]
fn side_panel_shows_page_context_when_idle() {
    let player = player();
    let mut app = App::new(Catalog::new(vec![track()]), vec![track().id], Vec::new());
    app.switch_to(Route::Favorites);
    let panel = SidePanel::mount();

    let screen = render(&app, &player, &FooterBar::new(), Some(&panel));
    assert!(screen.contains("Nothing playing."));
    assert!(screen.contains("1 tracks • enter plays from here"));
}

#[test]
fn adapters_fetch_independently_and_remount_refetches() {
    let mut player = player();
    player.play(track(), Vec::new());
    let rec = Recorder::default();

    let mut footer = FooterBar::new();
    let mut panel = SidePanel::mount();
    assert!(footer.follow(&player, &rec));
    assert!(panel.follow(&player, &rec));
    assert!(!footer.follow(&player, &rec));

    let adapters: Vec<_> = rec.0.borrow().iter().map(|r| r.adapter).collect();
    assert_eq!(adapters, vec![AdapterId::Footer, AdapterId::SidePanel]);

    footer.extras_mut().apply(&SideResponse {
        adapter: AdapterId::Footer,
        track_id: track().id,
        value: SideValue::Favorite(true),
    });
    assert_eq!(footer.extras().favorite(), Some(true));
    assert_eq!(panel.extras().favorite(), None);

    // Unmount and mount again: the new panel asks again.
    drop(panel);
    let mut panel = SidePanel::mount();
    assert!(panel.follow(&player, &rec));
    assert_eq!(rec.0.borrow().len(), 3);
}
