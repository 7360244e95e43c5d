use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::config::AudioSettings;

use super::error::AudioError;
use super::sink::create_sink_at;
use super::source::resolve_source;
use super::types::{AudioCmd, AudioEvent, PlaybackHandle, PlaybackInfo};

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in
                // debugging, but noisy for a TUI app.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                error!(error = %e, "no audio output device; every load will fail");
                None
            }
        };

        let mut engine = Engine::new(stream, events, playback_info, audio_settings.initial_volume);
        let tick = Duration::from_millis(audio_settings.position_poll_ms.max(10));

        loop {
            match rx.recv_timeout(tick) {
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    engine.quit(fade_out_ms);
                    break;
                }
                Ok(cmd) => engine.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            // Periodic position refresh and end-of-source detection.
            engine.tick();
        }
        debug!("audio thread stopped");
    })
}

/// State owned by the audio thread: one stream, at most one sink.
pub(super) struct Engine {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    source: Option<String>,
    path: Option<PathBuf>,
    /// Position the current sink was built at; elapsed = offset + sink position.
    offset: Duration,
    duration: Option<Duration>,
    paused: bool,
    finished: bool,
    volume: f32,
    muted: bool,
    events: Sender<AudioEvent>,
    playback_info: PlaybackHandle,
}

impl Engine {
    pub(super) fn new(
        stream: Option<OutputStream>,
        events: Sender<AudioEvent>,
        playback_info: PlaybackHandle,
        volume: f32,
    ) -> Self {
        let engine = Self {
            stream,
            sink: None,
            source: None,
            path: None,
            offset: Duration::ZERO,
            duration: None,
            paused: true,
            finished: false,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
            events,
            playback_info,
        };
        engine.publish();
        engine
    }

    pub(super) fn handle(&mut self, cmd: AudioCmd) {
        match cmd {
            AudioCmd::Load { source, autoplay } => self.load(source, autoplay),
            AudioCmd::Play => self.play(),
            AudioCmd::Pause => {
                if let Some(s) = self.sink.as_ref() {
                    s.pause();
                }
                self.paused = true;
            }
            AudioCmd::Stop => {
                self.drop_sink();
                self.source = None;
                self.path = None;
                self.duration = None;
                self.finished = false;
                self.paused = true;
            }
            AudioCmd::Restart => self.rebuild_at(Duration::ZERO, true),
            AudioCmd::SeekTo(pos) => self.seek_to(pos),
            AudioCmd::SeekBy(secs) => {
                let cur = self.elapsed().as_secs() as i64;
                let new = (cur + secs).max(0) as u64;
                self.seek_to(Duration::from_secs(new));
            }
            AudioCmd::SetVolume(v) => {
                self.volume = v.clamp(0.0, 1.0);
                self.apply_volume();
            }
            AudioCmd::SetMuted(m) => {
                self.muted = m;
                self.apply_volume();
            }
            AudioCmd::Quit { fade_out_ms } => self.quit(fade_out_ms),
        }
        self.publish();
    }

    pub(super) fn tick(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            if !self.paused && !self.finished && s.empty() {
                self.finished = true;
                self.paused = true;
                if let Some(source) = self.source.clone() {
                    debug!(%source, "source finished");
                    self.emit(AudioEvent::Finished { source });
                }
            }
        }
        self.publish();
    }

    fn load(&mut self, source: String, autoplay: bool) {
        self.drop_sink();
        self.source = Some(source.clone());
        self.path = None;
        self.offset = Duration::ZERO;
        self.duration = None;
        self.finished = false;
        self.paused = true;

        let opened = resolve_source(&source).and_then(|path| {
            let stream = self.stream.as_ref().ok_or(AudioError::NoOutputDevice)?;
            let (sink, duration) = create_sink_at(stream, &path, Duration::ZERO)?;
            Ok((path, sink, duration))
        });

        match opened {
            Ok((path, sink, duration)) => {
                self.path = Some(path);
                self.duration = duration;
                self.sink = Some(sink);
                self.apply_volume();
                if autoplay {
                    self.play();
                }
                self.emit(AudioEvent::Loaded { source, duration });
            }
            Err(e) => {
                warn!(%source, error = %e, "failed to load source");
                self.emit(AudioEvent::LoadFailed {
                    source,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn play(&mut self) {
        if self.finished {
            self.rebuild_at(Duration::ZERO, true);
            return;
        }
        if let Some(s) = self.sink.as_ref() {
            s.play();
            self.paused = false;
        }
    }

    fn seek_to(&mut self, pos: Duration) {
        if self.path.is_none() {
            return;
        }
        let pos = match self.duration {
            Some(total) => pos.min(total),
            None => pos,
        };
        let resume = !self.paused;
        self.rebuild_at(pos, resume);
    }

    /// Replace the sink with a fresh one skipped to `pos`.
    fn rebuild_at(&mut self, pos: Duration, play: bool) {
        let (Some(path), Some(stream)) = (self.path.clone(), self.stream.as_ref()) else {
            return;
        };
        match create_sink_at(stream, &path, pos) {
            Ok((sink, _)) => {
                self.drop_sink();
                self.sink = Some(sink);
                self.offset = pos;
                self.finished = false;
                self.apply_volume();
                if play {
                    if let Some(s) = self.sink.as_ref() {
                        s.play();
                    }
                }
                self.paused = !play;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to reopen source");
                if let Some(source) = self.source.clone() {
                    self.emit(AudioEvent::LoadFailed {
                        source,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn quit(&mut self, fade_out_ms: u64) {
        if let Some(s) = self.sink.as_ref() {
            if !self.paused {
                // Fade out gently before stopping.
                fade_out_sink(s, self.effective_volume(), fade_out_ms);
            }
            s.stop();
        }
        self.sink = None;
        self.paused = true;
        // Update shared state so the UI doesn't keep showing Playing.
        self.publish();
    }

    fn drop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    fn apply_volume(&self) {
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(self.effective_volume());
        }
    }

    fn elapsed(&self) -> Duration {
        let played = self.offset + self.sink.as_ref().map_or(Duration::ZERO, |s| s.get_pos());
        match self.duration {
            Some(total) => played.min(total),
            None => played,
        }
    }

    fn emit(&self, event: AudioEvent) {
        if self.events.send(event).is_err() {
            debug!("audio event receiver dropped");
        }
    }

    fn publish(&self) {
        if let Ok(mut info) = self.playback_info.lock() {
            *info = PlaybackInfo {
                source: self.source.clone(),
                elapsed: self.elapsed(),
                duration: self.duration,
                playing: self.sink.is_some() && !self.paused,
                finished: self.finished,
                volume: self.volume,
                muted: self.muted,
            };
        }
    }
}

fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
