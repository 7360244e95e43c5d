use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{AudioCmd, AudioEvent, AudioOutput, PlaybackInfo};
use crate::catalog::{Track, TrackId};

use super::transport::{RepeatMode, Transport, TransportSnapshot};

/// The last source that failed to load, kept for a retry affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackFailure {
    pub track_id: TrackId,
    pub reason: String,
}

/// The one playback service of the process.
///
/// Owns the transport state machine and the single audio output. Commands
/// update the transport first, then the output is reconciled with the new
/// transport state. Presentation code borrows this service; it never owns a
/// copy of the transport or the output.
pub struct PlayerService<O: AudioOutput> {
    transport: Transport,
    output: O,
    skip_on_error: bool,
    consecutive_failures: usize,
    last_failure: Option<PlaybackFailure>,
}

impl<O: AudioOutput> PlayerService<O> {
    pub fn new(transport: Transport, output: O, skip_on_error: bool) -> Self {
        Self {
            transport,
            output,
            skip_on_error,
            consecutive_failures: 0,
            last_failure: None,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Latest position/volume snapshot of the audio output.
    pub fn position(&self) -> PlaybackInfo {
        self.output.info()
    }

    pub fn last_failure(&self) -> Option<&PlaybackFailure> {
        self.last_failure.as_ref()
    }

    pub fn play(&mut self, track: Track, queue: Vec<Track>) {
        self.consecutive_failures = 0;
        self.command(|t| t.play(track, queue));
    }

    pub fn toggle_play(&mut self) {
        self.command(Transport::toggle_play);
    }

    pub fn toggle_shuffle(&mut self) {
        self.command(Transport::toggle_shuffle);
    }

    pub fn toggle_repeat(&mut self) {
        self.command(Transport::toggle_repeat);
    }

    pub fn next(&mut self) {
        self.consecutive_failures = 0;
        self.command(Transport::next);
    }

    pub fn previous(&mut self) {
        self.consecutive_failures = 0;
        self.command(Transport::previous);
    }

    /// Pause and rewind, keeping the current track.
    pub fn stop(&mut self) {
        if self.transport.is_playing() {
            self.toggle_play();
        }
        self.output.send(AudioCmd::SeekTo(Duration::ZERO));
    }

    /// Reload the current track and play it.
    pub fn retry(&mut self) {
        let before = self.transport.snapshot();
        if self.transport.current_track().is_none() {
            return;
        }
        if !self.transport.is_playing() {
            self.transport.toggle_play();
        }
        self.consecutive_failures = 0;
        self.reconcile(&before, true);
    }

    pub fn seek_to(&self, pos: Duration) {
        self.output.send(AudioCmd::SeekTo(pos));
    }

    pub fn seek_by(&self, secs: i64) {
        self.output.send(AudioCmd::SeekBy(secs));
    }

    /// Set the volume; moving the volume also unmutes.
    pub fn set_volume(&self, volume: f32) {
        self.output.send(AudioCmd::SetVolume(volume.clamp(0.0, 1.0)));
        self.output.send(AudioCmd::SetMuted(false));
    }

    pub fn adjust_volume(&self, delta: f32) {
        let current = self.output.info().volume;
        self.set_volume(current + delta);
    }

    pub fn toggle_mute(&self) {
        let muted = self.output.info().muted;
        self.output.send(AudioCmd::SetMuted(!muted));
    }

    /// Drain output events and apply them. Returns how many were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.output.poll_event() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: AudioEvent) {
        let Some(current) = self.transport.current_track() else {
            return;
        };
        if current.audio_url != event.source() {
            debug!(source = event.source(), "ignoring event for a replaced source");
            return;
        }
        let current_id = current.id.clone();

        match event {
            AudioEvent::Loaded { .. } => {
                self.consecutive_failures = 0;
                self.last_failure = None;
            }
            AudioEvent::Finished { .. } => self.on_finished(current_id),
            AudioEvent::LoadFailed { reason, .. } => self.on_load_failed(current_id, reason),
        }
    }

    fn on_finished(&mut self, finished: TrackId) {
        if self.transport.repeat_mode() == RepeatMode::One {
            // Repeat-one holds on natural completion only; the transport is untouched.
            self.output.send(AudioCmd::Restart);
            return;
        }

        if self.transport.queue().is_empty() {
            // A single track played outside any queue: nothing to advance to.
            if self.transport.is_playing() {
                self.toggle_play();
            }
            return;
        }

        self.next();

        let same_track = self.transport.current_track().map(|t| &t.id) == Some(&finished);
        if same_track && self.transport.is_playing() {
            // The queue resolved to the track that just ended (one-track queue).
            self.output.send(AudioCmd::Restart);
        }
    }

    fn on_load_failed(&mut self, track_id: TrackId, reason: String) {
        warn!(track = %track_id, %reason, "track failed to load");
        self.last_failure = Some(PlaybackFailure { track_id, reason });
        self.consecutive_failures += 1;

        if !self.skip_on_error || !self.transport.is_playing() {
            return;
        }

        if self.consecutive_failures >= self.transport.queue().len().max(1) {
            info!(
                failures = self.consecutive_failures,
                "every queued track failed; stopping"
            );
            self.toggle_play();
        } else {
            // Skipping keeps the failure count; only user commands reset it.
            self.command(Transport::next);
        }
    }

    fn command(&mut self, f: impl FnOnce(&mut Transport)) {
        let before = self.transport.snapshot();
        f(&mut self.transport);
        self.reconcile(&before, false);
    }

    /// Make the output follow the transport after a command.
    fn reconcile(&mut self, before: &TransportSnapshot, force_reload: bool) {
        let playing = self.transport.is_playing();

        match self.transport.current_track() {
            None => {
                if before.current.is_some() {
                    self.output.send(AudioCmd::Stop);
                }
            }
            Some(track) if force_reload || before.current.as_ref() != Some(&track.id) => {
                if self
                    .last_failure
                    .as_ref()
                    .is_some_and(|f| f.track_id != track.id)
                {
                    self.last_failure = None;
                }
                self.output.send(AudioCmd::Load {
                    source: track.audio_url.clone(),
                    autoplay: playing,
                });
            }
            Some(_) => {
                if before.is_playing != playing {
                    self.output
                        .send(if playing { AudioCmd::Play } else { AudioCmd::Pause });
                }
            }
        }
    }
}
