use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::catalog::{Track, TrackId};
use crate::config::RepeatModeSetting;

use super::queue::Queue;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    #[default]
    None,
    /// Wrap around to the start of the queue.
    All,
    /// Restart the same track when it finishes on its own.
    One,
}

impl RepeatMode {
    /// `None -> All -> One -> None`.
    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::All,
            Self::All => Self::One,
            Self::One => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }
}

impl From<RepeatModeSetting> for RepeatMode {
    fn from(s: RepeatModeSetting) -> Self {
        match s {
            RepeatModeSetting::None => Self::None,
            RepeatModeSetting::All => Self::All,
            RepeatModeSetting::One => Self::One,
        }
    }
}

/// Coarse playback state derived from the transport.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Comparable view of the transport flags, used to detect what a command changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSnapshot {
    pub current: Option<TrackId>,
    pub is_playing: bool,
    pub is_shuffling: bool,
    pub repeat_mode: RepeatMode,
}

/// The queue/transport state machine.
///
/// Owns the queue, the current track and the play/shuffle/repeat flags, and
/// decides what should play next. It never touches audio; see
/// [`PlayerService`](super::PlayerService) for that.
///
/// Every command is a single synchronous update, so commands never
/// interleave. Randomness is injected so shuffle can be tested
/// deterministically.
pub struct Transport<R = StdRng> {
    queue: Queue,
    current: Option<Track>,
    playing: bool,
    shuffling: bool,
    repeat: RepeatMode,
    rng: R,
}

impl Transport<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Default for Transport<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Transport<R> {
    /// Empty queue, nothing current, not playing, no shuffle, no repeat.
    pub fn with_rng(rng: R) -> Self {
        Self {
            queue: Queue::default(),
            current: None,
            playing: false,
            shuffling: false,
            repeat: RepeatMode::None,
            rng,
        }
    }

    /// Override the initial shuffle/repeat flags (from configuration).
    pub fn with_modes(mut self, shuffling: bool, repeat: RepeatMode) -> Self {
        self.shuffling = shuffling;
        self.repeat = repeat;
        self
    }

    /// Play `track`, optionally replacing the queue.
    ///
    /// A non-empty `queue` replaces the stored queue and moves the index to
    /// `track`'s position in it (by id), or to 0 when it is not there. An
    /// empty `queue` leaves the stored queue and index alone.
    pub fn play(&mut self, track: Track, queue: Vec<Track>) {
        if !queue.is_empty() {
            self.queue.replace(queue, 0);
            match self.queue.position_of(&track.id) {
                Some(i) => self.queue.set_index(i),
                None => warn!(
                    track = %track.id,
                    queue_len = self.queue.len(),
                    "played track is not in the supplied queue; queue index falls back to 0"
                ),
            }
        }
        debug!(track = %track.id, "play");
        self.current = Some(track);
        self.playing = true;
    }

    /// Flip the playing flag. Calling it twice restores the original state.
    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    /// Flip shuffle. Only affects how later `next`/`previous` pick a target.
    pub fn toggle_shuffle(&mut self) {
        self.shuffling = !self.shuffling;
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = self.repeat.cycle();
    }

    /// Advance in the queue.
    ///
    /// Shuffle picks a random index other than the current one. Past the end,
    /// repeat `All` wraps to 0; anything else stops playback and stays parked
    /// on the last track. Repeat `One` does not hold a manual advance.
    pub fn next(&mut self) {
        let len = self.queue.len();
        let Some(current) = self.queue.current_index() else {
            return;
        };

        let mut target = if self.shuffling {
            self.random_other_index(len, current)
        } else {
            current + 1
        };

        if target >= len {
            if self.repeat == RepeatMode::All {
                target = 0;
            } else {
                self.playing = false;
                return;
            }
        }

        self.go_to(target);
    }

    /// Step back in the queue.
    ///
    /// Shuffle picks a random index other than the current one, same as
    /// `next`. Before the start, repeat `All` wraps to the last track;
    /// otherwise it stays on the first. Playback always resumes.
    pub fn previous(&mut self) {
        let len = self.queue.len();
        let Some(current) = self.queue.current_index() else {
            return;
        };

        let target = if self.shuffling {
            self.random_other_index(len, current)
        } else if current == 0 {
            if self.repeat == RepeatMode::All {
                len - 1
            } else {
                0
            }
        } else {
            current - 1
        };

        self.go_to(target);
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_shuffling(&self) -> bool {
        self.shuffling
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn status(&self) -> PlaybackStatus {
        match (&self.current, self.playing) {
            (None, _) => PlaybackStatus::Stopped,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(_), false) => PlaybackStatus::Paused,
        }
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            current: self.current.as_ref().map(|t| t.id.clone()),
            is_playing: self.playing,
            is_shuffling: self.shuffling,
            repeat_mode: self.repeat,
        }
    }

    fn go_to(&mut self, index: usize) {
        self.queue.set_index(index);
        self.current = self.queue.get(index).cloned();
        self.playing = true;
    }

    /// Uniform pick in `0..len` excluding `current`; a one-track queue keeps `current`.
    fn random_other_index(&mut self, len: usize, current: usize) -> usize {
        if len <= 1 {
            return current;
        }
        // Draw from len - 1 slots and step over the current one.
        let r = self.rng.random_range(0..len - 1);
        if r >= current { r + 1 } else { r }
    }
}
