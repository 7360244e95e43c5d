//! Audio-related small types and handles.
//!
//! This module defines the command and event enums exchanged with the audio
//! thread, the shared playback position and the `AudioOutput` contract.

use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Replace the current source and start buffering it.
    Load { source: String, autoplay: bool },
    /// Resume the loaded source. A finished source restarts from zero.
    Play,
    /// Pause the loaded source.
    Pause,
    /// Drop the loaded source.
    Stop,
    /// Rewind to zero and play the same source again.
    Restart,
    /// Seek to an absolute position.
    SeekTo(Duration),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    /// Set the output volume (clamped to 0.0 - 1.0).
    SetVolume(f32),
    SetMuted(bool),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Notifications emitted by the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Loaded {
        source: String,
        duration: Option<Duration>,
    },
    /// The source played through to its end.
    Finished { source: String },
    /// The source could not be opened or decoded. Never fatal.
    LoadFailed { source: String, reason: String },
}

impl AudioEvent {
    pub fn source(&self) -> &str {
        match self {
            Self::Loaded { source, .. }
            | Self::Finished { source }
            | Self::LoadFailed { source, .. } => source,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Real-time position of the one audio output, shared with the UI.
pub struct PlaybackInfo {
    /// Source currently loaded, if any.
    pub source: Option<String>,
    /// Elapsed playback time for the current source.
    pub elapsed: Duration,
    /// Total duration once the decoder knows it.
    pub duration: Option<Duration>,
    /// Whether audio is currently coming out.
    pub playing: bool,
    /// The source reached its end.
    pub finished: bool,
    pub volume: f32,
    pub muted: bool,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            source: None,
            elapsed: Duration::ZERO,
            duration: None,
            playing: false,
            finished: false,
            volume: 1.0,
            muted: false,
        }
    }
}

impl PlaybackInfo {
    /// Fraction of the source played, when the duration is known.
    pub fn progress(&self) -> Option<f64> {
        let total = self.duration?.as_secs_f64();
        if total <= 0.0 {
            return None;
        }
        Some((self.elapsed.as_secs_f64() / total).clamp(0.0, 1.0))
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// Minimal contract of the platform audio output.
///
/// The player treats the output as a black box: it sends commands, reads the
/// latest position snapshot and drains events.
pub trait AudioOutput {
    fn send(&self, cmd: AudioCmd);
    fn info(&self) -> PlaybackInfo;
    fn poll_event(&self) -> Option<AudioEvent>;
}
