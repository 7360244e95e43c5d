use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning a track's source into a playing sink.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device")]
    NoOutputDevice,

    #[error("unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path:?}: {reason}")]
    Decode { path: PathBuf, reason: String },
}
