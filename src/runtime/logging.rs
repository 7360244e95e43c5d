use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Environment variable overriding `logging.filter`.
pub const LOG_ENV: &str = "CADENZA_LOG";

/// Send `tracing` output to the log file; the terminal belongs to the UI.
///
/// Returns the file in use. Without a usable file nothing is logged; the
/// player still starts.
pub fn init(settings: &LoggingSettings, path: Option<PathBuf>) -> Option<PathBuf> {
    let path = path?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("cadenza=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()?;
    Some(path)
}
