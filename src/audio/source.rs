use std::path::PathBuf;

use url::Url;

use super::error::AudioError;

/// Turn a track's `audio_url` into a local file path.
///
/// Accepts `file://` URLs and plain paths. Other schemes are rejected: the
/// output plays local files only.
pub fn resolve_source(source: &str) -> Result<PathBuf, AudioError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(AudioError::UnsupportedSource(source.to_string()));
    }

    if let Ok(url) = Url::parse(source) {
        match url.scheme() {
            "file" => {
                return url
                    .to_file_path()
                    .map_err(|_| AudioError::UnsupportedSource(source.to_string()));
            }
            // `C:\music\a.mp3` parses as scheme "c".
            s if s.len() == 1 => {}
            _ => return Err(AudioError::UnsupportedSource(source.to_string())),
        }
    }

    Ok(PathBuf::from(source))
}
