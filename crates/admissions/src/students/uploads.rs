use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::form::PhotoUpload;

/// Photo extensions accepted by the sink, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

const WINDOWS_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Flat directory receiving accepted applicant photos.
#[derive(Debug, Clone)]
pub struct UploadSink {
    dir: PathBuf,
}

impl UploadSink {
    /// Use `dir` as the sink, creating it when absent.
    pub fn create(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store the photo when its declared name passes the allow-list.
    ///
    /// Returns the written path, or `None` when the photo is skipped. A skipped photo is not an
    /// error; the submission carries on without one. An existing file with the same sanitized
    /// name is overwritten.
    pub async fn accept(&self, photo: &PhotoUpload) -> io::Result<Option<String>> {
        if photo.filename.is_empty() {
            return Ok(None);
        }

        if !allowed_file(&photo.filename) {
            debug!(filename = %photo.filename, "photo extension not allowed; skipping");
            return Ok(None);
        }

        // Sanitizing can eat the stem and leave a bare extension behind.
        let filename = secure_filename(&photo.filename);
        if !allowed_file(&filename) {
            debug!(filename = %photo.filename, "sanitized photo name lost its extension; skipping");
            return Ok(None);
        }

        let path = self.dir.join(&filename);
        tokio::fs::write(&path, &photo.bytes).await?;
        info!(path = %path.display(), bytes = photo.bytes.len(), "stored applicant photo");

        Ok(Some(path.to_string_lossy().into_owned()))
    }
}

/// True when `filename` has a final extension in [`ALLOWED_EXTENSIONS`].
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| {
            let extension = extension.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&extension.as_str())
        })
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to a single safe path component.
///
/// Both `/` and `\` count as path separators and, like whitespace, become `_`. Non-ASCII
/// characters and anything else outside `[A-Za-z0-9._-]` are dropped, and leading or trailing
/// dots and underscores are trimmed. Windows device names get a `_` prefix on every platform.
/// The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .filter(char::is_ascii)
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES
        .iter()
        .any(|device| device.eq_ignore_ascii_case(stem))
    {
        return format!("_{trimmed}");
    }

    trimmed.to_string()
}
