use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::media::clip::EncodedClip;

/// Receives finished clips. Saving is fire-and-forget; implementations log their own failures.
pub trait FileSaver {
    /// Store `clip` as `filename`.
    fn save(&self, clip: &EncodedClip, filename: &str);
}

/// Writes clips into a directory.
#[derive(Clone, Debug)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    /// Saver writing into `dir` (created on first save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path `filename` is written to.
    pub fn path_for(&self, filename: &str) -> GlyphreelResult<PathBuf> {
        let name = Path::new(filename);
        let plain = name.components().count() == 1
            && name.file_name().is_some_and(|n| n == name.as_os_str());
        if filename.is_empty() || !plain {
            return Err(GlyphreelError::validation(format!(
                "'{filename}' is not a plain file name"
            )));
        }
        Ok(self.dir.join(filename))
    }

    /// Write `clip` and return where it went.
    pub fn try_save(&self, clip: &EncodedClip, filename: &str) -> GlyphreelResult<PathBuf> {
        let path = self.path_for(filename)?;
        ensure_parent_dir(&path)?;
        std::fs::write(&path, clip.bytes())
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(path)
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, clip: &EncodedClip, filename: &str) {
        match self.try_save(clip, filename) {
            Ok(path) => {
                tracing::info!(path = %path.display(), bytes = clip.len(), media = %clip.media_type(), "saved clip");
            }
            Err(e) => tracing::error!(error = %e, file = filename, "failed to save clip"),
        }
    }
}

/// `<prefix>-<unix-millis>.<ext>` for `clip`'s media type.
pub fn timestamped_filename(prefix: &str, clip: &EncodedClip) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let prefix = prefix.trim();
    let prefix = if prefix.is_empty() { "glyphreel" } else { prefix };
    format!("{prefix}-{millis}.{}", clip.media_type().extension())
}

#[cfg(test)]
#[path = "../../tests/unit/deliver/save.rs"]
mod tests;
