//! Handing finished clips to the user, with the original clip as a fallback.

pub(crate) mod save;

use crate::foundation::error::GlyphreelError;
use crate::media::clip::EncodedClip;
use crate::transcode::transcoder::Transcoder;
use save::{FileSaver, timestamped_filename};

/// What [`deliver_with_fallback`] ended up saving.
#[derive(Debug)]
pub enum Delivery {
    /// The MP4 conversion succeeded and was saved.
    Transcoded {
        /// File name handed to the saver.
        filename: String,
        /// Converted clip.
        clip: EncodedClip,
    },
    /// Conversion failed; the original clip was saved instead.
    Fallback {
        /// File name handed to the saver (native extension).
        filename: String,
        /// Why conversion failed.
        error: GlyphreelError,
    },
}

impl Delivery {
    /// File name that was saved.
    pub fn filename(&self) -> &str {
        match self {
            Self::Transcoded { filename, .. } | Self::Fallback { filename, .. } => filename,
        }
    }

    /// `true` when the original clip was delivered.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Convert `clip` and save the result; on failure save `clip` itself under its own extension.
pub fn deliver_with_fallback(
    transcoder: &Transcoder,
    clip: &EncodedClip,
    prefix: &str,
    saver: &dyn FileSaver,
    progress: &mut dyn FnMut(f64),
) -> Delivery {
    match transcoder.convert(clip, progress) {
        Ok(converted) => {
            let filename = timestamped_filename(prefix, &converted);
            saver.save(&converted, &filename);
            Delivery::Transcoded {
                filename,
                clip: converted,
            }
        }
        Err(error) => {
            let filename = timestamped_filename(prefix, clip);
            tracing::warn!(error = %error, file = %filename, "transcode failed; delivering original clip");
            saver.save(clip, &filename);
            Delivery::Fallback { filename, error }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/deliver/fallback.rs"]
mod tests;
