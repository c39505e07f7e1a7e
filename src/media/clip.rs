use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::error::{GlyphreelError, GlyphreelResult};

/// Container format of an encoded clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    /// Matroska-based WebM.
    WebM,
    /// ISO base media MP4.
    Mp4,
}

/// Video codec of an encoded clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    /// VP9.
    Vp9,
    /// H.264 / AVC.
    H264,
}

/// Declared container + codec identity of a clip. Displays as `container/codec`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MediaType {
    /// Container.
    pub container: Container,
    /// Video codec.
    pub codec: VideoCodec,
}

impl MediaType {
    /// What the capture stage produces.
    pub const WEBM_VP9: Self = Self {
        container: Container::WebM,
        codec: VideoCodec::Vp9,
    };
    /// What the transcode stage produces.
    pub const MP4_H264: Self = Self {
        container: Container::Mp4,
        codec: VideoCodec::H264,
    };

    /// Native file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self.container {
            Container::WebM => "webm",
            Container::Mp4 => "mp4",
        }
    }

    /// MIME type including the codec parameter.
    pub fn mime(self) -> &'static str {
        match (self.container, self.codec) {
            (Container::WebM, VideoCodec::Vp9) => "video/webm;codecs=vp9",
            (Container::WebM, VideoCodec::H264) => "video/webm;codecs=avc1",
            (Container::Mp4, VideoCodec::H264) => "video/mp4;codecs=avc1",
            (Container::Mp4, VideoCodec::Vp9) => "video/mp4;codecs=vp09",
        }
    }

    /// Guess the media type from a file extension (`webm` or `mp4`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "webm" => Some(Self::WEBM_VP9),
            "mp4" | "m4v" => Some(Self::MP4_H264),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codec = match self.codec {
            VideoCodec::Vp9 => "vp9",
            VideoCodec::H264 => "h264",
        };
        write!(f, "{}/{codec}", self.extension())
    }
}

/// A finalized, immutable video payload with its declared media type.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Clone, Debug)]
pub struct EncodedClip {
    bytes: Arc<[u8]>,
    media_type: MediaType,
    duration: Option<Duration>,
}

impl EncodedClip {
    /// Wrap `bytes` as a clip of `media_type`.
    pub fn new(bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self {
            bytes: Arc::from(bytes),
            media_type,
            duration: None,
        }
    }

    /// Attach the nominal duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Read a clip from disk, inferring the media type from the extension.
    pub fn from_path(path: &Path) -> GlyphreelResult<Self> {
        let media_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaType::from_extension)
            .ok_or_else(|| {
                GlyphreelError::validation(format!(
                    "cannot infer media type of '{}' (expected .webm or .mp4)",
                    path.display()
                ))
            })?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read clip '{}'", path.display()))?;
        Ok(Self::new(bytes, media_type))
    }

    /// Payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared media type.
    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Nominal duration when known.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when the payload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/clip.rs"]
mod tests;
