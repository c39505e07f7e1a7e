/// Convenience result type used across glyphreel.
pub type GlyphreelResult<T> = Result<T, GlyphreelError>;

/// Top-level error taxonomy used by the capture and transcode APIs.
#[derive(thiserror::Error, Debug)]
pub enum GlyphreelError {
    /// Invalid user-provided options or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The observed region could not be measured or styled when a session started.
    #[error("capture setup error: {0}")]
    CaptureSetup(String),

    /// `start` was called while a session is still recording.
    #[error("capture error: a session is already recording")]
    AlreadyRecording,

    /// Resynthesizing a frame onto the off-screen surface failed.
    #[error("render error: {0}")]
    Render(String),

    /// The streaming encoder failed or produced no output.
    #[error("encode error: {0}")]
    Encode(String),

    /// Engine load or conversion failed. `source` carries the underlying cause.
    #[error("transcode error: {message}")]
    Transcode {
        /// Short description of the failed step.
        message: String,
        /// Underlying cause.
        #[source]
        source: anyhow::Error,
    },

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlyphreelError {
    /// Build a [`GlyphreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlyphreelError::CaptureSetup`] value.
    pub fn capture_setup(msg: impl Into<String>) -> Self {
        Self::CaptureSetup(msg.into())
    }

    /// Build a [`GlyphreelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`GlyphreelError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`GlyphreelError::Transcode`] value wrapping `cause`.
    pub fn transcode(msg: impl Into<String>, cause: impl Into<anyhow::Error>) -> Self {
        Self::Transcode {
            message: msg.into(),
            source: cause.into(),
        }
    }

    /// Build a [`GlyphreelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for [`GlyphreelError::Transcode`].
    pub fn is_transcode(&self) -> bool {
        matches!(self, Self::Transcode { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
