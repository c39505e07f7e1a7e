//! WebM/VP9 to MP4/H.264 conversion through a lazily loaded, process-wide engine.

/// Engine trait, loader and the system `ffmpeg` engine.
pub mod engine;
pub(crate) mod progress;
pub(crate) mod transcoder;
