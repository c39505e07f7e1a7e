//! Streaming encoders that turn sampled frames into compressed chunks.

/// System `ffmpeg` VP9/WebM encoder.
pub mod ffmpeg;
/// Encoder trait, configuration and chunk collection.
pub mod stream;
