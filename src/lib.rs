//! Glyphreel turns animated text into shareable video clips.
//!
//! A capture session samples a live text region at a fixed rate, resynthesizes each sample on an
//! off-screen surface and streams the frames into a WebM/VP9 encoder. Finished clips can then be
//! converted to MP4/H.264, falling back to the original clip when conversion fails:
//!
//! - Describe a region ([`RevealRegion`], [`SharedRegion`] or your own [`VisualRegion`])
//! - Record it with a [`FrameRecorder`] (`start` / `stop`)
//! - Convert with a [`Transcoder`], or hand off through [`deliver_with_fallback`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod capture;
pub(crate) mod config;
pub(crate) mod deliver;
/// Streaming frame encoders.
pub mod encode;
pub(crate) mod media;
pub(crate) mod region;
/// Off-screen resynthesis surfaces.
pub mod render;
pub(crate) mod reveal;
/// MP4 conversion stage.
pub mod transcode;

pub use crate::foundation::core::{Affine, Canvas, Fps, Point, Rgba8Premul, Vec2};
pub use crate::foundation::error::{GlyphreelError, GlyphreelResult};

pub use crate::animation::ease::Ease;
pub use crate::capture::recorder::{FrameRecorder, RecorderOpts, SessionInfo, SessionState};
pub use crate::capture::sampler::SessionStats;
pub use crate::config::ClipConfig;
pub use crate::deliver::save::{DirectorySaver, FileSaver, timestamped_filename};
pub use crate::deliver::{Delivery, deliver_with_fallback};
pub use crate::encode::ffmpeg::FfmpegWebmEncoder;
pub use crate::encode::stream::{ChunkCollector, EncoderConfig, StreamEncoder};
pub use crate::media::clip::{Container, EncodedClip, MediaType, VideoCodec};
pub use crate::media::probe::probe_duration;
pub use crate::region::color::Color;
pub use crate::region::font::{FontSource, ResolvedFont};
pub use crate::region::model::{Fragment, Overlay, RegionBounds, StyleSnapshot, VisibleState};
pub use crate::region::{SharedRegion, VisualRegion};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, SurfaceBackend, SurfaceSettings, create_backend,
};
pub use crate::reveal::RevealStyle;
pub use crate::reveal::animation::RevealAnimation;
pub use crate::reveal::region::RevealRegion;
pub use crate::reveal::timing::{RevealTimings, SettleMargins, estimate_duration};
pub use crate::transcode::engine::{EngineLoader, EngineSource, TranscodeEngine};
pub use crate::transcode::transcoder::Transcoder;
