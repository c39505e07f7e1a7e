use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use crate::foundation::core::Fps;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::media::clip::MediaType;
use crate::render::backend::FrameRGBA;

/// Default bitrate, high enough to keep text edges crisp.
pub const DEFAULT_BITRATE_BPS: u64 = 8_000_000;

/// Configuration handed to an encoder when a session opens it.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderConfig {
    /// Frame width in pixels (even).
    pub width: u32,
    /// Frame height in pixels (even).
    pub height: u32,
    /// Frame rate frames are pushed at.
    pub fps: Fps,
    /// Target bitrate in bits per second.
    pub bitrate_bps: u64,
    /// Requested container and codec.
    pub media_type: MediaType,
    /// Straight RGBA8 color translucent frames are flattened over.
    pub bg_rgba: [u8; 4],
}

impl EncoderConfig {
    /// VP9/WebM at the default bitrate.
    pub fn webm(width: u32, height: u32, fps: Fps) -> Self {
        Self {
            width,
            height,
            fps,
            bitrate_bps: DEFAULT_BITRATE_BPS,
            media_type: MediaType::WEBM_VP9,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Override the bitrate.
    pub fn with_bitrate(mut self, bitrate_bps: u64) -> Self {
        self.bitrate_bps = bitrate_bps;
        self
    }

    /// Reject sizes the yuv420p encoders cannot take.
    pub fn validate(&self) -> GlyphreelResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(GlyphreelError::validation("fps must be non-zero"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(GlyphreelError::validation(
                "encoder width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(GlyphreelError::validation(
                "encoder width/height must be even (required for yuv420p output)",
            ));
        }
        if self.bitrate_bps == 0 {
            return Err(GlyphreelError::validation("encoder bitrate must be > 0"));
        }
        Ok(())
    }
}

/// Sending half of the chunk channel handed to encoders.
pub type ChunkSender = Sender<Vec<u8>>;

/// Streaming encoder contract.
///
/// Frames are pushed in timeline order, one per sampling tick. Compressed output is delivered
/// through the [`ChunkSender`] given at construction, in production order. Every clone of the
/// sender must be dropped by the time [`StreamEncoder::finish`] returns so collectors see the
/// channel close.
pub trait StreamEncoder: Send {
    /// Container and codec this encoder produces.
    fn media_type(&self) -> MediaType;
    /// Encode one frame.
    fn push_frame(&mut self, frame: &FrameRGBA) -> GlyphreelResult<()>;
    /// Flush buffered output and close the stream.
    fn finish(&mut self) -> GlyphreelResult<()>;
}

/// Opens an encoder for a session.
pub type EncoderFactory =
    Arc<dyn Fn(&EncoderConfig, ChunkSender) -> GlyphreelResult<Box<dyn StreamEncoder>> + Send + Sync>;

/// Receives encoder chunks and keeps them in arrival order.
#[derive(Debug)]
pub struct ChunkCollector {
    rx: Receiver<Vec<u8>>,
    chunks: Vec<Vec<u8>>,
    bytes: u64,
    closed: bool,
}

impl ChunkCollector {
    /// New channel: the sender goes to the encoder, the collector stays with the session.
    pub fn channel() -> (ChunkSender, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                rx,
                chunks: Vec::new(),
                bytes: 0,
                closed: false,
            },
        )
    }

    /// Take every chunk already available without blocking.
    pub fn poll(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.accept(chunk),
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    return;
                }
            }
        }
    }

    /// Block until every sender is dropped.
    ///
    /// Gives up when no chunk arrives for `idle_timeout`; whatever was received is kept.
    pub fn drain(&mut self, idle_timeout: Duration) -> GlyphreelResult<()> {
        while !self.closed {
            match self.rx.recv_timeout(idle_timeout) {
                Ok(chunk) => self.accept(chunk),
                Err(RecvTimeoutError::Disconnected) => self.closed = true,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(GlyphreelError::encode(format!(
                        "encoder output stalled for {}s",
                        idle_timeout.as_secs()
                    )));
                }
            }
        }
        Ok(())
    }

    fn accept(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.bytes += chunk.len() as u64;
        self.chunks.push(chunk);
    }

    /// Number of non-empty chunks received.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes received.
    pub fn byte_len(&self) -> u64 {
        self.bytes
    }

    /// `true` once every sender was dropped.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Concatenate chunks in arrival order.
    pub fn concat(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes as usize);
        for chunk in self.chunks {
            out.extend_from_slice(&chunk);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/stream.rs"]
mod tests;
