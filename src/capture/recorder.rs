use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::capture::sampler::{self, SamplerJob, SamplerOutcome, SessionStats, SharedStats};
use crate::encode::ffmpeg::{FfmpegWebmEncoder, ffmpeg_program};
use crate::encode::stream::{
    ChunkSender, DEFAULT_BITRATE_BPS, EncoderConfig, EncoderFactory, StreamEncoder,
};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::media::clip::{EncodedClip, MediaType};
use crate::region::VisualRegion;
use crate::region::model::RegionBounds;
use crate::render::backend::{BackendFactory, BackendKind, SurfaceSettings, backend_factory};

/// Options controlling how a [`FrameRecorder`] samples and encodes.
#[derive(Clone, Debug)]
pub struct RecorderOpts {
    /// Sampling rate; one frame per tick.
    pub fps: Fps,
    /// Surface pixels per logical region pixel.
    pub scale: f32,
    /// Encoder bitrate in bits per second.
    pub bitrate_bps: u64,
    /// Surface backend used for resynthesis.
    pub backend: BackendKind,
    /// Opaque color translucent surface pixels are flattened over before encoding (RGBA8).
    pub clear_rgba: [u8; 4],
    /// How long `stop` waits for encoder output to go quiet before giving up.
    pub drain_timeout: Duration,
}

impl Default for RecorderOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            scale: 2.0,
            bitrate_bps: DEFAULT_BITRATE_BPS,
            backend: BackendKind::Cpu,
            clear_rgba: [0, 0, 0, 255],
            drain_timeout: Duration::from_secs(30),
        }
    }
}

impl RecorderOpts {
    /// Override the sampling rate.
    pub fn with_fps(mut self, fps: Fps) -> Self {
        self.fps = fps;
        self
    }

    /// Override the surface scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Override the encoder bitrate.
    pub fn with_bitrate(mut self, bitrate_bps: u64) -> Self {
        self.bitrate_bps = bitrate_bps;
        self
    }

    /// Override the surface backend.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }
}

/// Lifecycle of the current capture session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No session has started yet.
    #[default]
    Idle,
    /// Sampling ticks are running.
    Recording,
    /// `stop` was called; the encoder is flushing.
    Finalizing,
    /// A clip was produced.
    Complete,
    /// Start or finalization failed.
    Failed,
}

/// Snapshot of the current session, for diagnostics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionInfo {
    /// Lifecycle state.
    pub state: SessionState,
    /// Region bounds captured at start.
    pub bounds: Option<RegionBounds>,
    /// Surface size in pixels.
    pub canvas: Option<Canvas>,
    /// Sampling rate.
    pub fps: Fps,
    /// Sampling and encoder counters.
    pub stats: SessionStats,
    /// Last failure, if the session failed.
    pub error: Option<String>,
}

struct Running {
    stop_tx: Sender<()>,
    handle: JoinHandle<Option<SamplerOutcome>>,
    stats: Arc<SharedStats>,
}

#[derive(Default)]
struct Inner {
    info: SessionInfo,
    running: Option<Running>,
}

/// Samples a [`VisualRegion`] at a fixed rate and streams it into a VP9/WebM encoder.
///
/// At most one session runs at a time. Methods take `&self`, so a recorder can be shared between
/// the thread that starts a capture and the one that stops it.
pub struct FrameRecorder {
    opts: RecorderOpts,
    backend_factory: BackendFactory,
    encoder_factory: EncoderFactory,
    inner: Mutex<Inner>,
}

impl FrameRecorder {
    /// Recorder using the configured backend and the system `ffmpeg` encoder.
    pub fn new(opts: RecorderOpts) -> Self {
        let backend = backend_factory(opts.backend);
        let encoder: EncoderFactory = Arc::new(
            |cfg: &EncoderConfig, chunks: ChunkSender| -> GlyphreelResult<Box<dyn StreamEncoder>> {
                let program = ffmpeg_program();
                Ok(Box::new(FfmpegWebmEncoder::spawn(&program, cfg, chunks)?))
            },
        );
        Self {
            opts,
            backend_factory: backend,
            encoder_factory: encoder,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Replace the encoder factory.
    pub fn with_encoder_factory(mut self, factory: EncoderFactory) -> Self {
        self.encoder_factory = factory;
        self
    }

    /// Replace the surface backend factory.
    pub fn with_backend_factory(mut self, factory: BackendFactory) -> Self {
        self.backend_factory = factory;
        self
    }

    /// Options this recorder was built with.
    pub fn opts(&self) -> &RecorderOpts {
        &self.opts
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start sampling `region`.
    ///
    /// Returns once the surface is prepared and the encoder is open; encoding continues in the
    /// background. Fails with [`GlyphreelError::AlreadyRecording`] while a session is active
    /// (that session keeps running) and with [`GlyphreelError::CaptureSetup`] when the region
    /// cannot be measured or styled.
    #[tracing::instrument(skip_all, fields(fps = self.opts.fps.as_f64()))]
    pub fn start(&self, region: Arc<dyn VisualRegion>) -> GlyphreelResult<()> {
        let mut inner = self.lock();
        if matches!(
            inner.info.state,
            SessionState::Recording | SessionState::Finalizing
        ) {
            return Err(GlyphreelError::AlreadyRecording);
        }

        inner.info = SessionInfo {
            fps: self.opts.fps,
            ..SessionInfo::default()
        };
        match self.launch(region, &mut inner.info) {
            Ok(running) => {
                inner.info.state = SessionState::Recording;
                inner.running = Some(running);
                tracing::info!(canvas = ?inner.info.canvas, "capture started");
                Ok(())
            }
            Err(e) => {
                inner.info.state = SessionState::Failed;
                inner.info.error = Some(e.to_string());
                tracing::warn!(error = %e, "capture failed to start");
                Err(e)
            }
        }
    }

    fn launch(
        &self,
        region: Arc<dyn VisualRegion>,
        info: &mut SessionInfo,
    ) -> GlyphreelResult<Running> {
        let bounds = region
            .bounds()
            .ok_or_else(|| GlyphreelError::capture_setup("region is not attached"))?;
        info.bounds = Some(bounds);
        let settings = SurfaceSettings::for_region(bounds, self.opts.scale).map_err(|e| {
            GlyphreelError::capture_setup(format!("region cannot be measured: {e}"))
        })?;
        info.canvas = Some(settings.canvas);

        let encoder_cfg = EncoderConfig {
            width: settings.canvas.width,
            height: settings.canvas.height,
            fps: self.opts.fps,
            bitrate_bps: self.opts.bitrate_bps,
            media_type: MediaType::WEBM_VP9,
            bg_rgba: self.opts.clear_rgba,
        };
        encoder_cfg
            .validate()
            .map_err(|e| GlyphreelError::capture_setup(e.to_string()))?;

        let stats = Arc::new(SharedStats::default());
        let job = SamplerJob {
            region,
            settings,
            encoder_cfg,
            backend_factory: self.backend_factory.clone(),
            encoder_factory: self.encoder_factory.clone(),
            stats: stats.clone(),
            drain_timeout: self.opts.drain_timeout,
        };

        let (stop_tx, stop_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let handle = std::thread::Builder::new()
            .name("glyphreel-sampler".to_owned())
            .spawn(move || sampler::run(job, ready_tx, stop_rx))
            .map_err(|e| {
                GlyphreelError::capture_setup(format!("failed to spawn sampler thread: {e}"))
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Running {
                stop_tx,
                handle,
                stats,
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(GlyphreelError::capture_setup(
                    "sampler thread exited during setup",
                ))
            }
        }
    }

    /// Finalize the running session and return its clip.
    ///
    /// Returns `Ok(None)` when nothing is recording. Blocks until every encoder chunk has been
    /// received.
    #[tracing::instrument(skip_all)]
    pub fn stop(&self) -> GlyphreelResult<Option<EncodedClip>> {
        let running = {
            let mut inner = self.lock();
            if inner.info.state != SessionState::Recording {
                return Ok(None);
            }
            let Some(running) = inner.running.take() else {
                return Ok(None);
            };
            inner.info.state = SessionState::Finalizing;
            running
        };

        let _ = running.stop_tx.send(());
        let joined = running.handle.join();
        let stats = running.stats.snapshot();

        let mut inner = self.lock();
        inner.info.stats = stats;
        let result = match joined {
            Ok(Some(outcome)) => self.finish_clip(outcome),
            Ok(None) => Err(GlyphreelError::encode("sampler exited without output")),
            Err(_) => Err(GlyphreelError::encode("sampler thread panicked")),
        };
        match result {
            Ok(clip) => {
                inner.info.state = SessionState::Complete;
                tracing::info!(
                    bytes = clip.len(),
                    frames = stats.frames_sampled,
                    degraded = stats.frames_degraded,
                    repeated = stats.frames_repeated,
                    "capture complete"
                );
                Ok(Some(clip))
            }
            Err(e) => {
                inner.info.state = SessionState::Failed;
                inner.info.error = Some(e.to_string());
                tracing::warn!(error = %e, "capture failed while finalizing");
                Err(e)
            }
        }
    }

    fn finish_clip(&self, outcome: SamplerOutcome) -> GlyphreelResult<EncodedClip> {
        if outcome.bytes.is_empty() {
            let cause = outcome
                .finish_error
                .map(|e| format!(": {e}"))
                .unwrap_or_default();
            return Err(GlyphreelError::encode(format!(
                "encoder produced no output{cause}"
            )));
        }
        if let Some(e) = &outcome.finish_error {
            tracing::warn!(error = %e, bytes = outcome.bytes.len(), "encoder failed while finalizing; keeping partial output");
        }
        Ok(EncodedClip::new(outcome.bytes, outcome.media_type)
            .with_duration(self.opts.fps.frames_to_duration(outcome.frames)))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.lock().info.state
    }

    /// Snapshot of the current or last session.
    pub fn session(&self) -> SessionInfo {
        let inner = self.lock();
        let mut info = inner.info.clone();
        if let Some(running) = &inner.running {
            info.stats = running.stats.snapshot();
        }
        info
    }
}

impl Drop for FrameRecorder {
    fn drop(&mut self) {
        if self.state() == SessionState::Recording {
            let _ = self.stop();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/recorder.rs"]
mod tests;
