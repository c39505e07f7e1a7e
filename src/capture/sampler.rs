use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::time::{Duration, Instant};

use crate::encode::stream::{ChunkCollector, EncoderConfig, EncoderFactory, StreamEncoder};
use crate::foundation::core::Fps;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::media::clip::MediaType;
use crate::region::VisualRegion;
use crate::render::backend::{BackendFactory, FrameRGBA, SurfaceBackend, SurfaceSettings};

/// Counters for one capture session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames handed to the encoder, repeats included.
    pub frames_sampled: u64,
    /// Ticks whose redraw or encode failed.
    pub frames_degraded: u64,
    /// Frames repeated to fill deadlines missed by slow ticks.
    pub frames_repeated: u64,
    /// Compressed chunks received so far.
    pub chunks: u64,
    /// Compressed bytes received so far.
    pub bytes: u64,
}

#[derive(Debug, Default)]
pub(crate) struct SharedStats {
    sampled: AtomicU64,
    degraded: AtomicU64,
    repeated: AtomicU64,
    chunks: AtomicU64,
    bytes: AtomicU64,
}

impl SharedStats {
    pub(crate) fn snapshot(&self) -> SessionStats {
        SessionStats {
            frames_sampled: self.sampled.load(Ordering::Relaxed),
            frames_degraded: self.degraded.load(Ordering::Relaxed),
            frames_repeated: self.repeated.load(Ordering::Relaxed),
            chunks: self.chunks.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }

    fn record_collector(&self, collector: &ChunkCollector) {
        self.chunks
            .store(collector.chunk_count() as u64, Ordering::Relaxed);
        self.bytes.store(collector.byte_len(), Ordering::Relaxed);
    }
}

/// Everything the sampler thread needs, moved in at spawn.
pub(crate) struct SamplerJob {
    pub(crate) region: Arc<dyn VisualRegion>,
    pub(crate) settings: SurfaceSettings,
    pub(crate) encoder_cfg: EncoderConfig,
    pub(crate) backend_factory: BackendFactory,
    pub(crate) encoder_factory: EncoderFactory,
    pub(crate) stats: Arc<SharedStats>,
    pub(crate) drain_timeout: Duration,
}

/// What the sampler thread hands back when it exits.
#[derive(Debug)]
pub(crate) struct SamplerOutcome {
    pub(crate) bytes: Vec<u8>,
    pub(crate) media_type: MediaType,
    pub(crate) frames: u64,
    /// Error raised while finalizing; output may still be partially present.
    pub(crate) finish_error: Option<GlyphreelError>,
}

struct Sampler {
    region: Arc<dyn VisualRegion>,
    backend: Box<dyn SurfaceBackend>,
    encoder: Box<dyn StreamEncoder>,
    collector: ChunkCollector,
    fps: Fps,
    fallback: FrameRGBA,
    stats: Arc<SharedStats>,
    drain_timeout: Duration,
}

/// Thread body: set up, report readiness, then sample until `stop_rx` fires or disconnects.
///
/// `None` means setup failed and was reported through `ready`.
pub(crate) fn run(
    job: SamplerJob,
    ready: SyncSender<GlyphreelResult<()>>,
    stop_rx: Receiver<()>,
) -> Option<SamplerOutcome> {
    match Sampler::setup(job) {
        Ok(sampler) => {
            let _ = ready.send(Ok(()));
            Some(sampler.run(stop_rx))
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            None
        }
    }
}

fn setup_error(what: &str, e: GlyphreelError) -> GlyphreelError {
    match e {
        GlyphreelError::CaptureSetup(_) => e,
        other => GlyphreelError::capture_setup(format!("{what}: {other}")),
    }
}

impl Sampler {
    fn setup(job: SamplerJob) -> GlyphreelResult<Self> {
        let mut backend = (job.backend_factory)(&job.settings)
            .map_err(|e| setup_error("surface could not be created", e))?;
        let initial = job
            .region
            .current_visible_state()
            .map_err(|e| setup_error("region state could not be read", e))?;
        backend
            .prepare(&initial.style)
            .map_err(|e| setup_error("region styling could not be resolved", e))?;

        let (chunks_tx, collector) = ChunkCollector::channel();
        let encoder = (job.encoder_factory)(&job.encoder_cfg, chunks_tx)
            .map_err(|e| setup_error("encoder could not be opened", e))?;

        let fallback = FrameRGBA::solid(job.settings.canvas, job.encoder_cfg.bg_rgba);
        Ok(Self {
            region: job.region,
            backend,
            encoder,
            collector,
            fps: job.encoder_cfg.fps,
            fallback,
            stats: job.stats,
            drain_timeout: job.drain_timeout,
        })
    }

    fn run(mut self, stop_rx: Receiver<()>) -> SamplerOutcome {
        let started = Instant::now();
        let mut next_slot = 0u64;
        let mut last: Option<FrameRGBA> = None;

        loop {
            let due = self.fps.duration_to_frames_floor(started.elapsed());
            if due > next_slot
                && let Some(frame) = last.as_ref()
            {
                for _ in next_slot..due {
                    self.push(frame);
                    self.stats.repeated.fetch_add(1, Ordering::Relaxed);
                }
                next_slot = due;
            }

            self.tick(&mut last);
            next_slot += 1;
            self.collector.poll();
            self.stats.record_collector(&self.collector);

            let deadline = started + self.fps.frames_to_duration(next_slot);
            match stop_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.finalize()
    }

    fn tick(&mut self, last: &mut Option<FrameRGBA>) {
        let drawn = self
            .region
            .current_visible_state()
            .and_then(|state| self.backend.draw(&state));
        match drawn {
            Ok(frame) => *last = Some(frame),
            Err(e) => {
                self.stats.degraded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %e, "degraded frame, repeating previous");
            }
        }
        let frame = last.get_or_insert_with(|| self.fallback.clone());
        self.push(frame);
    }

    fn push(&mut self, frame: &FrameRGBA) {
        match self.encoder.push_frame(frame) {
            Ok(()) => {
                self.stats.sampled.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.degraded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %e, "encoder rejected frame");
            }
        }
    }

    fn finalize(self) -> SamplerOutcome {
        let Self {
            mut encoder,
            mut collector,
            stats,
            drain_timeout,
            ..
        } = self;
        let media_type = encoder.media_type();
        let mut finish_error = encoder.finish().err();
        drop(encoder);

        if let Err(e) = collector.drain(drain_timeout) {
            finish_error.get_or_insert(e);
        }
        stats.record_collector(&collector);
        let frames = stats.snapshot().frames_sampled;
        SamplerOutcome {
            bytes: collector.concat(),
            media_type,
            frames,
            finish_error,
        }
    }
}
