use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::anyhow;

use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::media::clip::{EncodedClip, MediaType};
use crate::transcode::engine::{EngineLoader, EngineSource, ExecRequest, TranscodeEngine};
use crate::transcode::progress::ProgressTracker;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

/// Converts captured WebM/VP9 clips into MP4/H.264 (yuv420p, `+faststart`).
///
/// The engine is loaded on first use and kept for the life of the transcoder; a failed load is
/// retried on the next call. Conversions are serialized.
pub struct Transcoder {
    loader: Arc<dyn EngineLoader>,
    engine: OnceLock<Arc<dyn TranscodeEngine>>,
    init: Mutex<()>,
    jobs: Mutex<()>,
    instance: u64,
    next_job: AtomicU64,
}

impl Transcoder {
    /// Transcoder backed by `loader`.
    pub fn new(loader: impl EngineLoader + 'static) -> Self {
        Self::with_loader(Arc::new(loader))
    }

    /// Transcoder backed by a shared loader.
    pub fn with_loader(loader: Arc<dyn EngineLoader>) -> Self {
        Self {
            loader,
            engine: OnceLock::new(),
            init: Mutex::new(()),
            jobs: Mutex::new(()),
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            next_job: AtomicU64::new(0),
        }
    }

    /// Process-wide transcoder using [`EngineSource::from_env`].
    pub fn global() -> &'static Transcoder {
        static GLOBAL: OnceLock<Transcoder> = OnceLock::new();
        GLOBAL.get_or_init(|| Transcoder::new(EngineSource::from_env()))
    }

    /// Load the engine unless it is already loaded.
    pub fn ensure_engine_loaded(&self) -> GlyphreelResult<Arc<dyn TranscodeEngine>> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine.clone());
        }
        let _init = self
            .init
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(engine) = self.engine.get() {
            return Ok(engine.clone());
        }
        let engine = self
            .loader
            .load()
            .map_err(|e| as_transcode("engine failed to load", e))?;
        let _ = self.engine.set(engine.clone());
        Ok(engine)
    }

    /// `true` once an engine load has succeeded.
    pub fn is_engine_loaded(&self) -> bool {
        self.engine.get().is_some()
    }

    /// Convert `clip` to MP4/H.264, reporting non-decreasing progress in `[0, 1]`.
    ///
    /// Completion is signaled by the return value; progress may stop short of `1.0`.
    #[tracing::instrument(skip_all, fields(bytes = clip.len()))]
    pub fn convert(
        &self,
        clip: &EncodedClip,
        progress: &mut dyn FnMut(f64),
    ) -> GlyphreelResult<EncodedClip> {
        if clip.is_empty() {
            return Err(GlyphreelError::transcode(
                "source clip is empty",
                anyhow!("zero-byte input"),
            ));
        }
        if clip.media_type() != MediaType::WEBM_VP9 {
            return Err(GlyphreelError::transcode(
                "unsupported source clip",
                anyhow!("expected {}, got {}", MediaType::WEBM_VP9, clip.media_type()),
            ));
        }

        let engine = self.ensure_engine_loaded()?;
        let _job = self
            .jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let n = self.next_job.fetch_add(1, Ordering::Relaxed);
        let stem = format!("job-{}-{}-{}", std::process::id(), self.instance, n);
        let input = format!("{stem}-input.{}", clip.media_type().extension());
        let output = format!("{stem}-output.{}", MediaType::MP4_H264.extension());
        let _scratch = ScratchGuard {
            engine: engine.as_ref(),
            names: [input.clone(), output.clone()],
        };

        engine
            .write_file(&input, clip.bytes())
            .map_err(|e| as_transcode("failed to stage source clip", e))?;

        let req = ExecRequest {
            args: mp4_args(&input, &output),
            expected_duration: clip.duration(),
        };
        let mut tracker = ProgressTracker::new(progress);
        engine
            .exec(&req, &mut |p| tracker.update(p))
            .map_err(|e| as_transcode("conversion failed", e))?;
        tracing::debug!(last_progress = ?tracker.last(), "conversion command finished");

        let bytes = engine
            .read_file(&output)
            .map_err(|e| as_transcode("failed to read converted clip", e))?;
        if bytes.is_empty() {
            return Err(GlyphreelError::transcode(
                "conversion produced no output",
                anyhow!("'{output}' is empty"),
            ));
        }

        let mut out = EncodedClip::new(bytes, MediaType::MP4_H264);
        if let Some(d) = clip.duration() {
            out = out.with_duration(d);
        }
        tracing::info!(bytes = out.len(), "transcode complete");
        Ok(out)
    }
}

/// Arguments converting `input` to a progressive-playback H.264 MP4 at `output`.
pub(crate) fn mp4_args(input: &str, output: &str) -> Vec<String> {
    [
        "-i",
        input,
        "-an",
        "-c:v",
        "libx264",
        "-preset",
        "veryfast",
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
        output,
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect()
}

fn as_transcode(msg: &str, e: GlyphreelError) -> GlyphreelError {
    if e.is_transcode() {
        e
    } else {
        GlyphreelError::transcode(msg, e)
    }
}

struct ScratchGuard<'a> {
    engine: &'a dyn TranscodeEngine,
    names: [String; 2],
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        for name in &self.names {
            if let Err(e) = self.engine.remove_file(name) {
                tracing::debug!(file = %name, error = %e, "failed to remove scratch file");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcode/transcoder.rs"]
mod tests;
