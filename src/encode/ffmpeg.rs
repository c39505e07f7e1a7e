use std::io::{Read, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::stream::{ChunkSender, EncoderConfig, StreamEncoder};
use crate::foundation::core::Fps;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::foundation::math::flatten_premul_over_bg_to_opaque_rgba8;
use crate::media::clip::{MediaType, VideoCodec};
use crate::render::backend::FrameRGBA;

/// Environment variable naming the `ffmpeg` executable.
pub const FFMPEG_ENV: &str = "GLYPHREEL_FFMPEG";

const READ_CHUNK: usize = 64 * 1024;

/// Resolve the `ffmpeg` program: `$GLYPHREEL_FFMPEG`, else `ffmpeg` on `PATH`.
pub fn ffmpeg_program() -> String {
    std::env::var(FFMPEG_ENV)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "ffmpeg".to_owned())
}

/// Streams raw frames into a system `ffmpeg` producing VP9 in WebM on stdout.
///
/// stdout is read on its own thread and forwarded as chunks; stderr is drained on another so
/// neither pipe can fill up and stall the encoder.
pub struct FfmpegWebmEncoder {
    cfg: EncoderConfig,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_reader: Option<JoinHandle<std::io::Result<u64>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    frames: u64,
}

impl FfmpegWebmEncoder {
    /// Spawn `program` for `cfg`, forwarding its output to `chunks`.
    pub fn spawn(program: &str, cfg: &EncoderConfig, chunks: ChunkSender) -> GlyphreelResult<Self> {
        cfg.validate()?;
        if cfg.media_type.codec != VideoCodec::Vp9 {
            return Err(GlyphreelError::validation(format!(
                "ffmpeg stream encoder only produces webm/vp9, not {}",
                cfg.media_type
            )));
        }

        let mut cmd = Command::new(program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args(webm_args(cfg));

        let mut child = cmd.spawn().map_err(|e| {
            GlyphreelError::encode(format!(
                "failed to spawn '{program}' (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GlyphreelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| GlyphreelError::encode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| GlyphreelError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        let stdout_reader = std::thread::Builder::new()
            .name("glyphreel-encoder-out".to_owned())
            .spawn(move || {
                let mut total = 0u64;
                let mut buf = vec![0u8; READ_CHUNK];
                loop {
                    let n = stdout.read(&mut buf)?;
                    if n == 0 {
                        return Ok(total);
                    }
                    total += n as u64;
                    if chunks.send(buf[..n].to_vec()).is_err() {
                        // Collector is gone; keep draining so ffmpeg can exit.
                        std::io::copy(&mut stdout, &mut std::io::sink())?;
                        return Ok(total);
                    }
                }
            })
            .map_err(|e| GlyphreelError::encode(format!("failed to spawn reader thread: {e}")))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            bitrate = cfg.bitrate_bps,
            "spawned ffmpeg webm encoder"
        );
        Ok(Self {
            cfg: cfg.clone(),
            child: Some(child),
            stdin: Some(stdin),
            stdout_reader: Some(stdout_reader),
            stderr_drain: Some(stderr_drain),
            scratch: vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4],
            frames: 0,
        })
    }
}

/// Argument list for a rawvideo-in, WebM-out `ffmpeg` run.
pub(crate) fn webm_args(cfg: &EncoderConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();
    args.push(format!("{}x{}", cfg.width, cfg.height));
    args.extend(input_fps_args(cfg.fps));
    args.extend(
        [
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libvpx-vp9",
            "-b:v",
        ]
        .iter()
        .map(|s| (*s).to_owned()),
    );
    args.push(cfg.bitrate_bps.to_string());
    args.extend(
        [
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-row-mt",
            "1",
            "-pix_fmt",
            "yuv420p",
            "-f",
            "webm",
            "pipe:1",
        ]
        .iter()
        .map(|s| (*s).to_owned()),
    );
    args
}

fn input_fps_args(fps: Fps) -> [String; 2] {
    // For rawvideo input, `-r` goes before `-i`; rational rates are passed as `num/den`.
    ["-r".to_owned(), format!("{}/{}", fps.num, fps.den)]
}

impl StreamEncoder for FfmpegWebmEncoder {
    fn media_type(&self) -> MediaType {
        self.cfg.media_type
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> GlyphreelResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(GlyphreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.cfg.bg_rgba)?;
        } else {
            let opaque = frame.to_opaque_rgba8(self.cfg.bg_rgba)?;
            self.scratch.copy_from_slice(&opaque);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(GlyphreelError::encode("ffmpeg encoder is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            GlyphreelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> GlyphreelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| GlyphreelError::encode("ffmpeg encoder already finished"))?;

        let read = match self.stdout_reader.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| GlyphreelError::encode("ffmpeg stdout reader thread panicked"))?
                .map_err(|e| GlyphreelError::encode(format!("ffmpeg stdout read failed: {e}")))?,
            None => 0,
        };
        let status = child.wait().map_err(|e| {
            GlyphreelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| GlyphreelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| GlyphreelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(GlyphreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        tracing::debug!(frames = self.frames, bytes = read, "ffmpeg webm encoder finished");
        Ok(())
    }
}

impl Drop for FfmpegWebmEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stdout_reader.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> GlyphreelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when [`ffmpeg_program`] can be invoked.
pub fn is_ffmpeg_on_path() -> bool {
    is_program_runnable(&ffmpeg_program())
}

/// Return `true` when `program -version` exits successfully.
pub fn is_program_runnable(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
