use std::io::{BufRead as _, BufReader, Read as _};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, anyhow, bail};

use crate::encode::ffmpeg::{FFMPEG_ENV, ffmpeg_program};
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::transcode::progress::FfmpegProgressParser;

/// Environment variable overriding the engine's scratch directory.
pub const ENGINE_DIR_ENV: &str = "GLYPHREEL_ENGINE_DIR";

/// Lowest `ffmpeg` major version the engine accepts.
pub const MIN_FFMPEG_MAJOR: u32 = 4;

/// One command for the engine; file names refer to its scratch directory.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecRequest {
    /// Arguments after the engine's fixed prefix.
    pub args: Vec<String>,
    /// Length of the media being processed, used to scale progress.
    pub expected_duration: Option<Duration>,
}

/// Parsed engine version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineVersion {
    /// Major version; `None` for snapshot builds without a release number.
    pub major: Option<u32>,
    /// Minor version when present.
    pub minor: Option<u32>,
    /// Version token as printed by the engine.
    pub raw: String,
}

/// A loaded conversion engine with its own file namespace.
///
/// Names passed to the file methods are bare file names; the engine decides where they live.
pub trait TranscodeEngine: Send + Sync {
    /// Version of the loaded engine.
    fn version(&self) -> &EngineVersion;
    /// Store `bytes` under `name`.
    fn write_file(&self, name: &str, bytes: &[u8]) -> GlyphreelResult<()>;
    /// Run one command, reporting raw progress fractions to `progress`.
    fn exec(&self, req: &ExecRequest, progress: &mut dyn FnMut(f64)) -> GlyphreelResult<()>;
    /// Read the file stored under `name`.
    fn read_file(&self, name: &str) -> GlyphreelResult<Vec<u8>>;
    /// Delete `name`; missing files are not an error.
    fn remove_file(&self, name: &str) -> GlyphreelResult<()>;
}

/// Creates the engine on first use.
pub trait EngineLoader: Send + Sync {
    /// Load and verify a fresh engine instance.
    fn load(&self) -> GlyphreelResult<Arc<dyn TranscodeEngine>>;
}

/// Where the engine comes from and what it must support.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSource {
    /// Program name or path.
    pub program: String,
    /// Lowest accepted major version.
    pub min_major_version: u32,
    /// Encoder that must be compiled in.
    pub required_encoder: String,
    /// Scratch directory for staged input and output files.
    pub work_dir: PathBuf,
}

impl Default for EngineSource {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_owned(),
            min_major_version: MIN_FFMPEG_MAJOR,
            required_encoder: "libx264".to_owned(),
            work_dir: std::env::temp_dir()
                .join(format!("glyphreel-engine-{}", std::process::id())),
        }
    }
}

impl EngineSource {
    /// Defaults with `$GLYPHREEL_FFMPEG` and `$GLYPHREEL_ENGINE_DIR` applied.
    pub fn from_env() -> Self {
        let mut out = Self {
            program: ffmpeg_program(),
            ..Self::default()
        };
        if let Some(dir) = std::env::var_os(ENGINE_DIR_ENV).filter(|v| !v.is_empty()) {
            out.work_dir = PathBuf::from(dir);
        }
        tracing::debug!(
            program = %out.program,
            work_dir = %out.work_dir.display(),
            env = FFMPEG_ENV,
            "resolved engine source"
        );
        out
    }

    /// Override the program.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Override the scratch directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }
}

impl EngineLoader for EngineSource {
    fn load(&self) -> GlyphreelResult<Arc<dyn TranscodeEngine>> {
        Ok(Arc::new(FfmpegEngine::load(self)?))
    }
}

/// Parse the first line of `ffmpeg -version`.
pub fn parse_version(output: &str) -> Option<EngineVersion> {
    let line = output.lines().next()?;
    let mut words = line.split_whitespace();
    words.find(|w| *w == "version")?;
    let raw = words.next()?.to_owned();

    let trimmed = raw.strip_prefix('n').unwrap_or(&raw);
    let mut parts = trimmed.split(|c: char| !c.is_ascii_digit());
    let major = parts.next().and_then(|p| p.parse::<u32>().ok());
    let minor = major.and(parts.next()).and_then(|p| p.parse::<u32>().ok());
    Some(EngineVersion { major, minor, raw })
}

fn encoder_listed(encoders: &str, name: &str) -> bool {
    encoders
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some(name))
}

/// `ffmpeg` run as a subprocess against a scratch directory.
#[derive(Debug)]
pub struct FfmpegEngine {
    program: String,
    work_dir: PathBuf,
    version: EngineVersion,
}

impl FfmpegEngine {
    /// Check version and encoders, then create the scratch directory.
    pub fn load(source: &EngineSource) -> GlyphreelResult<Self> {
        let out = Command::new(&source.program)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to run '{} -version'", source.program))?;
        if !out.status.success() {
            return Err(anyhow!("'{} -version' exited with {}", source.program, out.status).into());
        }
        let text = String::from_utf8_lossy(&out.stdout);
        let version = parse_version(&text)
            .ok_or_else(|| anyhow!("unrecognized version banner from '{}'", source.program))?;
        match version.major {
            Some(major) if major < source.min_major_version => {
                return Err(anyhow!(
                    "ffmpeg {} is older than the required {}.x",
                    version.raw,
                    source.min_major_version
                )
                .into());
            }
            Some(_) => {}
            None => tracing::warn!(version = %version.raw, "unversioned ffmpeg build; skipping version check"),
        }

        let encoders = Command::new(&source.program)
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to list encoders of '{}'", source.program))?;
        if !encoder_listed(&String::from_utf8_lossy(&encoders.stdout), &source.required_encoder) {
            return Err(anyhow!(
                "ffmpeg {} was built without the '{}' encoder",
                version.raw,
                source.required_encoder
            )
            .into());
        }

        std::fs::create_dir_all(&source.work_dir).with_context(|| {
            format!(
                "failed to create engine directory '{}'",
                source.work_dir.display()
            )
        })?;

        tracing::info!(version = %version.raw, program = %source.program, "transcode engine loaded");
        Ok(Self {
            program: source.program.clone(),
            work_dir: source.work_dir.clone(),
            version,
        })
    }

    /// Scratch directory files are staged in.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn path_of(&self, name: &str) -> GlyphreelResult<PathBuf> {
        let ok = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.starts_with('-');
        if !ok {
            return Err(GlyphreelError::validation(format!(
                "invalid engine file name '{name}'"
            )));
        }
        Ok(self.work_dir.join(name))
    }

    fn run(&self, req: &ExecRequest, progress: &mut dyn FnMut(f64)) -> anyhow::Result<()> {
        let mut child = Command::new(&self.program)
            .current_dir(&self.work_dir)
            .args([
                "-hide_banner",
                "-nostdin",
                "-loglevel",
                "error",
                "-nostats",
                "-progress",
                "pipe:1",
                "-y",
            ])
            .args(&req.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", self.program))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok::<_, std::io::Error>(stderr_bytes)
        });

        let parser = FfmpegProgressParser::new(req.expected_duration);
        for line in BufReader::new(stdout).lines() {
            let line = line.context("failed to read ffmpeg progress")?;
            if let Some(p) = parser.parse_line(&line) {
                progress(p);
            }
        }

        let status = child.wait().context("failed to wait for ffmpeg to finish")?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| anyhow!("ffmpeg stderr drain thread panicked"))?
            .context("ffmpeg stderr read failed")?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            bail!("ffmpeg exited with status {}: {}", status, stderr.trim());
        }
        Ok(())
    }
}

impl TranscodeEngine for FfmpegEngine {
    fn version(&self) -> &EngineVersion {
        &self.version
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> GlyphreelResult<()> {
        let path = self.path_of(name)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(())
    }

    fn exec(&self, req: &ExecRequest, progress: &mut dyn FnMut(f64)) -> GlyphreelResult<()> {
        Ok(self.run(req, progress)?)
    }

    fn read_file(&self, name: &str) -> GlyphreelResult<Vec<u8>> {
        let path = self.path_of(name)?;
        Ok(std::fs::read(&path).with_context(|| format!("failed to read '{}'", path.display()))?)
    }

    fn remove_file(&self, name: &str) -> GlyphreelResult<()> {
        let path = self.path_of(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("failed to remove '{}'", path.display()))
                .into()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transcode/engine.rs"]
mod tests;
