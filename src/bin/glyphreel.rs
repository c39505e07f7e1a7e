use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use glyphreel::{
    BackendKind, ClipConfig, Delivery, DirectorySaver, EncodedClip, FontSource, FrameRecorder,
    GlyphreelError, RevealStyle, SurfaceBackend as _, SurfaceSettings, Transcoder, VisualRegion, create_backend,
    deliver_with_fallback, probe_duration, timestamped_filename,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "glyphreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Animate text live, capture it and save an MP4 (WebM if conversion fails).
    Record(RecordArgs),
    /// Convert an existing WebM clip to MP4 (requires `ffmpeg` with libx264).
    Transcode(TranscodeArgs),
    /// Render one instant of a reveal as a PNG.
    Frame(FrameArgs),
    /// Print the recommended recording length in seconds.
    Estimate(EstimateArgs),
}

#[derive(Args, Debug)]
struct ClipArgs {
    /// Clip config JSON; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text to reveal (`\n` for new lines).
    #[arg(long)]
    text: Option<String>,

    /// Reveal style.
    #[arg(long, value_enum)]
    style: Option<RevealStyle>,

    /// Pace multiplier.
    #[arg(long)]
    speed: Option<f64>,

    /// Installed font family.
    #[arg(long, conflicts_with = "font_file")]
    font_family: Option<String>,

    /// Font file (.ttf/.otf).
    #[arg(long)]
    font_file: Option<PathBuf>,

    /// Font size in logical pixels.
    #[arg(long)]
    size: Option<f32>,

    /// Region width in logical pixels.
    #[arg(long)]
    width: Option<f32>,

    /// Region height in logical pixels.
    #[arg(long)]
    height: Option<f32>,

    /// Surface pixels per logical pixel.
    #[arg(long)]
    scale: Option<f32>,

    /// Sampling rate.
    #[arg(long)]
    fps: Option<u32>,
}

impl ClipArgs {
    fn into_config(self) -> anyhow::Result<ClipConfig> {
        let mut cfg = match (&self.config, &self.text) {
            (Some(path), _) => ClipConfig::from_path(path)?,
            (None, Some(text)) => ClipConfig::new(text.clone()),
            (None, None) => anyhow::bail!("either --config or --text is required"),
        };
        if let Some(text) = self.text {
            cfg.text = text.replace("\\n", "\n");
        }
        if let Some(style) = self.style {
            cfg.style = style;
        }
        if let Some(speed) = self.speed {
            cfg.speed = speed;
        }
        if let Some(family) = self.font_family {
            cfg.theme.font = FontSource::System { family };
        }
        if let Some(path) = self.font_file {
            cfg.theme.font = FontSource::File(path);
        }
        if let Some(size) = self.size {
            cfg.theme.size_px = size;
        }
        if let Some(width) = self.width {
            cfg.width = width;
        }
        if let Some(height) = self.height {
            cfg.height = height;
        }
        if let Some(scale) = self.scale {
            cfg.scale = scale;
        }
        if let Some(fps) = self.fps {
            cfg.fps = fps;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    clip: ClipArgs,

    /// Recording length in seconds (default: estimated from the text).
    #[arg(long)]
    duration: Option<f64>,

    /// Directory the clip is saved into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// File name prefix.
    #[arg(long, default_value = "glyphreel")]
    prefix: String,

    /// Keep the WebM capture and skip MP4 conversion.
    #[arg(long, default_value_t = false)]
    no_transcode: bool,
}

#[derive(Parser, Debug)]
struct TranscodeArgs {
    /// Input WebM clip.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path (default: input with `.mp4`).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    clip: ClipArgs,

    /// Seconds since the reveal began.
    #[arg(long, default_value_t = 1.0)]
    at: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct EstimateArgs {
    #[command(flatten)]
    clip: ClipArgs,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Record(args) => cmd_record(args),
        Command::Transcode(args) => cmd_transcode(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Estimate(args) => cmd_estimate(args),
    }
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let mut cfg = args.clip.into_config()?;
    if args.duration.is_some() {
        cfg.duration_secs = args.duration;
        cfg.validate()?;
    }

    let recorder = FrameRecorder::new(cfg.recorder_opts()?);
    let region = Arc::new(cfg.reveal_region()?);
    let length = cfg.recording_duration()?;

    recorder.start(region.clone() as Arc<dyn VisualRegion>)?;
    region.begin();
    eprintln!(
        "recording {} reveal for {:.2}s",
        cfg.style,
        length.as_secs_f64()
    );
    std::thread::sleep(length);

    let clip = recorder
        .stop()?
        .context("capture produced no clip")?;
    let stats = recorder.session().stats;
    eprintln!(
        "captured {} frames ({} repeated, {} degraded), {} bytes",
        stats.frames_sampled,
        stats.frames_repeated,
        stats.frames_degraded,
        clip.len()
    );

    let saver = DirectorySaver::new(&args.out_dir);
    if args.no_transcode {
        let filename = timestamped_filename(&args.prefix, &clip);
        let path = saver.try_save(&clip, &filename)?;
        eprintln!("wrote {}", path.display());
        return Ok(());
    }

    let delivery = deliver_with_fallback(
        Transcoder::global(),
        &clip,
        &args.prefix,
        &saver,
        &mut print_progress,
    );
    eprintln!();
    let path = saver.path_for(delivery.filename())?;
    match &delivery {
        Delivery::Transcoded { .. } => eprintln!("wrote {}", path.display()),
        Delivery::Fallback { error, .. } => {
            eprintln!("mp4 conversion failed ({error}); wrote {}", path.display())
        }
    }
    Ok(())
}

fn cmd_transcode(args: TranscodeArgs) -> anyhow::Result<()> {
    let mut clip = EncodedClip::from_path(&args.in_path)?;
    match probe_duration(&args.in_path) {
        Ok(d) => clip = clip.with_duration(d),
        Err(e) => tracing::warn!(
            path = %args.in_path.display(),
            "clip duration unknown, progress reports completion only: {e}"
        ),
    }
    let out = args
        .out
        .unwrap_or_else(|| args.in_path.with_extension("mp4"));

    let converted = Transcoder::global().convert(&clip, &mut print_progress)?;
    eprintln!();
    write_file(&out, converted.bytes())?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let at = Duration::try_from_secs_f64(args.at).map_err(|e| {
        GlyphreelError::validation(format!("--at {} is not a valid time: {e}", args.at))
    })?;
    let cfg = args.clip.into_config()?;
    let region = cfg.reveal_region()?;
    let state = region.state_at(at);

    let settings = SurfaceSettings::for_region(cfg.bounds(), cfg.scale)?;
    let mut backend = create_backend(BackendKind::Cpu, &settings)?;
    backend.prepare(&state.style)?;
    let frame = backend.draw(&state)?;
    let rgba = frame.to_opaque_rgba8(cfg.recorder_opts()?.clear_rgba)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_estimate(args: EstimateArgs) -> anyhow::Result<()> {
    let cfg = args.clip.into_config()?;
    println!("{:.2}", cfg.recording_duration()?.as_secs_f64());
    Ok(())
}

fn print_progress(p: f64) {
    eprint!("\rconverting {:>3.0}%", p * 100.0);
    let _ = std::io::stderr().flush();
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
