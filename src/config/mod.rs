//! JSON clip descriptions: what to reveal, how it looks and how it is captured.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capture::recorder::RecorderOpts;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::region::model::{RegionBounds, StyleSnapshot};
use crate::reveal::RevealStyle;
use crate::reveal::animation::RevealAnimation;
use crate::reveal::region::RevealRegion;
use crate::reveal::timing::{MAX_RECORDING_SECS, RevealTimings, secs_to_duration};

/// One clip to record.
///
/// ```json
/// {
///   "text": "Hello,\nworld",
///   "style": "fluid",
///   "speed": 1.5,
///   "theme": { "size_px": 72, "color": "#ffffff", "background": "#101820" },
///   "width": 960,
///   "height": 540
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClipConfig {
    /// Text to reveal. `\n` starts a new line.
    pub text: String,
    /// Reveal effect.
    #[serde(default)]
    pub style: RevealStyle,
    /// Pace multiplier (`2.0` reveals twice as fast).
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Font, size, colors and overlay.
    #[serde(default)]
    pub theme: StyleSnapshot,
    /// Region width in logical pixels.
    #[serde(default = "default_width")]
    pub width: f32,
    /// Region height in logical pixels.
    #[serde(default = "default_height")]
    pub height: f32,
    /// Sampling rate in frames per second.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Surface pixels per logical pixel.
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Encoder bitrate override.
    #[serde(default)]
    pub bitrate_bps: Option<u64>,
    /// Fixed recording length; estimated from the text when absent.
    #[serde(default)]
    pub duration_secs: Option<f64>,
    /// Pacing overrides; missing fields keep their defaults.
    #[serde(default)]
    pub timings: RevealTimings,
}

fn default_speed() -> f64 {
    1.0
}

fn default_width() -> f32 {
    960.0
}

fn default_height() -> f32 {
    540.0
}

fn default_fps() -> u32 {
    30
}

fn default_scale() -> f32 {
    2.0
}

impl ClipConfig {
    /// Config for `text` with every other field at its default.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RevealStyle::default(),
            speed: default_speed(),
            theme: StyleSnapshot::default(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            scale: default_scale(),
            bitrate_bps: None,
            duration_secs: None,
            timings: RevealTimings::default(),
        }
    }

    /// Parse a clip config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> GlyphreelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| GlyphreelError::serde(format!("parse clip config JSON: {e}")))
    }

    /// Parse a clip config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GlyphreelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GlyphreelError::validation(format!("open clip config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check every field that could only fail later, mid-capture.
    pub fn validate(&self) -> GlyphreelResult<()> {
        if self.text.trim().is_empty() {
            return Err(GlyphreelError::validation("clip text is empty"));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(GlyphreelError::validation(
                "clip speed must be finite and > 0",
            ));
        }
        if let Some(secs) = self.duration_secs
            && (!secs.is_finite() || secs <= 0.0 || secs > MAX_RECORDING_SECS)
        {
            return Err(GlyphreelError::validation(format!(
                "clip duration_secs must be within (0, {MAX_RECORDING_SECS}], got {secs}"
            )));
        }
        if self.bitrate_bps == Some(0) {
            return Err(GlyphreelError::validation("clip bitrate_bps must be > 0"));
        }
        self.timings.validate()?;
        self.theme.validate()?;
        self.bounds().validate()?;
        self.fps()?;
        self.canvas()?;
        Ok(())
    }

    /// Region bounds at the origin.
    pub fn bounds(&self) -> RegionBounds {
        RegionBounds::from_size(self.width, self.height)
    }

    /// Sampling rate.
    pub fn fps(&self) -> GlyphreelResult<Fps> {
        Fps::per_second(self.fps)
    }

    /// Surface size the region is resynthesized at.
    pub fn canvas(&self) -> GlyphreelResult<Canvas> {
        Canvas::scaled(self.width, self.height, self.scale)
    }

    /// Recorder options for this clip.
    pub fn recorder_opts(&self) -> GlyphreelResult<RecorderOpts> {
        let mut opts = RecorderOpts::default()
            .with_fps(self.fps()?)
            .with_scale(self.scale);
        if let Some(bitrate) = self.bitrate_bps {
            opts = opts.with_bitrate(bitrate);
        }
        let [r, g, b, _] = self.theme.background.to_rgba8();
        opts.clear_rgba = [r, g, b, 255];
        Ok(opts)
    }

    /// The reveal animation described by this clip.
    pub fn animation(&self) -> GlyphreelResult<RevealAnimation> {
        RevealAnimation::new(&self.text, self.style, self.speed, self.timings.clone())
    }

    /// A region showing the reveal, ready to [`RevealRegion::begin`].
    pub fn reveal_region(&self) -> GlyphreelResult<RevealRegion> {
        Ok(RevealRegion::new(
            self.animation()?,
            self.theme.clone(),
            self.bounds(),
        ))
    }

    /// How long to record: `duration_secs` when set, else the estimate for text, style and speed.
    pub fn recording_duration(&self) -> GlyphreelResult<Duration> {
        match self.duration_secs {
            Some(secs) => secs_to_duration("clip duration_secs", secs),
            None => self
                .timings
                .estimate_duration(&self.text, self.style, self.speed),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/clip.rs"]
mod tests;
