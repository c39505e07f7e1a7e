use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::ease::Ease;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::reveal::RevealStyle;

/// Longest recording any clip may ask for, in seconds.
pub const MAX_RECORDING_SECS: f64 = 3600.0;

/// Tuned pacing constants for every reveal style, in seconds at speed `1.0`.
///
/// Loadable from JSON; missing fields keep their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTimings {
    /// Delay between two typed characters.
    pub typewriter_char_secs: f64,
    /// Full caret blink period (on + off).
    pub caret_blink_secs: f64,
    /// Shimmer fade-in length.
    pub shimmer_fade_secs: f64,
    /// Time the highlight band takes to cross the text.
    pub shimmer_sweep_secs: f64,
    /// Half-width of the highlight band, in characters.
    pub shimmer_band_chars: f64,
    /// Delay between two fluid characters starting.
    pub fluid_stagger_secs: f64,
    /// Length of one character's fluid rise.
    pub fluid_char_secs: f64,
    /// Starting drop below the baseline, in em.
    pub fluid_rise_em: f64,
    /// Curve for the fluid rise.
    pub fluid_ease: Ease,
    /// Length of one handwritten character stroke.
    pub handwriting_char_secs: f64,
    /// Horizontal scale a handwritten character starts at.
    pub handwriting_start_scale: f64,
    /// Hold after the reveal before recording may stop, per style.
    pub settle: SettleMargins,
    /// Recommended recordings never go below this.
    pub min_recording_secs: f64,
    /// Recommended recordings never exceed this.
    pub max_recording_secs: f64,
}

/// Extra recording time after each style finishes revealing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleMargins {
    /// Typewriter hold (lets the caret blink a few times).
    pub typewriter: f64,
    /// Shimmer hold.
    pub shimmer: f64,
    /// Fluid hold.
    pub fluid: f64,
    /// Handwriting hold.
    pub handwriting: f64,
}

impl Default for SettleMargins {
    fn default() -> Self {
        Self {
            typewriter: 1.0,
            shimmer: 0.5,
            fluid: 0.6,
            handwriting: 0.8,
        }
    }
}

impl SettleMargins {
    fn validate(&self) -> GlyphreelResult<()> {
        for (name, v) in [
            ("typewriter", self.typewriter),
            ("shimmer", self.shimmer),
            ("fluid", self.fluid),
            ("handwriting", self.handwriting),
        ] {
            check_secs(&format!("settle.{name}"), v)?;
        }
        Ok(())
    }

    /// Margin for `style`.
    pub fn for_style(&self, style: RevealStyle) -> f64 {
        match style {
            RevealStyle::Typewriter => self.typewriter,
            RevealStyle::Shimmer => self.shimmer,
            RevealStyle::Fluid => self.fluid,
            RevealStyle::Handwriting => self.handwriting,
        }
    }
}

impl Default for RevealTimings {
    fn default() -> Self {
        Self {
            typewriter_char_secs: 0.08,
            caret_blink_secs: 1.0,
            shimmer_fade_secs: 0.8,
            shimmer_sweep_secs: 1.4,
            shimmer_band_chars: 3.0,
            fluid_stagger_secs: 0.05,
            fluid_char_secs: 0.6,
            fluid_rise_em: 0.45,
            fluid_ease: Ease::OutCubic,
            handwriting_char_secs: 0.14,
            handwriting_start_scale: 0.6,
            settle: SettleMargins::default(),
            min_recording_secs: 1.5,
            max_recording_secs: 60.0,
        }
    }
}

/// Number of animated units in `text`: every character except line breaks.
pub(crate) fn unit_count(text: &str) -> usize {
    text.chars().filter(|c| *c != '\n' && *c != '\r').count()
}

fn check_secs(name: &str, v: f64) -> GlyphreelResult<()> {
    if !v.is_finite() || !(0.0..=MAX_RECORDING_SECS).contains(&v) {
        return Err(GlyphreelError::validation(format!(
            "timings.{name} must be within 0..={MAX_RECORDING_SECS}, got {v}"
        )));
    }
    Ok(())
}

/// Seconds as a [`Duration`], rejecting values a `Duration` cannot hold.
pub(crate) fn secs_to_duration(what: &str, secs: f64) -> GlyphreelResult<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| GlyphreelError::validation(format!("{what} of {secs}s is not a duration: {e}")))
}

/// `speed` when usable, else `1.0`.
pub(crate) fn sanitize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        1.0
    }
}

impl RevealTimings {
    /// Reject values that are negative, non-finite or longer than [`MAX_RECORDING_SECS`].
    pub fn validate(&self) -> GlyphreelResult<()> {
        for (name, v) in [
            ("typewriter_char_secs", self.typewriter_char_secs),
            ("caret_blink_secs", self.caret_blink_secs),
            ("shimmer_fade_secs", self.shimmer_fade_secs),
            ("shimmer_sweep_secs", self.shimmer_sweep_secs),
            ("shimmer_band_chars", self.shimmer_band_chars),
            ("fluid_stagger_secs", self.fluid_stagger_secs),
            ("fluid_char_secs", self.fluid_char_secs),
            ("fluid_rise_em", self.fluid_rise_em),
            ("handwriting_char_secs", self.handwriting_char_secs),
            ("handwriting_start_scale", self.handwriting_start_scale),
            ("min_recording_secs", self.min_recording_secs),
            ("max_recording_secs", self.max_recording_secs),
        ] {
            check_secs(name, v)?;
        }
        if self.min_recording_secs > self.max_recording_secs {
            return Err(GlyphreelError::validation(
                "timings.min_recording_secs must not exceed max_recording_secs",
            ));
        }
        self.settle.validate()
    }

    /// Seconds at speed `1.0` until every unit of an `units`-long text is fully revealed.
    pub fn reveal_secs(&self, style: RevealStyle, units: usize) -> f64 {
        let n = units as f64;
        let secs = match style {
            RevealStyle::Typewriter => n * self.typewriter_char_secs,
            RevealStyle::Shimmer => self.shimmer_fade_secs + self.shimmer_sweep_secs,
            RevealStyle::Fluid if units == 0 => 0.0,
            RevealStyle::Fluid => (n - 1.0) * self.fluid_stagger_secs + self.fluid_char_secs,
            RevealStyle::Handwriting => n * self.handwriting_char_secs,
        };
        secs.max(0.0)
    }

    /// Minimum recording time for `text` so the reveal is captured in full.
    ///
    /// Fails when the timings are out of range (see [`RevealTimings::validate`]).
    pub fn estimate_duration(
        &self,
        text: &str,
        style: RevealStyle,
        speed: f64,
    ) -> GlyphreelResult<Duration> {
        self.validate()?;
        let reveal = self.reveal_secs(style, unit_count(text)) / sanitize_speed(speed);
        let total = reveal + self.settle.for_style(style);
        secs_to_duration(
            "recording length",
            total.clamp(self.min_recording_secs, self.max_recording_secs),
        )
    }
}

/// [`RevealTimings::estimate_duration`] with default timings.
pub fn estimate_duration(text: &str, style: RevealStyle, speed: f64) -> GlyphreelResult<Duration> {
    RevealTimings::default().estimate_duration(text, style, speed)
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/timing.rs"]
mod tests;
