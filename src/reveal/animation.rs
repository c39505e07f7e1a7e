use std::time::Duration;

use crate::animation::ease::Ease;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::region::color::Color;
use crate::region::model::Fragment;
use crate::reveal::RevealStyle;
use crate::reveal::timing::{RevealTimings, sanitize_speed, secs_to_duration};

const CARET: &str = "|";

#[derive(Clone, Debug, PartialEq)]
struct Unit {
    text: String,
    line_break_after: bool,
}

/// A reveal of one text, evaluated at arbitrary elapsed times.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealAnimation {
    units: Vec<Unit>,
    style: RevealStyle,
    speed: f64,
    timings: RevealTimings,
    text_color: Color,
    highlight: Color,
}

fn split_units(text: &str) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    let mut line_start = true;
    for ch in text.chars() {
        match ch {
            '\r' => {}
            '\n' => {
                match units.last_mut() {
                    Some(last) if !line_start => last.line_break_after = true,
                    // blank line: an empty unit carries the break
                    _ => units.push(Unit {
                        text: String::new(),
                        line_break_after: true,
                    }),
                }
                line_start = true;
            }
            _ => {
                units.push(Unit {
                    text: ch.to_string(),
                    line_break_after: false,
                });
                line_start = false;
            }
        }
    }
    units
}

impl RevealAnimation {
    /// Reveal `text` with `style`; `speed` multiplies the pace (`2.0` is twice as fast).
    pub fn new(
        text: &str,
        style: RevealStyle,
        speed: f64,
        timings: RevealTimings,
    ) -> GlyphreelResult<Self> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(GlyphreelError::validation(
                "reveal speed must be finite and > 0",
            ));
        }
        Ok(Self {
            units: split_units(text),
            style,
            speed: sanitize_speed(speed),
            timings,
            text_color: Color::WHITE,
            highlight: Color::rgba8(0xff, 0xe8, 0x9c, 0xff),
        })
    }

    /// Base text color and shimmer highlight color.
    pub fn with_colors(mut self, text: Color, highlight: Color) -> Self {
        self.text_color = text;
        self.highlight = highlight;
        self
    }

    /// Reveal style.
    pub fn style(&self) -> RevealStyle {
        self.style
    }

    /// Time until the text is fully revealed at this animation's speed.
    pub fn reveal_duration(&self) -> GlyphreelResult<Duration> {
        let secs = self.timings.reveal_secs(self.style, self.typed_units()) / self.speed;
        secs_to_duration("reveal length", secs)
    }

    /// Units that take a step to reveal; blank lines take none.
    fn typed_units(&self) -> usize {
        self.units.iter().filter(|u| !u.text.is_empty()).count()
    }

    /// Fragments visible `elapsed` after the reveal began.
    pub fn state_at(&self, elapsed: Duration) -> Vec<Fragment> {
        let t = elapsed.as_secs_f64() * self.speed;
        match self.style {
            RevealStyle::Typewriter => self.typewriter(t),
            RevealStyle::Shimmer => self.shimmer(t),
            RevealStyle::Fluid => self.fluid(t),
            RevealStyle::Handwriting => self.handwriting(t),
        }
    }

    fn fragment(unit: &Unit) -> Fragment {
        let f = Fragment::visible(unit.text.clone());
        if unit.line_break_after {
            f.with_line_break()
        } else {
            f
        }
    }

    fn typewriter(&self, t: f64) -> Vec<Fragment> {
        let step = self.timings.typewriter_char_secs.max(f64::EPSILON);
        let shown = ((t / step).floor().max(0.0) as usize).min(self.typed_units());

        let blink = self.timings.caret_blink_secs;
        let caret_on = blink <= 0.0 || (t.rem_euclid(blink) < blink / 2.0);
        let caret = Fragment::visible(CARET).with_opacity(if caret_on { 1.0 } else { 0.0 });

        let mut out = Vec::with_capacity(self.units.len() + 1);
        if shown == 0 {
            out.push(caret.clone());
        }
        let mut typed = 0usize;
        for unit in &self.units {
            let mut f = Self::fragment(unit);
            if unit.text.is_empty() {
                out.push(f);
                continue;
            }
            typed += 1;
            if typed > shown {
                f.opacity = 0.0;
            }
            if typed == shown {
                // the caret sits before this unit's line break
                let mut caret = caret.clone();
                caret.line_break_after = f.line_break_after;
                f.line_break_after = false;
                out.push(f);
                out.push(caret);
                continue;
            }
            out.push(f);
        }
        out
    }

    fn shimmer(&self, t: f64) -> Vec<Fragment> {
        let fade = self.timings.shimmer_fade_secs;
        let opacity = if fade <= 0.0 {
            1.0
        } else {
            Ease::OutQuad.apply(t / fade)
        };

        let band = self.timings.shimmer_band_chars.max(0.5);
        let sweep = self.timings.shimmer_sweep_secs;
        let progress = if sweep <= 0.0 {
            1.0
        } else {
            ((t - fade) / sweep).clamp(0.0, 1.0)
        };
        let sweeping = t >= fade && progress < 1.0;
        let center = -band + progress * (self.units.len() as f64 + 2.0 * band);

        self.units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let mut f = Self::fragment(unit).with_opacity(opacity as f32);
                let d = ((i as f64 - center).abs() / band).min(1.0);
                if sweeping && d < 1.0 {
                    let h = Ease::InOutCubic.apply(1.0 - d);
                    f = f
                        .with_color(self.text_color.lerp(self.highlight, h))
                        .with_offset_em(0.0, -0.06 * h);
                }
                f
            })
            .collect()
    }

    fn fluid(&self, t: f64) -> Vec<Fragment> {
        let dur = self.timings.fluid_char_secs;
        let rise = self.timings.fluid_rise_em;
        let mut slot = 0usize;
        self.units
            .iter()
            .map(|unit| {
                let start = slot as f64 * self.timings.fluid_stagger_secs;
                if !unit.text.is_empty() {
                    slot += 1;
                }
                let p = if dur <= 0.0 {
                    if t >= start { 1.0 } else { 0.0 }
                } else {
                    (t - start) / dur
                };
                let e = self.timings.fluid_ease.apply(p);
                Self::fragment(unit)
                    .with_opacity(e as f32)
                    .with_offset_em(0.0, (1.0 - e) * rise)
            })
            .collect()
    }

    fn handwriting(&self, t: f64) -> Vec<Fragment> {
        let dur = self.timings.handwriting_char_secs.max(f64::EPSILON);
        let start_scale = self.timings.handwriting_start_scale.clamp(0.0, 1.0);
        let mut slot = 0usize;
        self.units
            .iter()
            .map(|unit| {
                let start = slot as f64 * dur;
                if !unit.text.is_empty() {
                    slot += 1;
                }
                let p = ((t - start) / dur).clamp(0.0, 1.0);
                let sx = start_scale + (1.0 - start_scale) * Ease::OutQuad.apply(p);
                Self::fragment(unit)
                    .with_opacity(Ease::InOutQuad.apply(p) as f32)
                    .with_scale(sx as f32, 1.0)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/animation.rs"]
mod tests;
