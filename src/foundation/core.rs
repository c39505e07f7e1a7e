use std::time::Duration;

use crate::foundation::error::{GlyphreelError, GlyphreelResult};

pub use kurbo::{Affine, Point, Vec2};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> GlyphreelResult<Self> {
        if den == 0 {
            return Err(GlyphreelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(GlyphreelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number rate, e.g. `Fps::per_second(30)`.
    pub fn per_second(num: u32) -> GlyphreelResult<Self> {
        Self::new(num, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Sampling interval between two ticks (~33 ms at 30/s).
    pub fn tick_interval(self) -> Duration {
        Duration::from_secs_f64(self.frame_duration_secs())
    }

    /// Convert frame count to a duration.
    pub fn frames_to_duration(self, frames: u64) -> Duration {
        Duration::from_secs_f64((frames as f64) * self.frame_duration_secs())
    }

    /// Convert a duration to a frame count using floor semantics.
    pub fn duration_to_frames_floor(self, d: Duration) -> u64 {
        (d.as_secs_f64() * self.as_f64()).floor().max(0.0) as u64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Off-screen surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Largest edge the CPU surface supports (`vello_cpu` pixmaps are `u16`-sized).
    pub const MAX_EDGE: u32 = u16::MAX as u32 - 1;

    /// Surface size for a logical region of `width x height` rendered at `scale`.
    ///
    /// Edges are rounded up to even values, which yuv420p output requires.
    pub fn scaled(width: f32, height: f32, scale: f32) -> GlyphreelResult<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GlyphreelError::validation("surface scale must be finite and > 0"));
        }
        let to_edge = |v: f32| -> GlyphreelResult<u32> {
            let px = (v * scale).ceil();
            if !px.is_finite() || px < 1.0 {
                return Err(GlyphreelError::validation(
                    "surface dimensions must be finite and non-zero",
                ));
            }
            let px = px as u32;
            let even = px + (px % 2);
            if even > Self::MAX_EDGE {
                return Err(GlyphreelError::validation(format!(
                    "surface edge {even}px exceeds the {}px limit",
                    Self::MAX_EDGE
                )));
            }
            Ok(even)
        };
        Ok(Self {
            width: to_edge(width)?,
            height: to_edge(height)?,
        })
    }

    /// Byte length of one tightly packed RGBA8 frame.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Return the channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
