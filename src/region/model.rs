use serde::{Deserialize, Serialize};

use crate::foundation::core::Vec2;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::region::color::Color;
use crate::region::font::FontSource;

/// Origin and size of the observed region, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl RegionBounds {
    /// Region at the origin with the given size.
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// Reject non-finite or empty regions.
    pub fn validate(&self) -> GlyphreelResult<()> {
        let all_finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(GlyphreelError::validation(
                "region bounds must be finite numbers",
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(GlyphreelError::validation(format!(
                "region has zero size ({}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Corner-to-corner gradient drawn over the whole region (top-left `from`, bottom-right `to`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Color at the top-left corner.
    pub from: Color,
    /// Color at the bottom-right corner.
    pub to: Color,
}

impl Overlay {
    /// Subtle darkening towards the bottom-right corner.
    pub fn corner_darken() -> Self {
        Self {
            from: Color::TRANSPARENT,
            to: Color::rgba(0.0, 0.0, 0.0, 0.35),
        }
    }
}

/// Declared styling of the observed region.
///
/// Missing fields take their [`Default`] values when deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSnapshot {
    /// Font used for every fragment.
    pub font: FontSource,
    /// Font size in logical pixels.
    pub size_px: f32,
    /// Line advance as a multiple of `size_px`.
    pub line_height: f32,
    /// Default fragment color.
    pub color: Color,
    /// Region background.
    pub background: Color,
    /// Optional overlay redrawn on top of the text.
    pub overlay: Option<Overlay>,
    /// Horizontal padding on each side, in logical pixels.
    pub padding_px: f32,
}

impl Default for StyleSnapshot {
    fn default() -> Self {
        Self {
            font: FontSource::default(),
            size_px: 64.0,
            line_height: 1.3,
            color: Color::WHITE,
            background: Color::rgba8(0x1b, 0x1f, 0x3b, 0xff),
            overlay: Some(Overlay::corner_darken()),
            padding_px: 24.0,
        }
    }
}

impl StyleSnapshot {
    /// Check numeric styling values.
    pub fn validate(&self) -> GlyphreelResult<()> {
        if !self.size_px.is_finite() || self.size_px <= 0.0 {
            return Err(GlyphreelError::validation(
                "style size_px must be finite and > 0",
            ));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(GlyphreelError::validation(
                "style line_height must be finite and > 0",
            ));
        }
        if !self.padding_px.is_finite() || self.padding_px < 0.0 {
            return Err(GlyphreelError::validation(
                "style padding_px must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// One visible run of text and its current animation state.
///
/// Fragments flow left to right and wrap inside the region; a fragment with opacity 0 still
/// occupies its layout slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Text of the run (usually one character).
    pub text: String,
    /// Opacity multiplier in `[0, 1]`.
    pub opacity: f32,
    /// Offset from the layout slot, in em units.
    pub offset_em: Vec2,
    /// Horizontal scale around the fragment's left edge.
    pub scale_x: f32,
    /// Vertical scale around the fragment's baseline.
    pub scale_y: f32,
    /// Color override; falls back to [`StyleSnapshot::color`].
    pub color: Option<Color>,
    /// Start a new line after this fragment.
    pub line_break_after: bool,
}

impl Fragment {
    /// Fully visible fragment at rest.
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            opacity: 1.0,
            offset_em: Vec2::ZERO,
            scale_x: 1.0,
            scale_y: 1.0,
            color: None,
            line_break_after: false,
        }
    }

    /// Fragment that keeps its layout slot but draws nothing.
    pub fn hidden(text: impl Into<String>) -> Self {
        Self {
            opacity: 0.0,
            ..Self::visible(text)
        }
    }

    /// Set opacity (clamped to `[0, 1]`).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the em offset.
    pub fn with_offset_em(mut self, x: f64, y: f64) -> Self {
        self.offset_em = Vec2::new(x, y);
        self
    }

    /// Set horizontal and vertical scale.
    pub fn with_scale(mut self, scale_x: f32, scale_y: f32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Set a color override.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Request a line break after this fragment.
    pub fn with_line_break(mut self) -> Self {
        self.line_break_after = true;
        self
    }

    /// `true` when drawing this fragment would leave the surface unchanged.
    pub fn is_invisible(&self) -> bool {
        self.opacity <= 0.0 || self.text.trim().is_empty() || self.scale_x == 0.0
    }
}

/// Everything needed to resynthesize the region at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibleState {
    /// Region styling.
    pub style: StyleSnapshot,
    /// Visible fragments in reading order.
    pub fragments: Vec<Fragment>,
}

impl VisibleState {
    /// State with no text, only background and overlay.
    pub fn empty(style: StyleSnapshot) -> Self {
        Self {
            style,
            fragments: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/region/model.rs"]
mod tests;
