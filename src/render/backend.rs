use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::foundation::math::flatten_premul_over_bg_to_opaque_rgba8;
use crate::region::model::{RegionBounds, StyleSnapshot, VisibleState};

/// A rendered frame as RGBA8 pixels.
///
/// Surfaces produce **premultiplied alpha** frames; the `premultiplied` flag makes this explicit
/// at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame filled with a single premultiplied color.
    pub fn solid(canvas: Canvas, premul_rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(canvas.rgba_len());
        for _ in 0..(canvas.rgba_len() / 4) {
            data.extend_from_slice(&premul_rgba);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        }
    }

    /// Composite over `bg_rgba` and return straight, fully opaque RGBA8 bytes.
    ///
    /// Encoders consume opaque frames; alpha is dropped after flattening.
    pub fn to_opaque_rgba8(&self, bg_rgba: [u8; 4]) -> GlyphreelResult<Vec<u8>> {
        let expected = (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4);
        if self.data.len() != expected {
            return Err(GlyphreelError::render(format!(
                "frame byte len {} does not match {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        let mut out = vec![0u8; expected];
        if self.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut out, &self.data, bg_rgba)?;
        } else {
            out.copy_from_slice(&self.data);
            for px in out.chunks_exact_mut(4) {
                px[3] = 255;
            }
        }
        Ok(out)
    }
}

/// A surface that can redraw the observed region from a [`VisibleState`].
///
/// A backend is created and driven by a single sampler thread; it is never shared.
pub trait SurfaceBackend {
    /// Resolve fonts and caches for `style` ahead of the first draw.
    ///
    /// Called once when a session starts; failures abort the session before recording.
    fn prepare(&mut self, style: &StyleSnapshot) -> GlyphreelResult<()>;

    /// Clear the surface and draw `state` onto it.
    fn draw(&mut self, state: &VisibleState) -> GlyphreelResult<FrameRGBA>;

    /// Output size in pixels.
    fn canvas(&self) -> Canvas;
}

/// Available backend kinds.
///
/// - `Cpu` is always available.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Geometry shared by every backend kind.
#[derive(Clone, Debug)]
pub struct SurfaceSettings {
    /// Logical region being resynthesized.
    pub region: RegionBounds,
    /// Device-pixel multiplier applied to every drawn coordinate.
    pub scale: f32,
    /// Output size; see [`Canvas::scaled`].
    pub canvas: Canvas,
}

impl SurfaceSettings {
    /// Settings for `region` drawn at `scale`.
    pub fn for_region(region: RegionBounds, scale: f32) -> GlyphreelResult<Self> {
        region.validate()?;
        let canvas = Canvas::scaled(region.width, region.height, scale)?;
        Ok(Self {
            region,
            scale,
            canvas,
        })
    }
}

/// Constructs a backend inside the sampler thread.
pub type BackendFactory =
    Arc<dyn Fn(&SurfaceSettings) -> GlyphreelResult<Box<dyn SurfaceBackend>> + Send + Sync>;

/// Create a surface backend implementation.
///
/// - `BackendKind::Cpu` is always available.
pub fn create_backend(
    kind: BackendKind,
    settings: &SurfaceSettings,
) -> GlyphreelResult<Box<dyn SurfaceBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuSurfaceBackend::new(
            settings.clone(),
        )?)),
    }
}

/// Factory that builds backends of `kind`.
pub fn backend_factory(kind: BackendKind) -> BackendFactory {
    Arc::new(move |settings: &SurfaceSettings| create_backend(kind, settings))
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
