use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::{Affine, Canvas};
use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use crate::region::color::Color;
use crate::region::font::FontSource;
use crate::region::model::{Fragment, Overlay, StyleSnapshot, VisibleState};
use crate::render::backend::{FrameRGBA, SurfaceBackend, SurfaceSettings};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine};

const LAYOUT_CACHE_LIMIT: usize = 4096;
const METRICS_PROBE: &str = "Hg";

/// CPU surface backed by `vello_cpu`.
pub(crate) struct CpuSurfaceBackend {
    settings: SurfaceSettings,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: vello_cpu::Pixmap,
    text_engine: TextLayoutEngine,
    font: Option<LoadedFont>,
    layouts: HashMap<LayoutKey, Arc<FragmentLayout>>,
    overlay: Option<(Overlay, vello_cpu::Image)>,
}

struct LoadedFont {
    source: FontSource,
    data: vello_cpu::peniko::FontData,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct LayoutKey {
    text: String,
    size_bits: u32,
}

struct FragmentLayout {
    layout: parley::Layout<TextBrushRgba8>,
    advance: f32,
    baseline: f32,
    ascent: f32,
    descent: f32,
}

/// Where one fragment lands, in logical pixels relative to the region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Slot {
    pub(crate) fragment: usize,
    pub(crate) x: f32,
    pub(crate) line: usize,
}

/// Result of flowing fragments into lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Flow {
    pub(crate) slots: Vec<Slot>,
    /// Inked width of each line (trailing whitespace excluded).
    pub(crate) line_widths: Vec<f32>,
}

/// Greedy word wrap over per-fragment advances.
///
/// A word is a run of fragments up to and including the next whitespace fragment; words move
/// to the next line as a whole when they would overflow `max_width`.
pub(crate) fn flow_fragments(fragments: &[Fragment], advances: &[f32], max_width: f32) -> Flow {
    let n = fragments.len().min(advances.len());
    let mut slots = Vec::with_capacity(n);
    let mut line_widths = vec![0.0f32];
    let mut pen = 0.0f32;

    let is_space = |f: &Fragment| !f.text.is_empty() && f.text.chars().all(char::is_whitespace);

    let mut i = 0;
    while i < n {
        let mut j = i;
        let mut ink = 0.0f32;
        let mut total = 0.0f32;
        loop {
            total += advances[j];
            if !is_space(&fragments[j]) {
                ink = total;
            }
            let ends = fragments[j].line_break_after || is_space(&fragments[j]);
            j += 1;
            if ends || j == n {
                break;
            }
        }

        if pen > 0.0 && pen + ink > max_width {
            line_widths.push(0.0);
            pen = 0.0;
        }
        for k in i..j {
            let line = line_widths.len() - 1;
            slots.push(Slot {
                fragment: k,
                x: pen,
                line,
            });
            pen += advances[k];
            if !is_space(&fragments[k]) {
                line_widths[line] = pen;
            }
            if fragments[k].line_break_after {
                line_widths.push(0.0);
                pen = 0.0;
            }
        }
        i = j;
    }

    Flow { slots, line_widths }
}

impl CpuSurfaceBackend {
    pub(crate) fn new(settings: SurfaceSettings) -> GlyphreelResult<Self> {
        let (w, h) = pixmap_dims(settings.canvas)?;
        Ok(Self {
            settings,
            ctx: None,
            pixmap: vello_cpu::Pixmap::new(w, h),
            text_engine: TextLayoutEngine::new(),
            font: None,
            layouts: HashMap::new(),
            overlay: None,
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> GlyphreelResult<R>,
    ) -> GlyphreelResult<R> {
        let (width, height) = pixmap_dims(self.settings.canvas)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx);
        self.ctx = Some(ctx);
        out
    }

    fn layout_for(&mut self, text: &str, size_px: f32) -> GlyphreelResult<Arc<FragmentLayout>> {
        let key = LayoutKey {
            text: text.to_owned(),
            size_bits: size_px.to_bits(),
        };
        if let Some(hit) = self.layouts.get(&key) {
            return Ok(hit.clone());
        }
        if self.layouts.len() >= LAYOUT_CACHE_LIMIT {
            self.layouts.clear();
        }

        let shaped: Cow<'_, str> = if text.contains(['\n', '\r']) {
            Cow::Owned(text.replace(['\n', '\r'], " "))
        } else {
            Cow::Borrowed(text)
        };
        let layout = self
            .text_engine
            .layout_plain(&shaped, size_px, TextBrushRgba8::default())?;
        let (baseline, ascent, descent) = layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                (m.baseline, m.ascent, m.descent)
            })
            .unwrap_or((size_px * 0.8, size_px * 0.8, size_px * 0.2));
        let out = Arc::new(FragmentLayout {
            advance: layout.full_width(),
            baseline,
            ascent,
            descent,
            layout,
        });
        self.layouts.insert(key, out.clone());
        Ok(out)
    }

    fn overlay_paint(&mut self, overlay: Overlay) -> GlyphreelResult<vello_cpu::Image> {
        if let Some((cached, img)) = &self.overlay
            && *cached == overlay
        {
            return Ok(img.clone());
        }
        let Canvas { width, height } = self.settings.canvas;
        let img = diagonal_gradient_image(overlay.from, overlay.to, width, height)?;
        self.overlay = Some((overlay, img.clone()));
        Ok(img)
    }
}

impl SurfaceBackend for CpuSurfaceBackend {
    fn prepare(&mut self, style: &StyleSnapshot) -> GlyphreelResult<()> {
        style.validate()?;
        if self.font.as_ref().is_some_and(|f| f.source == style.font) {
            return Ok(());
        }
        let resolved = style.font.resolve()?;
        let family = self.text_engine.register_font(&resolved)?;
        tracing::debug!(family = %family, face = resolved.index, "registered region font");
        self.font = Some(LoadedFont {
            source: style.font.clone(),
            data: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(resolved.bytes.to_vec()),
                resolved.index,
            ),
        });
        self.layouts.clear();
        Ok(())
    }

    fn draw(&mut self, state: &VisibleState) -> GlyphreelResult<FrameRGBA> {
        let style = &state.style;
        self.prepare(style)?;

        let size = style.size_px;
        let mut layouts = Vec::with_capacity(state.fragments.len());
        let mut advances = Vec::with_capacity(state.fragments.len());
        for frag in &state.fragments {
            if frag.text.is_empty() {
                layouts.push(None);
                advances.push(0.0);
                continue;
            }
            let l = self.layout_for(&frag.text, size)?;
            advances.push(l.advance);
            layouts.push(Some(l));
        }
        let probe = self.layout_for(METRICS_PROBE, size)?;

        let region = self.settings.region;
        let max_width = (region.width - 2.0 * style.padding_px).max(size);
        let flow = flow_fragments(&state.fragments, &advances, max_width);

        let line_advance = size * style.line_height;
        let block_height = line_advance * flow.line_widths.len() as f32;
        let top = (region.height - block_height) / 2.0;
        let baseline_in_line = (line_advance - (probe.ascent + probe.descent)) / 2.0 + probe.ascent;

        let font = self
            .font
            .as_ref()
            .map(|f| f.data.clone())
            .ok_or_else(|| GlyphreelError::render("surface drawn before a font was prepared"))?;
        let overlay = match style.overlay {
            Some(ov) => Some(self.overlay_paint(ov)?),
            None => None,
        };
        let scale = Affine::scale(f64::from(self.settings.scale));
        let Canvas { width, height } = self.settings.canvas;
        let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(width), f64::from(height));

        self.with_ctx_mut(|this, ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(paint_color(style.background));
            ctx.fill_rect(&full);

            for slot in &flow.slots {
                let frag = &state.fragments[slot.fragment];
                let Some(layout) = &layouts[slot.fragment] else {
                    continue;
                };
                if frag.is_invisible() || frag.scale_y == 0.0 {
                    continue;
                }
                let line_width = flow.line_widths[slot.line];
                let line_left = (region.width - line_width) / 2.0;
                let x = line_left + slot.x + frag.offset_em.x as f32 * size;
                let y = top
                    + line_advance * slot.line as f32
                    + baseline_in_line
                    + frag.offset_em.y as f32 * size;

                let tr = scale
                    * Affine::translate((f64::from(x), f64::from(y)))
                    * Affine::scale_non_uniform(f64::from(frag.scale_x), f64::from(frag.scale_y))
                    * Affine::translate((0.0, -f64::from(layout.baseline)));
                ctx.set_transform(affine_to_cpu(tr));
                ctx.set_paint(paint_color(frag.color.unwrap_or(style.color)));
                let opacity = frag.opacity.clamp(0.0, 1.0);
                if opacity < 1.0 {
                    ctx.push_opacity_layer(opacity);
                }
                for line in layout.layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
                if opacity < 1.0 {
                    ctx.pop_layer();
                }
            }

            if let Some(img) = overlay {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(img);
                ctx.fill_rect(&full);
            }

            this.pixmap.data_as_u8_slice_mut().fill(0);
            ctx.flush();
            ctx.render_to_pixmap(&mut this.pixmap);
            Ok(())
        })?;

        Ok(FrameRGBA {
            width,
            height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn canvas(&self) -> Canvas {
        self.settings.canvas
    }
}

fn pixmap_dims(canvas: Canvas) -> GlyphreelResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| GlyphreelError::render("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| GlyphreelError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn paint_color(c: Color) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

/// Top-left to bottom-right gradient as a premultiplied image paint.
pub(crate) fn diagonal_gradient_premul(from: Color, to: Color, width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![0u8; (width as usize) * (height as usize) * 4];
    let span_x = f64::from(width.saturating_sub(1).max(1));
    let span_y = f64::from(height.saturating_sub(1).max(1));
    for y in 0..height {
        for x in 0..width {
            let t = (f64::from(x) / span_x + f64::from(y) / span_y) / 2.0;
            let px = from.lerp(to, t).to_rgba8_premul().to_array();
            let idx = ((y as usize) * (width as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&px);
        }
    }
    bytes
}

fn diagonal_gradient_image(
    from: Color,
    to: Color,
    width: u32,
    height: u32,
) -> GlyphreelResult<vello_cpu::Image> {
    let bytes = diagonal_gradient_premul(from, to, width, height);
    let (w, h) = pixmap_dims(Canvas { width, height })?;
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
