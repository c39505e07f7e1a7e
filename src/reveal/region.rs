use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::foundation::error::GlyphreelResult;
use crate::region::VisualRegion;
use crate::region::model::{RegionBounds, StyleSnapshot, VisibleState};
use crate::reveal::animation::RevealAnimation;

/// A [`VisualRegion`] whose fragments come from a [`RevealAnimation`].
///
/// The clock starts at [`RevealRegion::begin`]; before that the region shows the first frame
/// of the animation.
#[derive(Clone, Debug)]
pub struct RevealRegion {
    animation: Arc<RevealAnimation>,
    style: StyleSnapshot,
    bounds: RegionBounds,
    started: Arc<Mutex<Option<Instant>>>,
}

impl RevealRegion {
    /// Region of `bounds` showing `animation` with `style`.
    pub fn new(animation: RevealAnimation, style: StyleSnapshot, bounds: RegionBounds) -> Self {
        Self {
            animation: Arc::new(animation.with_colors(style.color, highlight_for(&style))),
            style,
            bounds,
            started: Arc::new(Mutex::new(None)),
        }
    }

    /// Start (or restart) the reveal clock now.
    pub fn begin(&self) {
        let mut started = self
            .started
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *started = Some(Instant::now());
    }

    /// Time since [`RevealRegion::begin`], zero before it.
    pub fn elapsed(&self) -> Duration {
        self.started
            .lock()
            .ok()
            .and_then(|s| *s)
            .map(|s| s.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// The animation driving this region.
    pub fn animation(&self) -> &RevealAnimation {
        &self.animation
    }

    /// State at an explicit elapsed time, independent of the clock.
    pub fn state_at(&self, elapsed: Duration) -> VisibleState {
        VisibleState {
            style: self.style.clone(),
            fragments: self.animation.state_at(elapsed),
        }
    }
}

fn highlight_for(style: &StyleSnapshot) -> crate::region::color::Color {
    style
        .color
        .lerp(crate::region::color::Color::rgba8(0xff, 0xe8, 0x9c, 0xff), 0.85)
}

impl VisualRegion for RevealRegion {
    fn bounds(&self) -> Option<RegionBounds> {
        Some(self.bounds)
    }

    fn current_visible_state(&self) -> GlyphreelResult<VisibleState> {
        Ok(self.state_at(self.elapsed()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reveal/region.rs"]
mod tests;
