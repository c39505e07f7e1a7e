//! The observed surface: bounds, styling and the visible fragments a sampler resynthesizes.

pub(crate) mod color;
pub(crate) mod font;
pub(crate) mod model;

use std::sync::{Arc, RwLock};

use crate::foundation::error::{GlyphreelError, GlyphreelResult};
use model::{RegionBounds, StyleSnapshot, VisibleState};

/// A live visual region that a capture session can observe.
///
/// Implementations are pull-based: the sampler asks for the current state on every tick and
/// never drives the animation itself.
pub trait VisualRegion: Send + Sync {
    /// Mounted bounds, or `None` when the region is not attached.
    fn bounds(&self) -> Option<RegionBounds>;

    /// Snapshot of what is visible right now.
    fn current_visible_state(&self) -> GlyphreelResult<VisibleState>;
}

#[derive(Debug)]
struct SharedInner {
    bounds: Option<RegionBounds>,
    state: VisibleState,
}

/// Region whose state is pushed by an external animation driver.
///
/// Cloning shares the same underlying state.
#[derive(Clone, Debug)]
pub struct SharedRegion {
    inner: Arc<RwLock<SharedInner>>,
}

impl SharedRegion {
    /// Create an unmounted region with no visible text.
    pub fn new(style: StyleSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SharedInner {
                bounds: None,
                state: VisibleState::empty(style),
            })),
        }
    }

    /// Attach the region at `bounds`.
    pub fn mount(&self, bounds: RegionBounds) {
        self.write(|inner| inner.bounds = Some(bounds));
    }

    /// Detach the region.
    pub fn unmount(&self) {
        self.write(|inner| inner.bounds = None);
    }

    /// Replace the visible state.
    pub fn set_state(&self, state: VisibleState) {
        self.write(|inner| inner.state = state);
    }

    /// Mutate the visible state in place.
    pub fn update(&self, f: impl FnOnce(&mut VisibleState)) {
        self.write(|inner| f(&mut inner.state));
    }

    fn write(&self, f: impl FnOnce(&mut SharedInner)) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard);
    }
}

impl VisualRegion for SharedRegion {
    fn bounds(&self) -> Option<RegionBounds> {
        self.inner.read().ok().and_then(|inner| inner.bounds)
    }

    fn current_visible_state(&self) -> GlyphreelResult<VisibleState> {
        let inner = self
            .inner
            .read()
            .map_err(|_| GlyphreelError::render("region state lock poisoned"))?;
        Ok(inner.state.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/region/shared.rs"]
mod tests;
