//! Off-screen surface that resynthesizes a [`crate::VisibleState`] into RGBA frames.

/// Backend trait, frame type and construction.
pub mod backend;
pub(crate) mod cpu;
pub(crate) mod text;
