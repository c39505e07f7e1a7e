//! Capture sessions: fixed-rate sampling of a live region into a streaming encoder.

pub(crate) mod recorder;
pub(crate) mod sampler;
