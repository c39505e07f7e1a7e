//! Text reveal animations exposed as a [`crate::VisualRegion`].
//!
//! Animations are pure functions of elapsed time; the sampler pulls states and never drives
//! timers itself.

pub(crate) mod animation;
pub(crate) mod region;
pub(crate) mod timing;

/// Reveal effect applied to the text.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum RevealStyle {
    /// Characters appear one at a time behind a blinking caret.
    #[default]
    Typewriter,
    /// Text fades in, then a highlight band sweeps across it once.
    Shimmer,
    /// Characters fade in and rise into place with a stagger.
    Fluid,
    /// Characters are stroked in from the left, one after another.
    Handwriting,
}

impl RevealStyle {
    /// Every style, in declaration order.
    pub const ALL: [RevealStyle; 4] = [
        Self::Typewriter,
        Self::Shimmer,
        Self::Fluid,
        Self::Handwriting,
    ];

    /// Lowercase name, as used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Typewriter => "typewriter",
            Self::Shimmer => "shimmer",
            Self::Fluid => "fluid",
            Self::Handwriting => "handwriting",
        }
    }
}

impl std::fmt::Display for RevealStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
