//! Vortex - an audio-reactive visual field renderer.
//!
//! Converts a periodically sampled power spectrum into swirling, colored
//! geometry whose motion, hue, and intensity track the loudness and rhythm of
//! the signal. Spectral acquisition (decoding, capture, FFT) is an external
//! collaborator; this crate covers the mapping pipeline from spectrum to
//! pixels: rhythm estimation, the three render modes, and the tick loop.

pub mod analysis;
pub mod config;
pub mod driver;
pub mod render;

pub use analysis::{RhythmEstimator, RhythmState, SignalFrame, SpectrumProvider, SpectrumSample};
pub use config::RenderTuning;
pub use driver::{AnimationDriver, Viewport, VisualState};
pub use render::{Blend, DrawSurface, ModeKind, PixmapSurface};
