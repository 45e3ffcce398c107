pub mod bars;
pub mod burst;
pub mod color;
pub mod surface;
pub mod swirl;

pub use bars::SpectrumBars;
pub use burst::Burst;
pub use surface::{Blend, Color, DrawSurface, PixmapSurface, StrokeStyle};
pub use swirl::Swirl;

use crate::analysis::SignalFrame;
use crate::config::RenderTuning;
use crate::driver::VisualState;

/// Identifier for the three render modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Swirl,
    Burst,
    SpectrumBars,
}

impl ModeKind {
    /// Parse an externally supplied mode identifier. Unknown names yield
    /// `None`; callers keep the previously active mode.
    pub fn parse(name: &str) -> Option<ModeKind> {
        match name {
            "swirl" => Some(ModeKind::Swirl),
            "burst" => Some(ModeKind::Burst),
            "spectrumbars" => Some(ModeKind::SpectrumBars),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModeKind::Swirl => "swirl",
            ModeKind::Burst => "burst",
            ModeKind::SpectrumBars => "spectrumbars",
        }
    }
}

/// One frame's paint pass.
///
/// Modes are stateful: per-mode buffers and phase accumulators live inside
/// the mode value, which the session's [`ModeBank`] keeps alive across mode
/// switches so a revisited mode resumes where it left off.
pub trait RenderMode {
    fn kind(&self) -> ModeKind;

    fn render(&mut self, frame: &SignalFrame, state: &VisualState, surface: &mut dyn DrawSurface);
}

/// Session-lived bank of mode instances. Each mode is constructed lazily on
/// first activation and retained afterward.
pub struct ModeBank {
    tuning: RenderTuning,
    swirl: Option<Swirl>,
    burst: Option<Burst>,
    bars: Option<SpectrumBars>,
}

impl ModeBank {
    pub fn new(tuning: RenderTuning) -> Self {
        Self {
            tuning,
            swirl: None,
            burst: None,
            bars: None,
        }
    }

    pub fn mode_mut(&mut self, kind: ModeKind) -> &mut dyn RenderMode {
        match kind {
            ModeKind::Swirl => self.swirl.get_or_insert_with(|| Swirl::new(&self.tuning)),
            ModeKind::Burst => self.burst.get_or_insert_with(|| Burst::new(&self.tuning)),
            ModeKind::SpectrumBars => self
                .bars
                .get_or_insert_with(|| SpectrumBars::new(&self.tuning)),
        }
    }
}
