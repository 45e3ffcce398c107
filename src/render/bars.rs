//! Pseudo-3D spectrum bars: the spectrum is partitioned into a fixed number
//! of bars by averaging contiguous bin groups, each drawn as an extruded
//! block (front, top, side faces) on a receding baseline. Unlike the other
//! modes this one composes normally; filled faces have to occlude for the
//! depth illusion to hold.

use glam::Vec2;

use super::color::hsla;
use super::surface::{Blend, Color, DrawSurface};
use super::{ModeKind, RenderMode};
use crate::analysis::SignalFrame;
use crate::config::RenderTuning;
use crate::driver::VisualState;

/// Tallest bar as a fraction of viewport height.
const MAX_HEIGHT_FRACTION: f32 = 0.55;
/// Vertical position of bar 0's floor as a fraction of viewport height.
const BASELINE_FRACTION: f32 = 0.78;
/// Total rise of the receding baseline across the row, as a fraction of
/// viewport height.
const SLOPE_BAND_FRACTION: f32 = 0.22;
/// Depth of the extruded top/side faces relative to bar width.
const DEPTH_FRACTION: f32 = 0.45;
/// Fraction of each slot occupied by the bar; the rest is gutter.
const BAR_FILL: f32 = 0.8;

pub struct SpectrumBars {
    bar_count: usize,
    clear_decay: f32,
    beat_response: f32,
}

impl SpectrumBars {
    pub fn new(tuning: &RenderTuning) -> Self {
        Self {
            bar_count: tuning.bar_count.max(1),
            clear_decay: tuning.bars_clear_decay,
            beat_response: tuning.beat_response,
        }
    }

    /// Mean normalized amplitude of the contiguous bin group feeding bar
    /// `bar` out of `bar_count`.
    fn bar_amp(spectrum: &crate::analysis::SpectrumSample, bar: usize, group: usize) -> f32 {
        let begin = bar * group;
        let end = (begin + group).min(spectrum.len());
        if begin >= end {
            return 0.0;
        }
        let sum: f32 = (begin..end).map(|i| spectrum.amp(i)).sum();
        sum / (end - begin) as f32
    }
}

impl RenderMode for SpectrumBars {
    fn kind(&self) -> ModeKind {
        ModeKind::SpectrumBars
    }

    fn render(&mut self, frame: &SignalFrame, state: &VisualState, surface: &mut dyn DrawSurface) {
        let n = frame.spectrum.len();
        if n == 0 {
            return;
        }
        let viewport = state.viewport();
        let width = viewport.width() as f32;
        let height = viewport.height() as f32;
        let beat = (frame.rhythm.beat_strength * self.beat_response).clamp(0.0, 1.0);

        surface.fill_surface(Color::overlay(self.clear_decay));

        let bar_count = self.bar_count.min(n);
        let group = (n / bar_count).max(1);
        let slot = width / bar_count as f32;
        let bar_width = slot * BAR_FILL;
        let depth = bar_width * DEPTH_FRACTION;
        let slope_step = height * SLOPE_BAND_FRACTION / bar_count as f32;
        let max_bar_height = height * MAX_HEIGHT_FRACTION;

        for bar in 0..bar_count {
            let amp = Self::bar_amp(&frame.spectrum, bar, group);
            let bar_height = amp * max_bar_height;

            let x = bar as f32 * slot + (slot - bar_width) * 0.5;
            let base_y = height * BASELINE_FRACTION - bar as f32 * slope_step;
            let top_y = base_y - bar_height;

            // Quiet bars warm, loud bars cool.
            let hue = 20.0 + amp * 180.0;
            let lightness = 30.0 + amp * 30.0 + beat * 12.0;

            surface.fill_rect(
                Vec2::new(x, top_y),
                Vec2::new(x + bar_width, base_y),
                hsla(hue, 70.0, lightness, 0.95),
                Blend::Alpha,
            );

            surface.fill_polygon(
                &[
                    Vec2::new(x, top_y),
                    Vec2::new(x + bar_width, top_y),
                    Vec2::new(x + bar_width + depth, top_y - depth * 0.6),
                    Vec2::new(x + depth, top_y - depth * 0.6),
                ],
                hsla(hue, 70.0, lightness + 12.0, 0.95),
                Blend::Alpha,
            );

            surface.fill_polygon(
                &[
                    Vec2::new(x + bar_width, top_y),
                    Vec2::new(x + bar_width + depth, top_y - depth * 0.6),
                    Vec2::new(x + bar_width + depth, base_y - depth * 0.6),
                    Vec2::new(x + bar_width, base_y),
                ],
                hsla(hue, 70.0, lightness - 12.0, 0.95),
                Blend::Alpha,
            );
        }
    }
}
