//! Radial swirl: one rotating arc segment per bin around the center, plus an
//! orbiting particle layer at an independent phase for depth. Trails come
//! from the low-alpha overlay, not stored geometry.

use glam::Vec2;
use std::f32::consts::TAU;

use super::color::hsla;
use super::surface::{Blend, Color, DrawSurface, StrokeStyle};
use super::{ModeKind, RenderMode};
use crate::analysis::SignalFrame;
use crate::config::RenderTuning;
use crate::driver::VisualState;

/// Fraction of each angular slot the arc actually covers; the rest is gap.
const ARC_SPAN: f32 = 0.9;
/// Ring rotation per millisecond of session time.
const ARC_PHASE: f32 = 0.0003;
/// The particle layer orbits at its own phase rate.
const PARTICLE_PHASE: f32 = 0.0005;

pub struct Swirl {
    trail_decay: f32,
    beat_response: f32,
}

impl Swirl {
    pub fn new(tuning: &RenderTuning) -> Self {
        Self {
            trail_decay: tuning.swirl_trail_decay,
            beat_response: tuning.beat_response,
        }
    }
}

impl RenderMode for Swirl {
    fn kind(&self) -> ModeKind {
        ModeKind::Swirl
    }

    fn render(&mut self, frame: &SignalFrame, state: &VisualState, surface: &mut dyn DrawSurface) {
        let n = frame.spectrum.len();
        if n == 0 {
            return;
        }
        let viewport = state.viewport();
        let center = viewport.center();
        let max_radius = viewport.max_radius();
        let t = state.time_ms() as f32;
        let beat = (frame.rhythm.beat_strength * self.beat_response).clamp(0.0, 1.0);
        let step = TAU / n as f32;

        surface.fill_surface(Color::overlay(self.trail_decay));

        for i in 0..n {
            let amp = frame.spectrum.amp(i);
            let start = i as f32 * step + t * ARC_PHASE;
            let end = start + step * ARC_SPAN;
            let radius = max_radius * (0.55 + amp * 0.6) * (1.0 + beat * 0.25);
            let hue = (i as f32 / n as f32) * 360.0 + t * 0.02;
            surface.stroke_arc(
                center,
                radius,
                start,
                end,
                StrokeStyle {
                    color: hsla(hue, 80.0, 40.0 + amp * 40.0, 0.25 + amp * 0.55),
                    width: 1.0 + amp * 3.0 + beat * 1.2,
                    blend: Blend::Additive,
                },
            );
        }

        for i in 0..n {
            let amp = frame.spectrum.amp(i);
            let angle = i as f32 * step * 1.7 + t * PARTICLE_PHASE;
            let orbit = max_radius * (0.3 + amp * 0.5);
            let position = center + Vec2::new(angle.cos(), angle.sin()) * orbit;
            let hue = 360.0 - (i as f32 / n as f32) * 360.0 + t * 0.03;
            surface.fill_circle(
                position,
                1.5 + amp * 2.5 + beat * 1.5,
                hsla(hue, 85.0, 55.0 + amp * 30.0, 0.3 + amp * 0.5),
                Blend::Additive,
            );
        }
    }
}
