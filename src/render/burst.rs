//! Directional burst: radial spokes whose length tracks per-bin amplitude,
//! plus a continuously growing scribble path whose angular velocity follows
//! the average spectral energy and beat strength.

use glam::Vec2;
use std::collections::VecDeque;
use std::f32::consts::TAU;

use super::color::hsla;
use super::surface::{Blend, Color, DrawSurface, StrokeStyle};
use super::{ModeKind, RenderMode};
use crate::analysis::SignalFrame;
use crate::config::RenderTuning;
use crate::driver::VisualState;

/// Spoke rotation per millisecond of session time.
const SPOKE_PHASE: f32 = 0.0002;
/// Base angular advance of the scribble per tick, before energy and beat
/// contributions.
const SCRIBBLE_BASE_STEP: f32 = 0.02;

pub struct Burst {
    trail_decay: f32,
    beat_response: f32,
    max_scribble_points: usize,
    scribble_angle: f32,
    scribble: VecDeque<Vec2>,
}

impl Burst {
    pub fn new(tuning: &RenderTuning) -> Self {
        Self {
            trail_decay: tuning.burst_trail_decay,
            beat_response: tuning.beat_response,
            max_scribble_points: tuning.max_scribble_points.max(2),
            scribble_angle: 0.0,
            scribble: VecDeque::with_capacity(tuning.max_scribble_points.max(2)),
        }
    }

    /// Number of retained scribble points. Bounded by the configured cap
    /// no matter how many ticks have run.
    pub fn scribble_len(&self) -> usize {
        self.scribble.len()
    }

    fn push_scribble_point(&mut self, point: Vec2) {
        self.scribble.push_back(point);
        if self.scribble.len() > self.max_scribble_points {
            self.scribble.pop_front();
        }
    }
}

impl RenderMode for Burst {
    fn kind(&self) -> ModeKind {
        ModeKind::Burst
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
            let angle = i as f32 * step + t * SPOKE_PHASE;
            let length = max_radius * (0.35 + amp * 0.8) * (1.0 + beat * 0.3);
            let tip = center + Vec2::new(angle.cos(), angle.sin()) * length;
            let hue = (i as f32 / n as f32) * 360.0 + t * 0.025;
            surface.stroke_line(
                center,
                tip,
                StrokeStyle {
                    color: hsla(hue, 80.0, 45.0 + amp * 35.0, 0.2 + amp * 0.6),
                    width: 1.0 + amp * 2.5 + beat * 1.0,
                    blend: Blend::Additive,
                },
            );
        }

        // The scribble phase only ever advances while the mode is active;
        // it is never reset, so resuming the mode continues the same path.
        let avg_amp = frame.spectrum.average_amp();
        self.scribble_angle += SCRIBBLE_BASE_STEP + avg_amp * 0.3 + beat * 0.05;
        let scribble_radius = max_radius * (0.45 + avg_amp * 0.35);
        let point = center
            + Vec2::new(self.scribble_angle.cos(), self.scribble_angle.sin()) * scribble_radius;
        self.push_scribble_point(point);

        if self.scribble.len() >= 2 {
            let points: Vec<Vec2> = self.scribble.iter().copied().collect();
            surface.stroke_polyline(
                &points,
                StrokeStyle {
                    color: hsla(t * 0.05, 90.0, 60.0, 0.55),
                    width: 1.5 + beat * 1.5,
                    blend: Blend::Additive,
                },
            );
        }
    }
}
