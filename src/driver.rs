use glam::Vec2;
use log::{debug, info, warn};
use std::time::Instant;

use crate::analysis::{IdleSignal, RhythmEstimator, RhythmState, SignalFrame, SpectrumProvider};
use crate::config::RenderTuning;
use crate::render::{DrawSurface, ModeBank, ModeKind};

/// Fraction of the short viewport edge the base radius occupies. Held
/// invariant across modes so beat-inflated geometry (up to ~1.5x the base
/// radius in burst mode) still lands inside the frame.
const MAX_RADIUS_FRACTION: f32 = 0.33;

/// Spectrum resolution synthesized while no source is attached.
const IDLE_BINS: usize = 64;

/// Tick interval between periodic frame-stat log lines.
const STATS_EVERY_TICKS: u64 = 300;

/// Viewport geometry, recomputed wholesale on resize and read-only
/// everywhere else.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    width_px: u32,
    height_px: u32,
    device_pixel_ratio: f32,
    center: Vec2,
    max_radius: f32,
}

impl Viewport {
    pub fn new(width_px: u32, height_px: u32, device_pixel_ratio: f32) -> Self {
        let width = width_px as f32;
        let height = height_px as f32;
        Self {
            width_px,
            height_px,
            device_pixel_ratio: device_pixel_ratio.max(0.0),
            center: Vec2::new(width / 2.0, height / 2.0),
            max_radius: width.min(height) * MAX_RADIUS_FRACTION,
        }
    }

    pub fn width(&self) -> u32 {
        self.width_px
    }

    pub fn height(&self) -> u32 {
        self.height_px
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    /// A zero-area viewport occurs during teardown or before layout; frames
    /// against it are skipped rather than producing NaN geometry.
    pub fn is_degenerate(&self) -> bool {
        self.width_px == 0 || self.height_px == 0
    }
}

/// Per-session animation state: the viewport and the elapsed session time.
/// Per-mode buffers live inside the modes themselves.
pub struct VisualState {
    viewport: Viewport,
    time_seconds: f64,
}

impl VisualState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            time_seconds: 0.0,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn time_seconds(&self) -> f64 {
        self.time_seconds
    }

    /// Session time on a millisecond scale; the render formulas' phase
    /// constants are calibrated for a millisecond clock.
    pub fn time_ms(&self) -> f64 {
        self.time_seconds * 1000.0
    }
}

/// Orchestrates the per-tick pipeline: pull one spectrum snapshot, update
/// the rhythm signal, and dispatch to the active render mode. The caller's
/// loop is the scheduler; one `tick` runs to completion per frame and
/// nothing here blocks or reenters.
pub struct AnimationDriver {
    source: Option<Box<dyn SpectrumProvider>>,
    idle: IdleSignal,
    rhythm: RhythmEstimator,
    state: VisualState,
    modes: ModeBank,
    active: ModeKind,
    epoch: Instant,
    ticks: u64,
}

impl AnimationDriver {
    pub fn new(viewport: Viewport, tuning: RenderTuning) -> Self {
        Self {
            source: None,
            idle: IdleSignal::new(IDLE_BINS),
            rhythm: RhythmEstimator::new(),
            state: VisualState::new(viewport),
            modes: ModeBank::new(tuning),
            active: ModeKind::Swirl,
            epoch: Instant::now(),
            ticks: 0,
        }
    }

    /// Attach the spectrum source; the session goes Active and stays there.
    /// There is no detach: the session ends only with external teardown.
    pub fn attach_source(&mut self, source: Box<dyn SpectrumProvider>) {
        info!("spectrum source attached, session active");
        self.source = Some(source);
    }

    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    /// Select a render mode by its external identifier. Unknown identifiers
    /// keep the previous mode; a broken selector must not take down the
    /// tick loop.
    pub fn select_mode(&mut self, name: &str) {
        match ModeKind::parse(name) {
            Some(kind) => {
                if kind != self.active {
                    info!("render mode: {} -> {}", self.active.as_str(), kind.as_str());
                    self.active = kind;
                }
            }
            None => warn!(
                "unknown render mode '{}', keeping {}",
                name,
                self.active.as_str()
            ),
        }
    }

    pub fn active_mode(&self) -> ModeKind {
        self.active
    }

    pub fn rhythm(&self) -> RhythmState {
        self.rhythm.state()
    }

    pub fn viewport(&self) -> &Viewport {
        self.state.viewport()
    }

    /// Recompute the viewport wholesale. Called between ticks only; a tick
    /// in flight never observes a half-updated viewport.
    pub fn resize(&mut self, width_px: u32, height_px: u32, device_pixel_ratio: f32) {
        self.state.viewport = Viewport::new(width_px, height_px, device_pixel_ratio);
        info!(
            "viewport resized to {}x{} (dpr {:.2})",
            width_px, height_px, device_pixel_ratio
        );
    }

    /// Run one frame. Never panics and never goes blank: without a source it
    /// renders the idle signal against the wall clock.
    pub fn tick(&mut self, surface: &mut dyn DrawSurface) {
        // One consistent snapshot per tick; the provider may rewrite its
        // buffers between ticks.
        let (spectrum, now) = match self.source.as_mut() {
            Some(source) => {
                let now = source.current_time();
                (source.sample_spectrum(), now)
            }
            None => {
                let now = self.epoch.elapsed().as_secs_f64();
                (self.idle.sample(now), now)
            }
        };

        let rhythm = self.rhythm.update(&spectrum, now);
        self.state.time_seconds = now;
        self.ticks += 1;

        if self.ticks % STATS_EVERY_TICKS == 0 {
            debug!(
                "tick {}: mode={} baseline={:.3} beat={:.2}",
                self.ticks,
                self.active.as_str(),
                rhythm.energy_baseline,
                rhythm.beat_strength
            );
        }

        if self.state.viewport.is_degenerate() {
            return;
        }

        let frame = SignalFrame { spectrum, rhythm };
        self.modes
            .mode_mut(self.active)
            .render(&frame, &self.state, surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ScriptedSpectrum, SpectrumSample};
    use crate::render::surface::recording::{DrawCall, RecordingSurface};

    /// Provider that replays a fixed queue of samples on a synthetic clock.
    struct QueuedProvider {
        samples: Vec<SpectrumSample>,
        cursor: usize,
        tick_rate: f64,
    }

    impl QueuedProvider {
        fn constant(value: u8, bins: usize, ticks: usize) -> Self {
            Self {
                samples: vec![SpectrumSample::new(vec![value; bins]); ticks],
                cursor: 0,
                tick_rate: 60.0,
            }
        }
    }

    impl SpectrumProvider for QueuedProvider {
        fn sample_spectrum(&mut self) -> SpectrumSample {
            let sample = self.samples[self.cursor.min(self.samples.len() - 1)].clone();
            self.cursor += 1;
            sample
        }

        fn current_time(&self) -> f64 {
            self.cursor as f64 / self.tick_rate
        }
    }

    fn driver(width: u32, height: u32) -> AnimationDriver {
        AnimationDriver::new(Viewport::new(width, height, 1.0), RenderTuning::default())
    }

    #[test]
    fn test_tick_without_source_still_draws() {
        let mut driver = driver(640, 480);
        let mut surface = RecordingSurface::new(640, 480);
        assert!(!driver.is_active());

        driver.tick(&mut surface);
        assert!(
            !surface.calls.is_empty(),
            "idle fallback must keep painting with no source attached"
        );
        assert_eq!(driver.rhythm().beat_strength, 0.0);
    }

    #[test]
    fn test_attach_source_activates_session() {
        let mut driver = driver(640, 480);
        driver.attach_source(Box::new(ScriptedSpectrum::new(64, 60.0, 120.0)));
        assert!(driver.is_active());
    }

    #[test]
    fn test_unknown_mode_is_retained() {
        let mut driver = driver(640, 480);
        driver.select_mode("burst");
        assert_eq!(driver.active_mode(), ModeKind::Burst);

        driver.select_mode("not-a-mode");
        assert_eq!(driver.active_mode(), ModeKind::Burst);

        // And the loop keeps running afterward.
        let mut surface = RecordingSurface::new(640, 480);
        driver.tick(&mut surface);
        assert!(!surface.calls.is_empty());
    }

    #[test]
    fn test_degenerate_viewport_skips_draw() {
        let mut driver = driver(640, 480);
        driver.attach_source(Box::new(QueuedProvider::constant(128, 64, 10)));
        driver.resize(0, 480, 1.0);

        let mut surface = RecordingSurface::new(640, 480);
        driver.tick(&mut surface);
        assert!(
            surface.calls.is_empty(),
            "degenerate viewport must skip the frame, not draw NaN geometry"
        );

        // Time and rhythm still advanced; a later resize resumes drawing.
        driver.resize(640, 480, 1.0);
        driver.tick(&mut surface);
        assert!(!surface.calls.is_empty());
    }

    #[test]
    fn test_resize_updates_geometry_for_next_frame() {
        let mut driver = driver(800, 600);
        driver.attach_source(Box::new(QueuedProvider::constant(255, 32, 100)));

        let mut surface = RecordingSurface::new(800, 600);
        driver.tick(&mut surface);

        driver.resize(1920, 1080, 1.0);
        let viewport = *driver.viewport();
        assert_eq!(viewport.center(), Vec2::new(960.0, 540.0));
        assert!((viewport.max_radius() - 1080.0 * MAX_RADIUS_FRACTION).abs() < 1e-3);

        // Worst-case saturated frame after the resize stays inside the new
        // bounds.
        surface.clear();
        driver.tick(&mut surface);
        for call in surface.arcs() {
            let DrawCall::Arc { center, radius, .. } = call else {
                unreachable!()
            };
            assert!(center.x - radius >= 0.0 && center.x + radius <= 1920.0);
            assert!(center.y - radius >= 0.0 && center.y + radius <= 1080.0);
        }
    }

    #[test]
    fn test_burst_trail_survives_mode_switch() {
        let mut driver = driver(800, 600);
        driver.attach_source(Box::new(QueuedProvider::constant(100, 32, 1000)));
        driver.select_mode("burst");

        let mut surface = RecordingSurface::new(800, 600);
        for _ in 0..10 {
            driver.tick(&mut surface);
        }

        // Leave burst, render a few swirl frames, come back.
        driver.select_mode("swirl");
        for _ in 0..5 {
            driver.tick(&mut surface);
        }
        driver.select_mode("burst");

        surface.clear();
        driver.tick(&mut surface);
        let DrawCall::Polyline { points, .. } = surface.polylines()[0] else {
            unreachable!()
        };
        assert_eq!(
            points.len(),
            11,
            "trail must resume from 10 retained points, not restart"
        );
    }

    #[test]
    fn test_spectrum_snapshot_is_read_once_per_tick() {
        struct CountingProvider {
            reads: std::rc::Rc<std::cell::Cell<usize>>,
        }
        impl SpectrumProvider for CountingProvider {
            fn sample_spectrum(&mut self) -> SpectrumSample {
                self.reads.set(self.reads.get() + 1);
                SpectrumSample::new(vec![90; 64])
            }
            fn current_time(&self) -> f64 {
                self.reads.get() as f64 / 60.0
            }
        }

        let reads = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut driver = driver(640, 480);
        driver.attach_source(Box::new(CountingProvider {
            reads: reads.clone(),
        }));

        let mut surface = RecordingSurface::new(640, 480);
        for _ in 0..7 {
            driver.tick(&mut surface);
        }
        assert_eq!(reads.get(), 7);
    }

    #[test]
    fn test_scripted_session_beats_reach_the_render() {
        let mut driver = driver(640, 480);
        driver.attach_source(Box::new(ScriptedSpectrum::new(64, 60.0, 120.0)));

        let mut surface = RecordingSurface::new(640, 480);
        let mut beat_ticks = 0;
        for _ in 0..300 {
            driver.tick(&mut surface);
            if driver.rhythm().beat_triggered {
                beat_ticks += 1;
            }
        }
        assert!(
            beat_ticks >= 8,
            "five seconds at 120 BPM should trigger ~10 beats, got {}",
            beat_ticks
        );
    }
}
