use super::SpectrumSample;

/// External source of spectral frames and the session clock.
///
/// Implementations wrap whatever acquisition stack feeds the visualizer
/// (file playback, microphone capture, a prescan table). The core calls
/// `current_time` then `sample_spectrum` exactly once per tick and treats the
/// returned sample as an immutable snapshot; providers are free to rewrite
/// their internal buffers between ticks.
///
/// Contract: the bin count is fixed for the lifetime of the session, and
/// `current_time` is monotonic, audio-clock-derived where possible.
pub trait SpectrumProvider {
    /// Fixed-length magnitude snapshot for the current tick.
    fn sample_spectrum(&mut self) -> SpectrumSample;

    /// Session clock in seconds.
    fn current_time(&self) -> f64;
}

/// Fallback signal used when no provider is attached: a faint, slowly
/// breathing spectrum so the screen is never blank. Levels stay far below
/// the beat trigger floor, so idling can never read as rhythm.
pub struct IdleSignal {
    bins: usize,
}

/// Idle magnitude range, out of 255. The low-band mean must stay under the
/// beat trigger floor (0.02 normalized) even against a zero baseline, so
/// idling can never read as rhythm.
const IDLE_FLOOR: f32 = 2.0;
const IDLE_PEAK: f32 = 5.0;

impl IdleSignal {
    pub fn new(bins: usize) -> Self {
        Self { bins: bins.max(1) }
    }

    pub fn sample(&self, time_seconds: f64) -> SpectrumSample {
        let t = time_seconds as f32;
        let bins = (0..self.bins)
            .map(|i| {
                let phase = t * 0.7 + i as f32 * 0.45;
                let value = IDLE_FLOOR + (IDLE_PEAK - IDLE_FLOOR) * (0.5 + 0.5 * phase.sin());
                value.round() as u8
            })
            .collect();
        SpectrumSample::new(bins)
    }
}

/// Deterministic synthetic session: a kick pulse in the low band at a fixed
/// tempo plus harmonic shimmer above it. Drives the demo binaries, the
/// benchmarks, and the end-to-end tests without any audio stack.
pub struct ScriptedSpectrum {
    bins: usize,
    tick_rate: f64,
    beat_period: f64,
    tick: u64,
}

impl ScriptedSpectrum {
    pub fn new(bins: usize, tick_rate: f64, bpm: f64) -> Self {
        Self {
            bins: bins.max(1),
            tick_rate: tick_rate.max(1.0),
            beat_period: 60.0 / bpm.max(1.0),
            tick: 0,
        }
    }

    fn magnitude_at(&self, bin: usize, t: f64) -> u8 {
        let n = self.bins as f32;
        let i = bin as f32;
        let phase_in_beat = (t % self.beat_period) as f32;

        // Kick: a sharp low-band transient that decays within the beat.
        let kick_envelope = (-phase_in_beat * 14.0).exp();
        let low_band = (n * 0.15).max(8.0);
        let kick = if i < low_band {
            let rolloff = 1.0 - i / low_band;
            205.0 * kick_envelope * rolloff
        } else {
            0.0
        };

        // Sustained harmonic bed across the rest of the spectrum.
        let shimmer_phase = t as f32 * 2.4 + i * 0.35;
        let rolloff = 1.0 - i / n;
        let shimmer = (28.0 + 70.0 * shimmer_phase.sin().abs()) * rolloff;

        let floor = 14.0;
        (floor + kick + shimmer).min(255.0) as u8
    }
}

impl SpectrumProvider for ScriptedSpectrum {
    fn sample_spectrum(&mut self) -> SpectrumSample {
        let t = self.current_time();
        let bins = (0..self.bins).map(|i| self.magnitude_at(i, t)).collect();
        self.tick += 1;
        SpectrumSample::new(bins)
    }

    fn current_time(&self) -> f64 {
        self.tick as f64 / self.tick_rate
    }
}
