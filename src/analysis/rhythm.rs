use log::debug;

use super::{RhythmState, SpectrumSample};

/// Smoothing factor for the energy baseline.
const BASELINE_ALPHA: f32 = 0.12;
/// A beat fires when low-band energy exceeds `baseline * RATIO + FLOOR`.
const TRIGGER_RATIO: f32 = 1.35;
const TRIGGER_FLOOR: f32 = 0.02;
/// Minimum spacing between triggers, seconds. Prevents double-triggering on
/// a single transient.
const REFRACTORY_SECONDS: f64 = 0.18;
/// Length of the linear beat-strength decay envelope, seconds.
const DECAY_SECONDS: f64 = 0.25;
/// The low sub-band is the first max(8, 15%) of the bins.
const LOW_BAND_MIN_BINS: usize = 8;
const LOW_BAND_FRACTION: f32 = 0.15;

/// Maintains a smoothed low-band energy baseline over successive spectrum
/// snapshots and detects discrete beat events against it, producing a
/// continuously decaying beat-strength scalar.
pub struct RhythmEstimator {
    state: RhythmState,
}

impl RhythmEstimator {
    pub fn new() -> Self {
        Self {
            state: RhythmState::default(),
        }
    }

    pub fn state(&self) -> RhythmState {
        self.state
    }

    /// Consume one spectrum snapshot and advance the rhythm signal.
    ///
    /// Pure function of the previous state, the sample, and the clock; never
    /// panics, and silent input only decays the baseline without triggering.
    pub fn update(&mut self, spectrum: &SpectrumSample, now_seconds: f64) -> RhythmState {
        let low_energy = Self::low_band_energy(spectrum);

        // Triggers compare against the baseline as it stood before this
        // sample folded in, so a spike out of silence cannot mask itself by
        // seeding the average.
        let prior_baseline = self.state.energy_baseline;

        self.state.energy_baseline = if prior_baseline == 0.0 {
            low_energy
        } else {
            prior_baseline * (1.0 - BASELINE_ALPHA) + low_energy * BASELINE_ALPHA
        };

        let threshold = prior_baseline * TRIGGER_RATIO + TRIGGER_FLOOR;
        let refractory_over = now_seconds - self.state.last_beat_time > REFRACTORY_SECONDS;
        let triggered = low_energy > threshold && refractory_over;
        if triggered {
            debug!(
                "beat: low={:.3} threshold={:.3} t={:.3}s",
                low_energy, threshold, now_seconds
            );
            self.state.last_beat_time = now_seconds;
        }
        self.state.beat_triggered = triggered;

        let elapsed = now_seconds - self.state.last_beat_time;
        self.state.beat_strength = (1.0 - elapsed / DECAY_SECONDS).clamp(0.0, 1.0) as f32;

        self.state
    }

    fn low_band_energy(spectrum: &SpectrumSample) -> f32 {
        if spectrum.is_empty() {
            return 0.0;
        }
        let band = (spectrum.len() as f32 * LOW_BAND_FRACTION).floor() as usize;
        let band = band.max(LOW_BAND_MIN_BINS).min(spectrum.len());
        let sum: f32 = (0..band).map(|i| spectrum.amp(i)).sum();
        sum / band as f32
    }
}

impl Default for RhythmEstimator {
    fn default() -> Self {
        Self::new()
    }
}
