use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable rendering parameters, loadable from a JSON preset file.
///
/// The defaults reproduce the stock look; presets only need to list the
/// fields they change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTuning {
    /// Alpha of swirl mode's per-frame fade overlay. Lower values leave
    /// longer motion trails.
    pub swirl_trail_decay: f32,

    /// Alpha of burst mode's per-frame fade overlay.
    pub burst_trail_decay: f32,

    /// Alpha of the spectrum-bars per-frame clear. Bars occlude rather than
    /// trail, so this clears harder than the other modes fade.
    pub bars_clear_decay: f32,

    /// Upper bound on burst mode's scribble history; oldest points are
    /// evicted first.
    pub max_scribble_points: usize,

    /// Number of bars the spectrum is partitioned into.
    pub bar_count: usize,

    /// Scales how hard beats push radii, stroke widths, and lightness.
    pub beat_response: f32,
}

impl Default for RenderTuning {
    fn default() -> Self {
        Self {
            swirl_trail_decay: 0.10,
            burst_trail_decay: 0.12,
            bars_clear_decay: 0.22,
            max_scribble_points: 200,
            bar_count: 64,
            beat_response: 1.0,
        }
    }
}

impl RenderTuning {
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
