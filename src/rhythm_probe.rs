use anyhow::Result;
use log::info;

use vortex_visualizer::analysis::{RhythmEstimator, ScriptedSpectrum, SpectrumProvider};

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting rhythm probe");

    let mut source = ScriptedSpectrum::new(64, 30.0, 120.0);
    let mut estimator = RhythmEstimator::new();

    loop {
        let now = source.current_time();
        let spectrum = source.sample_spectrum();
        let state = estimator.update(&spectrum, now);

        print!("\x1B[2J\x1B[1;1H"); // Clear screen and move cursor to top

        println!("Vortex Rhythm Probe - Synthetic Spectrum");
        println!("========================================");
        println!();

        for (i, &magnitude) in spectrum.bins().iter().enumerate().take(32) {
            let bar_height = (magnitude as usize * 50) / 255;

            print!("bin {:2} |", i);
            for _ in 0..bar_height.min(50) {
                print!("█");
            }
            println!(" {}", magnitude);
        }

        println!();
        println!("t:        {:8.2}s", now);
        println!("baseline: {:8.3}", state.energy_baseline);
        println!(
            "strength: {:8.3} {}",
            state.beat_strength,
            if state.beat_triggered { "BEAT" } else { "" }
        );
        println!();
        println!("Press Ctrl+C to exit");

        std::thread::sleep(std::time::Duration::from_millis(33));
    }
}
