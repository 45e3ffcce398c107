use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use vortex_visualizer::analysis::ScriptedSpectrum;
use vortex_visualizer::render::PixmapSurface;
use vortex_visualizer::{AnimationDriver, RenderTuning, Viewport};

#[derive(Parser)]
#[command(name = "vortex")]
#[command(about = "Render an audio-reactive visual session to numbered PNG frames")]
struct Args {
    /// Render mode: swirl, burst, or spectrumbars
    #[arg(short, long, default_value = "swirl")]
    mode: String,

    /// Output directory for the frames
    #[arg(short, long, default_value = "frames")]
    out_dir: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Number of frames to render
    #[arg(short = 'n', long, default_value = "300")]
    frames: u32,

    /// Tick rate of the synthetic session
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Spectrum resolution in bins
    #[arg(long, default_value = "64")]
    bins: usize,

    /// Tempo of the synthetic kick pattern
    #[arg(long, default_value = "120")]
    bpm: f64,

    /// Optional tuning preset (JSON, fields of RenderTuning)
    #[arg(long)]
    preset: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let tuning = match &args.preset {
        Some(path) => RenderTuning::load(path)?,
        None => RenderTuning::default(),
    };

    std::fs::create_dir_all(&args.out_dir)?;

    // Surface allocation is the one fatal failure; report it before the
    // first tick.
    let mut surface = PixmapSurface::new(args.width, args.height)?;

    let mut driver = AnimationDriver::new(
        Viewport::new(args.width, args.height, 1.0),
        tuning,
    );
    driver.select_mode(&args.mode);
    driver.attach_source(Box::new(ScriptedSpectrum::new(
        args.bins,
        args.fps as f64,
        args.bpm,
    )));

    info!(
        "Rendering {} {} frames at {}x{} ({} bins, {} BPM)",
        args.frames,
        driver.active_mode().as_str(),
        args.width,
        args.height,
        args.bins,
        args.bpm
    );

    let mut beats = 0u32;
    for frame in 0..args.frames {
        driver.tick(&mut surface);
        if driver.rhythm().beat_triggered {
            beats += 1;
        }
        let path = args.out_dir.join(format!("frame_{:05}.png", frame));
        surface.save_png(&path)?;
    }

    info!(
        "Done: {} frames written to {}, {} beats detected",
        args.frames,
        args.out_dir.display(),
        beats
    );

    Ok(())
}
