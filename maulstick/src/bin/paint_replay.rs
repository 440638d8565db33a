//! Offline replay: paint a scripted spiral stroke and export the buffers.

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use easel::config::PaintConfig;
use easel::export::save_png;
use easel::painter::Painter;
use gripflow::assist::AssistCurve;
use gripflow::stability::StabilityConfig;
use maulstick::probe::PathProbe;
use maulstick::runner::{held_left_frames, idle_frames, run_session};
use maulstick::session::AdaptiveSession;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a scripted stroke and export the painted buffers")]
struct Args {
    /// Canvas resolution (square).
    #[arg(long, default_value_t = 1080)]
    resolution: u32,

    /// Brush radius in texels.
    #[arg(long, default_value_t = 10)]
    brush_size: i32,

    /// Frames of scripted stroke.
    #[arg(long, default_value_t = 600)]
    frames: usize,

    /// Simulated frame interval in seconds.
    #[arg(long, default_value_t = 1.0 / 90.0)]
    dt: f64,

    /// Output directory for the exported buffers.
    #[arg(long, default_value = "replay_out")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut config = PaintConfig {
        width: args.resolution,
        height: args.resolution,
        ..Default::default()
    };
    config.brush.set_size(args.brush_size);

    let total = args.frames as u64;
    let probe = PathProbe::new(move |frame| {
        if frame >= total {
            return None;
        }
        let t = frame as f64 / total as f64;
        let angle = t * 6.0 * PI;
        let radius = 0.05 + 0.4 * t;
        Some((0.5 + radius * angle.cos(), 0.5 + radius * angle.sin()))
    });

    let painter = Painter::new(config, probe);
    let mut session = AdaptiveSession::new(
        painter,
        None,
        StabilityConfig::default(),
        AssistCurve::default(),
    );
    // No sensor attached: skip straight past the calibration phases.
    session.next_phase();
    session.next_phase();

    info!("replaying {} frames of spiral stroke", args.frames);
    let mut inputs = held_left_frames(args.frames, args.dt);
    inputs.extend(idle_frames(5, args.dt));
    let summary = run_session(&mut session, &inputs);
    info!(
        "replay done: {} events, {} undo checkpoints",
        summary.events.len(),
        summary.undo_checkpoints
    );

    let canvas_path = args.output.join("canvas.png");
    save_png(session.painter().canvas(), &canvas_path).context("export canvas")?;
    let result_path = args.output.join("result.png");
    save_png(session.painter().result(), &result_path).context("export result")?;
    info!("buffers exported to {}", args.output.display());

    Ok(())
}
