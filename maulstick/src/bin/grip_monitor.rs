//! Follow a grip-force log (or a synthetic profile) and print the
//! stabilization and assist decisions the session would make.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use clap::Parser;
use gripflow::assist::{AssistCurve, CalibrationRange};
use gripflow::collector::{CollectError, CollectorConfig, ForceCollector};
use gripflow::source::{LogFollower, ScriptedSource};
use gripflow::stability::{StabilityConfig, StabilityDetector};
use maulstick::grip_profiles::{sample_profile, TestGrips};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Monitor grip stability and assist levels from a force log")]
struct Args {
    /// Force log to follow. Exactly one of --log or --profile.
    #[arg(long)]
    log: Option<PathBuf>,

    /// Synthetic profile to run instead of a log: steady, ramp, tremor,
    /// or session.
    #[arg(long)]
    profile: Option<String>,

    /// Seconds of synthetic profile to generate.
    #[arg(long, default_value_t = 20.0)]
    duration: f64,

    /// Synthetic sample rate in Hz.
    #[arg(long, default_value_t = 50.0)]
    rate: f64,

    /// Calibrated range minimum.
    #[arg(long, default_value_t = 0.0)]
    range_min: f64,

    /// Calibrated range maximum.
    #[arg(long, default_value_t = 10.0)]
    range_max: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let collector = match (&args.log, &args.profile) {
        (Some(path), None) => {
            info!("following force log {}", path.display());
            ForceCollector::spawn(LogFollower::new(path), CollectorConfig::default())
        }
        (None, Some(name)) => {
            let grips = TestGrips::new(args.range_max);
            let profile = match grips.get_profile(name) {
                Some(profile) => profile,
                None => bail!("unknown profile {name:?}"),
            };
            let samples = sample_profile(
                profile.as_ref(),
                Duration::from_secs_f64(args.duration),
                args.rate,
            );
            info!(
                "running profile {:?}: {} samples",
                profile.description(),
                samples.len()
            );
            let batches = samples.chunks(5).map(|chunk| chunk.to_vec()).collect();
            ForceCollector::spawn(
                ScriptedSource::new(batches).unavailable_when_exhausted(),
                CollectorConfig::default(),
            )
        }
        _ => bail!("exactly one of --log or --profile is required"),
    };

    let mut detector = StabilityDetector::new(StabilityConfig::default());
    let curve = AssistCurve::default();
    let range = CalibrationRange {
        min: args.range_min,
        max: args.range_max,
    };

    loop {
        match collector.poll() {
            Ok(records) => {
                for record in &records {
                    detector.ingest(record);
                }
            }
            Err(CollectError::Disconnected { error, .. }) => {
                warn!(
                    "force stream ended: {}",
                    error.unwrap_or_else(|| "end of stream".to_string())
                );
                break;
            }
        }
        if let Some(value) = detector.take_stabilized() {
            info!(
                "stabilized {value:.2} -> assist level {}",
                curve.select_level(value, &range)
            );
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    collector.shutdown();
    info!(
        "{} samples seen, {} skipped",
        detector.samples_seen(),
        detector.skipped()
    );
    Ok(())
}
