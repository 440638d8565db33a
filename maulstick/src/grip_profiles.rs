//! Grip-force profiles for harness runs
//!
//! Provides parametric force traces for exercising the stability and
//! assist pipeline, including steady holds, ramps, tremor plateaus, and
//! piecewise session scripts. Profiles render to log lines compatible
//! with the force parser, so a synthetic trace exercises the same path as
//! a live sensor file.

use std::time::Duration;

use gripflow::sample::{RawSample, Timestamp};

/// Trait for grip-force profiles
pub trait GripProfile: Send + Sync {
    /// Get the force reading at given time
    fn force_at(&self, t: Duration) -> f64;

    /// Get profile description
    fn description(&self) -> &str;
}

/// Constant hold (no variation)
pub struct SteadyGrip {
    /// Held force
    force: f64,
}

impl SteadyGrip {
    pub fn new(force: f64) -> Self {
        Self { force }
    }
}

impl GripProfile for SteadyGrip {
    fn force_at(&self, _t: Duration) -> f64 {
        self.force
    }

    fn description(&self) -> &str {
        "Steady hold"
    }
}

/// Linear ramp from rest to a peak, then hold
pub struct RampHoldGrip {
    /// Force reached at the end of the ramp
    peak: f64,
    /// Ramp duration
    rise: Duration,
}

impl RampHoldGrip {
    pub fn new(peak: f64, rise: Duration) -> Self {
        Self { peak, rise }
    }
}

impl GripProfile for RampHoldGrip {
    fn force_at(&self, t: Duration) -> f64 {
        if self.rise.is_zero() || t >= self.rise {
            self.peak
        } else {
            self.peak * t.as_secs_f64() / self.rise.as_secs_f64()
        }
    }

    fn description(&self) -> &str {
        "Ramp and hold"
    }
}

/// Plateau with seeded tremor jitter
///
/// The jitter is a precomputed random walk with momentum, sampled at a
/// 10 ms cadence, so the same seed always produces the same trace.
pub struct TremorGrip {
    /// Plateau force the jitter rides on
    plateau: f64,
    /// Precomputed jitter offsets
    samples: Vec<f64>,
}

impl TremorGrip {
    pub fn new(plateau: f64, tremor: f64, seed: u64, duration: Duration) -> Self {
        use rand::{Rng, SeedableRng};
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let count = ((duration.as_millis() / 10).max(1)) as usize;
        let mut samples = Vec::with_capacity(count);
        let mut value: f64 = 0.0;
        for _ in 0..count {
            let step = rng.gen_range(-1.0..1.0) * tremor * 0.3;
            value = (value * 0.7 + step).clamp(-tremor, tremor);
            samples.push(value);
        }

        Self { plateau, samples }
    }
}

impl GripProfile for TremorGrip {
    fn force_at(&self, t: Duration) -> f64 {
        let index = ((t.as_millis() / 10) as usize).min(self.samples.len() - 1);
        (self.plateau + self.samples[index]).max(0.0)
    }

    fn description(&self) -> &str {
        "Plateau with tremor"
    }
}

/// Piecewise profile: each segment plays for its duration
///
/// Past the last segment the final segment's end value holds.
pub struct SequenceGrip {
    segments: Vec<(Duration, Box<dyn GripProfile>)>,
}

impl SequenceGrip {
    pub fn new(segments: Vec<(Duration, Box<dyn GripProfile>)>) -> Self {
        Self { segments }
    }
}

impl GripProfile for SequenceGrip {
    fn force_at(&self, t: Duration) -> f64 {
        let mut offset = t;
        for (duration, profile) in &self.segments {
            if offset < *duration {
                return profile.force_at(offset);
            }
            offset -= *duration;
        }
        match self.segments.last() {
            Some((duration, profile)) => profile.force_at(*duration),
            None => 0.0,
        }
    }

    fn description(&self) -> &str {
        "Segmented session script"
    }
}

/// Collection of standard grip profiles
pub struct TestGrips {
    /// Force scale the named profiles are built around
    pub peak_force: f64,
}

impl TestGrips {
    pub fn new(peak_force: f64) -> Self {
        Self { peak_force }
    }

    /// Get all standard profiles
    pub fn all_profiles(&self) -> Vec<Box<dyn GripProfile>> {
        vec![
            Box::new(SteadyGrip::new(self.peak_force * 0.5)),
            Box::new(RampHoldGrip::new(self.peak_force, Duration::from_secs(5))),
            Box::new(TremorGrip::new(
                self.peak_force * 0.6,
                self.peak_force * 0.15,
                42,
                Duration::from_secs(60),
            )),
            Box::new(self.session_script()),
        ]
    }

    /// Get profile by name
    pub fn get_profile(&self, name: &str) -> Option<Box<dyn GripProfile>> {
        match name.to_lowercase().as_str() {
            "steady" => Some(Box::new(SteadyGrip::new(self.peak_force * 0.5))),
            "ramp" => Some(Box::new(RampHoldGrip::new(
                self.peak_force,
                Duration::from_secs(5),
            ))),
            "tremor" => Some(Box::new(TremorGrip::new(
                self.peak_force * 0.6,
                self.peak_force * 0.15,
                42,
                Duration::from_secs(60),
            ))),
            "session" => Some(Box::new(self.session_script())),
            _ => None,
        }
    }

    /// Weak hold, tremor plateau, strong hold: one pass over the assist
    /// ladder.
    fn session_script(&self) -> SequenceGrip {
        SequenceGrip::new(vec![
            (
                Duration::from_secs(5),
                Box::new(SteadyGrip::new(self.peak_force * 0.25)),
            ),
            (
                Duration::from_secs(5),
                Box::new(TremorGrip::new(
                    self.peak_force * 0.5,
                    self.peak_force * 0.1,
                    7,
                    Duration::from_secs(5),
                )),
            ),
            (
                Duration::from_secs(5),
                Box::new(SteadyGrip::new(self.peak_force * 0.9)),
            ),
        ])
    }
}

/// Sample a profile at `rate_hz` into parser-compatible log lines.
pub fn sample_profile(
    profile: &dyn GripProfile,
    duration: Duration,
    rate_hz: f64,
) -> Vec<RawSample> {
    let interval = Duration::from_secs_f64(1.0 / rate_hz);
    let mut samples = Vec::new();
    let mut t = Duration::ZERO;
    let mut seq = 0u64;
    while t <= duration {
        let force = profile.force_at(t);
        samples.push(RawSample {
            timestamp: Timestamp::from_duration(t),
            line: format!("{:.3},{seq},{force:.4}", t.as_secs_f64()),
        });
        seq += 1;
        t += interval;
    }
    samples
}
