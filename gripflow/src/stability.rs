//! Grip stability detection.
//!
//! Readings stream in continuously; the detector watches a short rolling
//! window and declares the grip stable once the window is full and its
//! spread drops under a threshold. The stabilized value is the window
//! mean, handed off through a consume-once flag so automatic assist acts
//! on each acceptance exactly once.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::sample::{parse_force_line, RawSample};
use crate::window::RollingWindow;

/// Detector phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilityState {
    /// Waiting for the signal to clear the baseline.
    Init,
    /// Signal seen above baseline, watching for the window to settle.
    Rising,
    /// The window has qualified at least once since entering Rising.
    Stable,
}

/// Detector tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Rolling window length in samples.
    pub window_len: usize,
    /// Readings at or below this are treated as no grip at all.
    pub baseline: f64,
    /// The window qualifies as stable when its population standard
    /// deviation is strictly below this.
    pub max_std_dev: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window_len: 5,
            baseline: 1.0,
            max_std_dev: 0.5,
        }
    }
}

/// Rolling-window stability detector with a consume-once handoff.
///
/// In calibration mode only new extremes are accepted, so the value on
/// hand when a calibration phase ends is the strongest stable grip seen
/// during it.
#[derive(Debug, Clone)]
pub struct StabilityDetector {
    config: StabilityConfig,
    window: RollingWindow,
    state: StabilityState,
    calibration: bool,
    ceiling: Option<f64>,
    stabilized: bool,
    ever_stabilized: bool,
    stabilized_value: f64,
    samples_seen: u64,
    skipped: u64,
}

impl StabilityDetector {
    pub fn new(config: StabilityConfig) -> Self {
        let window = RollingWindow::new(config.window_len);
        Self {
            config,
            window,
            state: StabilityState::Init,
            calibration: false,
            ceiling: None,
            stabilized: false,
            ever_stabilized: false,
            stabilized_value: 0.0,
            samples_seen: 0,
            skipped: 0,
        }
    }

    /// Parse one raw record and feed it in. Malformed lines are logged
    /// and skipped; the stream continues.
    pub fn ingest(&mut self, sample: &RawSample) {
        match parse_force_line(&sample.line) {
            Ok(force) => self.push_sample(force),
            Err(e) => {
                self.skipped += 1;
                warn!("skipping sample at {}: {e}", sample.timestamp);
            }
        }
    }

    /// Feed one parsed force reading.
    pub fn push_sample(&mut self, force: f64) {
        self.samples_seen += 1;
        self.window.push(force);

        match self.state {
            StabilityState::Init => {
                if force > self.config.baseline {
                    debug!("grip above baseline ({force:.2}), watching for stability");
                    self.state = StabilityState::Rising;
                }
            }
            StabilityState::Rising | StabilityState::Stable => self.evaluate_window(),
        }
    }

    fn evaluate_window(&mut self) {
        if !self.window.is_full() {
            return;
        }
        let std_dev = self.window.std_dev();
        if std_dev >= self.config.max_std_dev {
            return;
        }
        let mean = self.window.mean();
        if self.state != StabilityState::Stable {
            debug!("grip stabilized: mean {mean:.2}, std dev {std_dev:.3}");
            self.state = StabilityState::Stable;
        }
        self.accept(mean);
    }

    fn accept(&mut self, mean: f64) {
        if self.calibration {
            // Only a new extreme counts during calibration; the value on
            // hand at the phase boundary must be the phase's ceiling.
            match self.ceiling {
                Some(ceiling) if mean <= ceiling => return,
                _ => {}
            }
            self.ceiling = Some(mean);
        }
        if !self.stabilized {
            info!("stabilized grip value {mean:.2}");
        }
        self.stabilized = true;
        self.ever_stabilized = true;
        self.stabilized_value = mean;
    }

    /// Consume-once handoff: the accepted value, at most once per
    /// acceptance.
    pub fn take_stabilized(&mut self) -> Option<f64> {
        if self.stabilized {
            self.stabilized = false;
            Some(self.stabilized_value)
        } else {
            None
        }
    }

    /// Latest accepted value since the last reset, regardless of whether
    /// it was already taken.
    pub fn stabilized_value(&self) -> Option<f64> {
        if self.ever_stabilized {
            Some(self.stabilized_value)
        } else {
            None
        }
    }

    /// Switch acceptance between free-running and extreme-only.
    pub fn set_calibration(&mut self, enabled: bool) {
        if self.calibration != enabled {
            debug!("calibration mode {}", if enabled { "on" } else { "off" });
        }
        self.calibration = enabled;
    }

    /// Forget all detection state. Callers also clear their sample queue
    /// so readings from before the reset are not reprocessed.
    pub fn reset(&mut self) {
        self.window.clear();
        self.state = StabilityState::Init;
        self.stabilized = false;
        self.ever_stabilized = false;
        self.stabilized_value = 0.0;
        self.ceiling = None;
        debug!("stability detection reset");
    }

    pub fn state(&self) -> StabilityState {
        self.state
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}
