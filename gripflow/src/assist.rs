//! Calibrated mapping from stabilized grip values to assist levels.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Per-user force range captured during the calibration phases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRange {
    /// Stabilized value captured with the weakest accepted grip.
    pub min: f64,
    /// Stabilized value captured with the strongest accepted grip.
    pub max: f64,
}

impl Default for CalibrationRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl CalibrationRange {
    /// Normalize a reading into [0, 1] against the range, clamped at both
    /// ends. A degenerate range (max at or below min) maps everything to
    /// 0 and warns.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            warn!(
                "degenerate calibration range ({} .. {}), treating grip as weakest",
                self.min, self.max
            );
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Curve tuning: normalized grip through a working sub-range, a logistic
/// squash, and a threshold ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistCurve {
    /// Lower edge of the working sub-range; normalized readings below it
    /// score as the weakest grip.
    pub working_low: f64,
    /// Upper edge of the working sub-range; normalized readings above it
    /// score as the strongest grip.
    pub working_high: f64,
    /// Logistic steepness.
    pub logistic_k: f64,
    /// Logistic midpoint within the working range.
    pub logistic_mid: f64,
    /// Score thresholds, highest first. Meeting `thresholds[i]` selects
    /// level `thresholds.len() - i + 1`; meeting none selects level 1.
    pub thresholds: Vec<f64>,
}

impl Default for AssistCurve {
    fn default() -> Self {
        Self {
            working_low: 0.1,
            working_high: 0.9,
            logistic_k: 8.0,
            logistic_mid: 0.5,
            thresholds: vec![0.66, 0.33],
        }
    }
}

impl AssistCurve {
    fn logistic(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-self.logistic_k * (x - self.logistic_mid)).exp())
    }

    /// Score a stabilized reading against a calibrated range.
    ///
    /// The result is in [0, 1] and monotonic in the reading.
    pub fn score(&self, value: f64, range: &CalibrationRange) -> f64 {
        debug_assert!(self.working_high > self.working_low);
        let normalized = range.normalize(value);
        let span = self.working_high - self.working_low;
        let working = ((normalized - self.working_low) / span).clamp(0.0, 1.0);
        self.logistic(working)
    }

    /// Map a stabilized reading to a discrete assist level.
    ///
    /// With the default thresholds a strong grip selects level 3, a
    /// moderate one level 2, and anything weaker level 1. Level 0 is
    /// never selected here; closing the magnifier entirely is a mode
    /// decision, not a score.
    pub fn select_level(&self, value: f64, range: &CalibrationRange) -> usize {
        let score = self.score(value, range);
        for (index, threshold) in self.thresholds.iter().enumerate() {
            if score >= *threshold {
                return self.thresholds.len() - index + 1;
            }
        }
        1
    }
}
