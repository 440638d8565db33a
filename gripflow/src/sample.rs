//! Force samples and log-line parsing.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Arrival time of a sample, split into whole seconds and nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timestamp {
    pub seconds: u64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn from_duration(elapsed: Duration) -> Self {
        Self {
            seconds: elapsed.as_secs(),
            nanos: elapsed.subsec_nanos(),
        }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.nanos as f64 * 1e-9
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// One record appended to the sensor log, not yet parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub timestamp: Timestamp,
    pub line: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("malformed sample {line:?}: {reason}")]
    MalformedSample { line: String, reason: String },
}

/// Zero-based index of the force reading in a comma-separated log line.
pub const FORCE_FIELD_INDEX: usize = 2;

/// Parse the force reading out of one log line.
///
/// Lines are comma-separated with the force in the third field, e.g.
/// `12.541,87,4.25,ok`. A missing field or a non-numeric reading is
/// malformed; callers log and skip it, the stream continues.
pub fn parse_force_line(line: &str) -> Result<f64, SampleError> {
    let trimmed = line.trim();
    let field = trimmed
        .split(',')
        .nth(FORCE_FIELD_INDEX)
        .ok_or_else(|| SampleError::MalformedSample {
            line: trimmed.to_string(),
            reason: format!("missing field {FORCE_FIELD_INDEX}"),
        })?;
    field
        .trim()
        .parse::<f64>()
        .map_err(|e| SampleError::MalformedSample {
            line: trimmed.to_string(),
            reason: format!("bad force value {field:?}: {e}"),
        })
}
