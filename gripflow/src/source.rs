//! Where force log records come from.

use crate::sample::{RawSample, Timestamp};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The stream is gone. Terminal: the collector marks itself
    /// disconnected instead of retrying.
    #[error("sample stream unavailable: {reason}")]
    Unavailable { reason: String },
}

/// A growing stream of force log records.
///
/// `read_new` returns the records appended since the previous call, or an
/// empty batch when nothing new arrived.
pub trait SampleSource: Send {
    fn read_new(&mut self) -> Result<Vec<RawSample>, SourceError>;
}

/// Tails a growing text file.
///
/// The byte offset is the follower's high-water mark: records before it
/// are never re-read. An incomplete trailing line is carried until the
/// writer finishes it.
pub struct LogFollower {
    path: PathBuf,
    offset: u64,
    partial: String,
    started: Instant,
}

impl LogFollower {
    /// Follow `path` from the beginning of the file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            partial: String::new(),
            started: Instant::now(),
        }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl SampleSource for LogFollower {
    fn read_new(&mut self) -> Result<Vec<RawSample>, SourceError> {
        let mut file = File::open(&self.path).map_err(|e| SourceError::Unavailable {
            reason: format!("{}: {e}", self.path.display()),
        })?;
        file.seek(SeekFrom::Start(self.offset))
            .map_err(|e| SourceError::Unavailable {
                reason: format!("seek {}: {e}", self.path.display()),
            })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| SourceError::Unavailable {
                reason: format!("read {}: {e}", self.path.display()),
            })?;
        self.offset += bytes.len() as u64;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        // Lossy conversion keeps the stream alive through encoding
        // glitches; a mangled line fails parsing later and is skipped.
        let mut text = std::mem::take(&mut self.partial);
        text.push_str(&String::from_utf8_lossy(&bytes));

        let complete_up_to = match text.rfind('\n') {
            Some(index) => index + 1,
            None => {
                self.partial = text;
                return Ok(Vec::new());
            }
        };
        self.partial = text[complete_up_to..].to_string();

        let timestamp = Timestamp::from_duration(self.started.elapsed());
        let records = text[..complete_up_to]
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| RawSample {
                timestamp,
                line: line.to_string(),
            })
            .collect();
        Ok(records)
    }
}

/// Scripted batches for tests and harness replays.
///
/// Yields its batches in order, then empty batches forever, or reports the
/// stream gone once exhausted when so configured.
pub struct ScriptedSource {
    batches: VecDeque<Vec<RawSample>>,
    end_unavailable: bool,
}

impl ScriptedSource {
    pub fn new(batches: Vec<Vec<RawSample>>) -> Self {
        Self {
            batches: batches.into(),
            end_unavailable: false,
        }
    }

    /// After the last batch, report the stream as gone instead of idling.
    pub fn unavailable_when_exhausted(mut self) -> Self {
        self.end_unavailable = true;
        self
    }

    /// One single-record batch per force reading, with well-formed lines.
    pub fn from_forces(forces: &[f64]) -> Self {
        let batches = forces
            .iter()
            .enumerate()
            .map(|(i, force)| {
                vec![RawSample {
                    timestamp: Timestamp {
                        seconds: i as u64,
                        nanos: 0,
                    },
                    line: format!("{:.3},{i},{force}", i as f64 * 0.1),
                }]
            })
            .collect();
        Self::new(batches)
    }
}

impl SampleSource for ScriptedSource {
    fn read_new(&mut self) -> Result<Vec<RawSample>, SourceError> {
        match self.batches.pop_front() {
            Some(batch) => Ok(batch),
            None if self.end_unavailable => Err(SourceError::Unavailable {
                reason: "script exhausted".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::parse_force_line;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_log_follower_reads_appended_lines_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("force.log");
        std::fs::write(&path, "0.1,0,2.5\n0.2,1,2.6\n").unwrap();

        let mut follower = LogFollower::new(&path);
        let first = follower.read_new().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].line, "0.1,0,2.5");

        assert!(follower.read_new().unwrap().is_empty());

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "0.3,2,2.7").unwrap();
        let second = follower.read_new().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].line, "0.3,2,2.7");
    }

    #[test]
    fn test_log_follower_holds_incomplete_trailing_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("force.log");
        std::fs::write(&path, "0.1,0,2.").unwrap();

        let mut follower = LogFollower::new(&path);
        assert!(follower.read_new().unwrap().is_empty());

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "5\n0.2,1,3.0\n").unwrap();
        let records = follower.read_new().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(parse_force_line(&records[0].line).unwrap(), 2.5);
    }

    #[test]
    fn test_log_follower_missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let mut follower = LogFollower::new(dir.path().join("absent.log"));
        assert!(matches!(
            follower.read_new(),
            Err(SourceError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_scripted_source_batches_then_idles() {
        let mut source = ScriptedSource::from_forces(&[1.0, 2.0]);
        assert_eq!(source.read_new().unwrap().len(), 1);
        assert_eq!(source.read_new().unwrap().len(), 1);
        assert!(source.read_new().unwrap().is_empty());
        assert!(source.read_new().unwrap().is_empty());
    }

    #[test]
    fn test_scripted_source_unavailable_when_exhausted() {
        let mut source = ScriptedSource::from_forces(&[1.0]).unavailable_when_exhausted();
        assert_eq!(source.read_new().unwrap().len(), 1);
        assert!(matches!(
            source.read_new(),
            Err(SourceError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_from_forces_lines_parse() {
        let mut source = ScriptedSource::from_forces(&[4.25]);
        let batch = source.read_new().unwrap();
        assert_eq!(parse_force_line(&batch[0].line).unwrap(), 4.25);
    }
}
