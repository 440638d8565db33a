//! Background ingestion of a sample source into a bounded queue.
//!
//! One thread owns the source and appends everything it reads to a shared
//! buffer; the foreground drains the buffer with a non-blocking `poll`
//! each tick. The buffer is capped so a stalled foreground cannot grow it
//! without bound; the oldest records drop first.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::sample::RawSample;
use crate::source::{SampleSource, SourceError};

/// Error type for collection operations.
#[derive(Debug, Clone)]
pub enum CollectError {
    /// The source reported the stream gone and the buffer is drained.
    Disconnected { got: usize, error: Option<String> },
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Disconnected { got, error } => {
                if let Some(e) = error {
                    write!(f, "Disconnected after {got} records: {e}")
                } else {
                    write!(f, "Disconnected after {got} records")
                }
            }
        }
    }
}

impl std::error::Error for CollectError {}

/// Collector tuning.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Sleep between source reads.
    pub poll_interval: Duration,
    /// Most records held before the oldest drop.
    pub buffer_cap: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
            buffer_cap: 4096,
        }
    }
}

/// Shared state between the collector handle and the reader thread.
struct SharedState {
    buffer: VecDeque<RawSample>,
    connected: bool,
    error: Option<String>,
}

impl SharedState {
    fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(1024),
            connected: true,
            error: None,
        }
    }
}

/// Collects force samples from a [`SampleSource`] on a background thread.
///
/// The thread reads until the source reports `Unavailable` or the handle
/// shuts it down. Consumers poll non-blocking; a disconnect surfaces only
/// after every buffered record has been drained, so nothing read is lost.
pub struct ForceCollector {
    state: Arc<Mutex<SharedState>>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl ForceCollector {
    /// Start collecting from `source`.
    pub fn spawn<S: SampleSource + 'static>(mut source: S, config: CollectorConfig) -> Self {
        let state = Arc::new(Mutex::new(SharedState::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_state = Arc::clone(&state);
        let thread_shutdown = Arc::clone(&shutdown);
        let join_handle = thread::spawn(move || {
            info!("force collector started");
            while !thread_shutdown.load(Ordering::Relaxed) {
                match source.read_new() {
                    Ok(records) => {
                        if !records.is_empty() {
                            let mut s = thread_state.lock().unwrap();
                            s.buffer.extend(records);
                            while s.buffer.len() > config.buffer_cap {
                                s.buffer.pop_front();
                            }
                        }
                    }
                    Err(SourceError::Unavailable { reason }) => {
                        warn!("sample stream unavailable: {reason}");
                        let mut s = thread_state.lock().unwrap();
                        s.connected = false;
                        s.error = Some(reason);
                        break;
                    }
                }
                thread::sleep(config.poll_interval);
            }
            debug!("force collector stopped");
        });

        Self {
            state,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Poll for all currently buffered records (non-blocking).
    ///
    /// Returns immediately with the pending records, or an empty Vec if
    /// none. Once the stream is gone and the buffer is empty, returns
    /// `Disconnected`.
    pub fn poll(&self) -> Result<Vec<RawSample>, CollectError> {
        let mut state = self.state.lock().unwrap();
        let records: Vec<_> = state.buffer.drain(..).collect();

        if !state.connected && records.is_empty() {
            return Err(CollectError::Disconnected {
                got: 0,
                error: state.error.clone(),
            });
        }

        Ok(records)
    }

    /// Number of records buffered but not yet drained.
    pub fn buffered(&self) -> usize {
        self.state.lock().unwrap().buffer.len()
    }

    /// Clear all buffered records.
    ///
    /// Use this when detection state resets, so readings from before the
    /// reset are not reprocessed as fresh.
    pub fn clear(&self) {
        self.state.lock().unwrap().buffer.clear();
    }

    /// Check if the source is still delivering.
    pub fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    /// Get the last stream error, if any.
    pub fn last_error(&self) -> Option<String> {
        self.state.lock().unwrap().error.clone()
    }

    /// Stop the reader thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                warn!("force collector thread panicked");
            }
        }
    }
}

impl Drop for ForceCollector {
    fn drop(&mut self) {
        // Unjoined drop still stops the thread, just without waiting.
        self.shutdown.store(true, Ordering::Relaxed);
    }
}
