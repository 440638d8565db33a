//! Snapshot export.
//!
//! `save_png` writes one surface synchronously. `SnapshotWriter` moves
//! encoding and IO onto worker threads behind a bounded queue so phase
//! boundaries can export both buffers without stalling the frame tick.
//!
//! Saves never overwrite: an existing target makes the save a skipped
//! no-op.

use crate::surface::PaintSurface;
use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, Sender, TrySendError};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),
    #[error("snapshot queue full, dropped {path}")]
    QueueFull { path: PathBuf },
    #[error("snapshot workers stopped, dropped {path}")]
    WorkersStopped { path: PathBuf },
}

/// Write `surface` to `path` as PNG, creating parent directories.
///
/// # Returns
/// `Ok(true)` when the file was written, `Ok(false)` when the target
/// already existed and the save was skipped.
pub fn save_png(surface: &PaintSurface, path: &Path) -> Result<bool, ExportError> {
    if path.exists() {
        warn!("snapshot target {} already exists, skipping", path.display());
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    surface.to_image().save(path)?;
    info!("saved snapshot to {}", path.display());
    Ok(true)
}

/// Default snapshot file name: `<stem>_<YYYYMMDD_HHMMSS>.png`.
pub fn timestamped_name(stem: &str, now: DateTime<Local>) -> String {
    format!("{stem}_{}.png", now.format("%Y%m%d_%H%M%S"))
}

struct SnapshotJob {
    surface: PaintSurface,
    path: PathBuf,
}

/// Background PNG writer with a bounded queue and a worker pool.
pub struct SnapshotWriter {
    sender: Sender<SnapshotJob>,
    workers: Vec<JoinHandle<()>>,
}

impl SnapshotWriter {
    /// Spawn `num_workers` threads sharing a queue of `queue_depth` jobs.
    pub fn new(num_workers: usize, queue_depth: usize) -> Self {
        let (sender, receiver) = bounded::<SnapshotJob>(queue_depth);

        let workers = (0..num_workers)
            .map(|worker| {
                let receiver = receiver.clone();
                thread::spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        if let Err(e) = save_png(&job.surface, &job.path) {
                            error!(
                                "snapshot worker {worker}: failed to save {}: {e}",
                                job.path.display()
                            );
                        }
                    }
                })
            })
            .collect();

        Self { sender, workers }
    }

    /// Queue a snapshot for export. Never blocks; a full queue fails the
    /// call instead.
    pub fn enqueue(&self, surface: PaintSurface, path: PathBuf) -> Result<(), ExportError> {
        match self.sender.try_send(SnapshotJob { surface, path }) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => Err(ExportError::QueueFull { path: job.path }),
            Err(TrySendError::Disconnected(job)) => {
                Err(ExportError::WorkersStopped { path: job.path })
            }
        }
    }

    /// Close the queue and wait for in-flight saves to finish.
    pub fn wait_for_completion(self) {
        drop(self.sender);
        for worker in self.workers {
            if worker.join().is_err() {
                error!("snapshot worker panicked");
            }
        }
    }
}
