//! Bounded undo history over the canvas/result buffer pair.

use crate::surface::PaintSurface;
use std::collections::VecDeque;
use tracing::debug;

/// Fixed-capacity buffer with FIFO eviction and LIFO removal.
///
/// Pushing at capacity silently evicts the oldest element; popping removes
/// the newest. This gives a bounded undo stack whose floor slides forward
/// as new checkpoints arrive.
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create a buffer holding at most `capacity` elements.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than zero");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an element, evicting the oldest when full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    /// Remove and return the newest element.
    pub fn pop_back(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Oldest element still held.
    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Newest element.
    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

/// Paired undo checkpoints of the live canvas and the result buffer.
///
/// Both stacks move in lockstep: a push snapshots both buffers, an undo
/// restores both. When the history is full the oldest pair is dropped, so
/// undo depth is bounded and the earliest states become unreachable.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    canvas_snaps: RingBuffer<PaintSurface>,
    result_snaps: RingBuffer<PaintSurface>,
}

impl SnapshotHistory {
    /// Default number of checkpoints held before eviction starts.
    pub const DEFAULT_DEPTH: usize = 5;

    pub fn new(depth: usize) -> Self {
        Self {
            canvas_snaps: RingBuffer::new(depth),
            result_snaps: RingBuffer::new(depth),
        }
    }

    /// Snapshot both buffers as one undo checkpoint.
    pub fn push(&mut self, canvas: &PaintSurface, result: &PaintSurface) {
        self.canvas_snaps.push(canvas.clone());
        self.result_snaps.push(result.clone());
        debug_assert_eq!(self.canvas_snaps.len(), self.result_snaps.len());
    }

    /// Restore the most recent checkpoint into both buffers.
    ///
    /// Returns `false` without touching either buffer when no checkpoint is
    /// stored; undoing past the history floor is not an error.
    pub fn undo_into(&mut self, canvas: &mut PaintSurface, result: &mut PaintSurface) -> bool {
        match (self.canvas_snaps.pop_back(), self.result_snaps.pop_back()) {
            (Some(canvas_snap), Some(result_snap)) => {
                canvas.copy_from(&canvas_snap);
                result.copy_from(&result_snap);
                true
            }
            (None, None) => {
                debug!("undo requested with empty history");
                false
            }
            _ => unreachable!("snapshot stacks out of lockstep"),
        }
    }

    /// Drop every checkpoint (round start).
    pub fn reset(&mut self) {
        self.canvas_snaps.clear();
        self.result_snaps.clear();
    }

    /// Number of stored checkpoints.
    pub fn len(&self) -> usize {
        self.canvas_snaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvas_snaps.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.canvas_snaps.capacity()
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH)
    }
}
