//! Grip-force stream processing.
//!
//! A background collector tails an append-only sensor log into a bounded
//! queue; the foreground drains the queue each tick, feeds a rolling-window
//! stability detector, and maps stabilized readings through a calibrated
//! logistic curve onto discrete assist levels.
//!
//! Losing the stream is a degradation, not a failure: the collector marks
//! itself disconnected and the consumer carries on without assist.

pub mod assist;
pub mod collector;
pub mod sample;
pub mod source;
pub mod stability;
pub mod window;
