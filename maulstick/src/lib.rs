//! Adaptive painting session harness.
//!
//! Composes the painting core with the grip pipeline: scripted contact
//! probes, parametric grip-force profiles, the calibration/practice/assist
//! phase flow, and a runner that drives scripted frames for the binaries
//! and integration tests.

pub mod grip_profiles;
pub mod phase;
pub mod probe;
pub mod runner;
pub mod session;
