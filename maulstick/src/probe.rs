//! Contact probes for replays and tests.

use std::collections::VecDeque;

use easel::brush::Actuator;
use easel::painter::{ContactProbe, SurfaceHit};

/// Build a script entry for a contact at canvas coordinates `(u, v)`.
pub fn uv_hit(u: f64, v: f64) -> Option<SurfaceHit> {
    Some(SurfaceHit {
        u,
        v,
        world: [u, v, 0.0],
    })
}

/// Scripted per-frame hits, one queue per actuator.
///
/// Each queue entry is one frame; an exhausted queue reads as no contact.
pub struct ScriptedProbe {
    left: VecDeque<Option<SurfaceHit>>,
    right: VecDeque<Option<SurfaceHit>>,
}

impl ScriptedProbe {
    pub fn new(left: Vec<Option<SurfaceHit>>, right: Vec<Option<SurfaceHit>>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Script only the left actuator; the right never makes contact.
    pub fn left_only(hits: Vec<Option<SurfaceHit>>) -> Self {
        let blanks = vec![None; hits.len()];
        Self::new(hits, blanks)
    }
}

impl ContactProbe for ScriptedProbe {
    fn hit(&mut self, actuator: Actuator) -> Option<SurfaceHit> {
        match actuator {
            Actuator::Left => self.left.pop_front().flatten(),
            Actuator::Right => self.right.pop_front().flatten(),
        }
    }
}

/// Probe that follows a parametric path with the left actuator.
///
/// The closure maps a frame index to canvas coordinates, or `None` for no
/// contact. The frame counter advances on the left query, so the path
/// sees exactly one index per simulated frame; the right actuator never
/// makes contact.
pub struct PathProbe<F: FnMut(u64) -> Option<(f64, f64)>> {
    path: F,
    frame: u64,
}

impl<F: FnMut(u64) -> Option<(f64, f64)>> PathProbe<F> {
    pub fn new(path: F) -> Self {
        Self { path, frame: 0 }
    }
}

impl<F: FnMut(u64) -> Option<(f64, f64)>> ContactProbe for PathProbe<F> {
    fn hit(&mut self, actuator: Actuator) -> Option<SurfaceHit> {
        match actuator {
            Actuator::Left => {
                let uv = (self.path)(self.frame);
                self.frame += 1;
                uv.map(|(u, v)| SurfaceHit {
                    u,
                    v,
                    world: [u, v, 0.0],
                })
            }
            Actuator::Right => None,
        }
    }
}
