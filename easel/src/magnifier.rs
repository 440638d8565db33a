//! Magnifier overlay controller.
//!
//! Zoom assistance moves through a discrete ladder of scale factors while
//! the presented scale eases toward the selected rung at a fixed rate, so a
//! level change reads as smooth growth rather than a jump. The controller
//! only produces numbers; rendering the magnified region belongs to the
//! display layer.

use crate::stroke::Texel;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Magnifier tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnifierConfig {
    /// Ascending scale ladder. Index 0 is the resting (closed) rung.
    pub levels: Vec<f64>,
    /// Easing rate in scale units per second.
    pub rate: f64,
}

impl Default for MagnifierConfig {
    fn default() -> Self {
        Self {
            levels: vec![1.0, 2.0, 3.0, 4.0],
            rate: 2.0,
        }
    }
}

/// Who drives level selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MagnifierMode {
    /// The operator steps the ladder by hand.
    Manual,
    /// The assist controller drives `set_level` from stabilized readings.
    Auto,
}

/// Snapshot of the magnifier presentation for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnifierViewport {
    /// Normalized focus center in [0, 1] x [0, 1].
    pub center: (f64, f64),
    /// Current eased scale.
    pub scale: f64,
    /// Whether the overlay should be shown at all.
    pub visible: bool,
}

/// Discrete-ladder zoom controller with rate-limited easing.
#[derive(Debug, Clone)]
pub struct MagnifierController {
    config: MagnifierConfig,
    level: usize,
    scale: f64,
    target: f64,
    rising: bool,
    center: (f64, f64),
    mode: MagnifierMode,
    was_open: bool,
    closed_edge: bool,
}

impl MagnifierController {
    /// Create a controller resting at the bottom rung.
    ///
    /// # Panics
    /// Panics when the ladder is empty or not strictly ascending.
    pub fn new(config: MagnifierConfig) -> Self {
        assert!(!config.levels.is_empty(), "scale ladder must not be empty");
        assert!(
            config.levels.windows(2).all(|pair| pair[0] < pair[1]),
            "scale ladder must be strictly ascending"
        );
        let resting = config.levels[0];
        Self {
            config,
            level: 0,
            scale: resting,
            target: resting,
            rising: false,
            center: (0.5, 0.5),
            mode: MagnifierMode::Manual,
            was_open: false,
            closed_edge: false,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn mode(&self) -> MagnifierMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: MagnifierMode) {
        if self.mode != mode {
            debug!("magnifier mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Step one rung up the ladder, clamped at the top.
    pub fn step_up(&mut self) {
        self.set_level(self.level.saturating_add(1));
    }

    /// Step one rung down the ladder, clamped at the bottom.
    pub fn step_down(&mut self) {
        self.set_level(self.level.saturating_sub(1));
    }

    /// Jump to ladder index `level`, clamped into range. The presented
    /// scale eases toward the new rung over the following ticks.
    pub fn set_level(&mut self, level: usize) {
        let clamped = level.min(self.config.levels.len() - 1);
        if clamped != self.level {
            debug!("magnifier level {} -> {}", self.level, clamped);
        }
        self.level = clamped;
        self.target = self.config.levels[clamped];
        self.rising = self.scale < self.target;
    }

    /// Advance the easing by `dt` seconds. The scale moves toward the
    /// target by at most `rate * dt` and lands on it exactly, never
    /// overshooting in either direction.
    pub fn tick(&mut self, dt: f64) {
        let step = self.config.rate * dt;
        if self.rising {
            self.scale = (self.scale + step).min(self.target);
        } else {
            self.scale = (self.scale - step).max(self.target);
        }

        let visible = self.visible();
        if visible {
            self.was_open = true;
        } else if self.was_open {
            self.was_open = false;
            self.closed_edge = true;
            debug!("magnifier closed");
        }
    }

    /// Point the overlay at a canvas texel, normalized against the canvas
    /// dimensions and clamped into [0, 1].
    pub fn set_focus(&mut self, texel: Texel, dimensions: (u32, u32)) {
        let (width, height) = dimensions;
        self.center = (
            (texel.x as f64 / width as f64).clamp(0.0, 1.0),
            (texel.y as f64 / height as f64).clamp(0.0, 1.0),
        );
    }

    /// The overlay is shown while above the resting rung, including the
    /// closing glide back down to it.
    pub fn visible(&self) -> bool {
        self.level > 0 || self.scale > self.config.levels[0]
    }

    /// True exactly once after the overlay finishes closing (the eased
    /// scale reaches the resting rung with level 0 selected).
    pub fn take_closed(&mut self) -> bool {
        std::mem::take(&mut self.closed_edge)
    }

    pub fn viewport(&self) -> MagnifierViewport {
        MagnifierViewport {
            center: self.center,
            scale: self.scale,
            visible: self.visible(),
        }
    }
}

impl Default for MagnifierController {
    fn default() -> Self {
        Self::new(MagnifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_step_clamps_at_both_ends() {
        let mut magnifier = MagnifierController::default();
        magnifier.step_down();
        assert_eq!(magnifier.level(), 0);

        for _ in 0..10 {
            magnifier.step_up();
        }
        assert_eq!(magnifier.level(), 3);
    }

    #[test]
    fn test_set_level_clamps() {
        let mut magnifier = MagnifierController::default();
        magnifier.set_level(99);
        assert_eq!(magnifier.level(), 3);
        magnifier.set_level(1);
        assert_eq!(magnifier.level(), 1);
    }

    #[test]
    fn test_easing_step_response() {
        // Rate 2.0/s, dt 0.25 moves 0.5 per tick: 1.0 -> 3.0 in four
        // ticks, then holds.
        let mut magnifier = MagnifierController::default();
        magnifier.set_level(2);

        let expected = [1.5, 2.0, 2.5, 3.0, 3.0];
        for value in expected {
            magnifier.tick(0.25);
            assert_relative_eq!(magnifier.scale(), value);
        }
    }

    #[test]
    fn test_easing_never_overshoots() {
        let mut magnifier = MagnifierController::default();
        magnifier.set_level(3);
        for _ in 0..1000 {
            magnifier.tick(0.017);
            assert!(magnifier.scale() <= 4.0);
        }
        assert_relative_eq!(magnifier.scale(), 4.0);

        magnifier.set_level(0);
        for _ in 0..1000 {
            magnifier.tick(0.017);
            assert!(magnifier.scale() >= 1.0);
        }
        assert_relative_eq!(magnifier.scale(), 1.0);
    }

    #[test]
    fn test_retarget_mid_glide_reverses() {
        let mut magnifier = MagnifierController::default();
        magnifier.set_level(3);
        magnifier.tick(0.5); // scale 2.0, still rising
        magnifier.set_level(0);
        magnifier.tick(0.25);
        assert_relative_eq!(magnifier.scale(), 1.5);
        magnifier.tick(10.0);
        assert_relative_eq!(magnifier.scale(), 1.0);
    }

    #[test]
    fn test_closed_edge_fires_once() {
        let mut magnifier = MagnifierController::default();
        magnifier.set_level(1);
        magnifier.tick(1.0);
        assert!(magnifier.visible());
        assert!(!magnifier.take_closed());

        magnifier.set_level(0);
        magnifier.tick(0.25);
        assert!(magnifier.visible(), "still gliding down");
        magnifier.tick(10.0);
        assert!(!magnifier.visible());
        assert!(magnifier.take_closed());
        assert!(!magnifier.take_closed());

        magnifier.tick(1.0);
        assert!(!magnifier.take_closed());
    }

    #[test]
    fn test_focus_normalizes_and_clamps() {
        let mut magnifier = MagnifierController::default();
        magnifier.set_focus(Texel::new(540, 270), (1080, 1080));
        let viewport = magnifier.viewport();
        assert_relative_eq!(viewport.center.0, 0.5);
        assert_relative_eq!(viewport.center.1, 0.25);

        magnifier.set_focus(Texel::new(-5, 2000), (1080, 1080));
        let viewport = magnifier.viewport();
        assert_relative_eq!(viewport.center.0, 0.0);
        assert_relative_eq!(viewport.center.1, 1.0);
    }

    #[test]
    fn test_resting_controller_not_visible() {
        let magnifier = MagnifierController::default();
        assert!(!magnifier.visible());
        assert_eq!(magnifier.viewport().scale, 1.0);
    }
}
