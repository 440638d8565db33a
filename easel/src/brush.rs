//! Brush input types: actuator flags, per-actuator draw state, clamped
//! brush settings, and the idle hover indicator.

use crate::color::Rgba;
use crate::stroke::Texel;
use crate::surface::PaintSurface;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Actuator flag set, one bit per hand controller. `empty()` means no
    /// actuator is drawing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BrushFlags: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
    }
}

/// A logical pointer actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    Left,
    Right,
}

impl Actuator {
    pub const BOTH: [Actuator; 2] = [Actuator::Left, Actuator::Right];

    /// The flag bit for this actuator.
    pub fn flag(&self) -> BrushFlags {
        match self {
            Actuator::Left => BrushFlags::LEFT,
            Actuator::Right => BrushFlags::RIGHT,
        }
    }
}

/// Per-actuator draw state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActuatorState {
    #[default]
    Idle,
    Drawing,
}

/// Brush parameters with clamped size stepping.
///
/// The selector surface (whatever UI drives it) calls the setters; values
/// are clamped here so the engine never sees a radius outside the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Stroke color.
    pub color: Rgba,
    /// Stamp radius in texels.
    pub size: i32,
    /// Smallest selectable radius.
    pub min_size: i32,
    /// Largest selectable radius.
    pub max_size: i32,
    /// Step applied by increase/decrease.
    pub size_step: i32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: Rgba::RED,
            size: 10,
            min_size: 1,
            max_size: 20,
            size_step: 1,
        }
    }
}

impl BrushSettings {
    /// Clamp `size` into the selectable range and apply it. Returns the
    /// applied value.
    pub fn set_size(&mut self, size: i32) -> i32 {
        self.size = size.clamp(self.min_size, self.max_size);
        self.size
    }

    pub fn increase_size(&mut self) -> i32 {
        self.set_size(self.size + self.size_step)
    }

    pub fn decrease_size(&mut self) -> i32 {
        self.set_size(self.size - self.size_step)
    }
}

/// Transient hover circle shown while no actuator is drawing.
///
/// The indicator writes straight to the live canvas and records every
/// overwritten color so the next frame can restore them exactly. It never
/// touches the result buffer and never lands in the undo history.
#[derive(Debug, Default)]
pub struct HoverIndicator {
    saved: Vec<(Texel, Rgba)>,
}

impl HoverIndicator {
    pub fn new() -> Self {
        Self { saved: Vec::new() }
    }

    /// Whether an overlay is currently on the canvas.
    pub fn is_applied(&self) -> bool {
        !self.saved.is_empty()
    }

    /// Draw a one-texel-thick circle outline of `radius` around `center`,
    /// recording the colors it overwrites. Out-of-bounds parts of the
    /// circle are skipped. Any previous overlay must have been restored
    /// first.
    pub fn apply(
        &mut self,
        canvas: &mut PaintSurface,
        center: Texel,
        radius: i32,
        highlight: Rgba,
    ) {
        debug_assert!(
            self.saved.is_empty(),
            "overlay applied twice without restore"
        );
        let inner = radius - 1;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let rad = dx * dx + dy * dy;
                if rad >= radius * radius || rad < inner * inner {
                    continue;
                }
                let x = center.x + dx;
                let y = center.y + dy;
                if let Ok(color) = canvas.get(x, y) {
                    self.saved.push((Texel::new(x, y), color));
                    canvas.set(x, y, highlight);
                }
            }
        }
    }

    /// Put back every recorded color and forget the overlay.
    pub fn restore(&mut self, canvas: &mut PaintSurface) {
        for (texel, color) in self.saved.drain(..) {
            canvas.set(texel.x, texel.y, color);
        }
    }
}
