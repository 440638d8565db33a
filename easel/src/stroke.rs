//! Stroke rasterization.
//!
//! Contact points arrive one per frame; this module turns them into
//! continuous painted strokes by stamping filled discs along the segment
//! between consecutive contacts. Writes accumulate in a pending set and are
//! applied to the target buffers atomically at commit time.

use crate::color::Rgba;
use crate::surface::PaintSurface;
use std::collections::HashMap;

/// Integer pixel coordinate. May sit outside a surface before clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Texel {
    pub x: i32,
    pub y: i32,
}

impl Texel {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another texel.
    pub fn distance(&self, other: &Texel) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Map a normalized hit coordinate in [0, 1]^2 to a texel.
///
/// Truncates toward zero, so u = 1.0 maps one past the right edge and gets
/// clipped downstream rather than clamped onto the edge.
pub fn texel_from_uv(u: f64, v: f64, width: u32, height: u32) -> Texel {
    Texel::new((u * width as f64) as i32, (v * height as f64) as i32)
}

/// Pending write set for one frame.
///
/// Duplicate writes to the same texel collapse with last-write-wins, so a
/// stroke crossing itself costs one buffer write per covered texel.
#[derive(Debug, Default)]
pub struct StampBuffer {
    pending: HashMap<Texel, Rgba>,
}

impl StampBuffer {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Whether a write is pending for `texel`.
    pub fn contains(&self, texel: &Texel) -> bool {
        self.pending.contains_key(texel)
    }

    /// Queue a filled disc of `radius` around `center`.
    ///
    /// A texel is covered when its center distance to `center` is strictly
    /// less than `radius`; the boundary ring is excluded. Texels outside
    /// `width` x `height` are skipped, not clamped, so a stamp near an edge
    /// paints only its in-bounds part.
    pub fn stamp_disc(&mut self, center: Texel, radius: i32, color: Rgba, width: u32, height: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy >= radius * radius {
                    continue;
                }
                let x = center.x + dx;
                let y = center.y + dy;
                if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                    continue;
                }
                self.pending.insert(Texel::new(x, y), color);
            }
        }
    }

    /// Queue a stroke segment ending at `current`.
    ///
    /// With no previous contact a single disc lands at `current`. Otherwise
    /// the segment is subdivided into `ceil(distance)` steps and a disc is
    /// stamped at the rounded interpolation of each step, so consecutive
    /// stamp centers are never more than one texel apart on either axis and
    /// the stroke has no gaps regardless of pointer speed.
    pub fn stroke_to(
        &mut self,
        prev: Option<Texel>,
        current: Texel,
        radius: i32,
        color: Rgba,
        width: u32,
        height: u32,
    ) {
        let start = match prev {
            Some(texel) => texel,
            None => {
                self.stamp_disc(current, radius, color, width, height);
                return;
            }
        };

        let steps = start.distance(&current).ceil() as i32;
        if steps == 0 {
            self.stamp_disc(current, radius, color, width, height);
            return;
        }

        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (start.x as f64 + (current.x - start.x) as f64 * t).round() as i32;
            let y = (start.y as f64 + (current.y - start.y) as f64 * t).round() as i32;
            self.stamp_disc(Texel::new(x, y), radius, color, width, height);
        }
    }

    /// Apply every pending write to `surface`.
    ///
    /// The set is not cleared here so the same writes can land on several
    /// buffers; the caller clears once all targets are updated.
    pub fn apply_to(&self, surface: &mut PaintSurface) {
        for (texel, color) in &self.pending {
            surface.set(texel.x, texel.y, *color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_from_uv_truncates() {
        assert_eq!(texel_from_uv(0.5, 0.5, 1080, 1080), Texel::new(540, 540));
        assert_eq!(texel_from_uv(0.0, 0.0, 1080, 1080), Texel::new(0, 0));
        assert_eq!(
            texel_from_uv(0.9999, 0.9999, 1080, 1080),
            Texel::new(1079, 1079)
        );
        // u = 1.0 lands one past the edge; downstream clipping drops it.
        assert_eq!(texel_from_uv(1.0, 1.0, 1080, 1080), Texel::new(1080, 1080));
    }

    #[test]
    fn test_stamp_disc_strict_interior() {
        let mut stamps = StampBuffer::new();
        let radius = 3;
        stamps.stamp_disc(Texel::new(50, 50), radius, Rgba::RED, 100, 100);

        for dy in -radius - 1..=radius + 1 {
            for dx in -radius - 1..=radius + 1 {
                let covered = stamps.contains(&Texel::new(50 + dx, 50 + dy));
                let inside = dx * dx + dy * dy < radius * radius;
                assert_eq!(
                    covered, inside,
                    "offset ({dx}, {dy}) covered={covered} inside={inside}"
                );
            }
        }
    }

    #[test]
    fn test_stamp_disc_radius_one_is_single_texel() {
        let mut stamps = StampBuffer::new();
        stamps.stamp_disc(Texel::new(10, 10), 1, Rgba::RED, 100, 100);
        assert_eq!(stamps.len(), 1);
        assert!(stamps.contains(&Texel::new(10, 10)));
    }

    #[test]
    fn test_stamp_disc_clips_at_corner() {
        let mut stamps = StampBuffer::new();
        // A radius-3 disc covers a 5x5 block; at the origin only the
        // in-bounds quadrant survives.
        stamps.stamp_disc(Texel::new(0, 0), 3, Rgba::RED, 100, 100);
        assert_eq!(stamps.len(), 9);
        for texel in [Texel::new(0, 0), Texel::new(2, 2), Texel::new(2, 0)] {
            assert!(stamps.contains(&texel));
        }
        assert!(!stamps.contains(&Texel::new(3, 0)));
    }

    #[test]
    fn test_vertical_stroke_covers_swept_block() {
        let mut stamps = StampBuffer::new();
        stamps.stroke_to(
            Some(Texel::new(10, 10)),
            Texel::new(10, 15),
            3,
            Rgba::RED,
            100,
            100,
        );

        // Radius 3 covers offsets |dx|, |dy| <= 2, so sweeping the center
        // from y=10 to y=15 fills the full 5x10 block.
        for y in 8..=17 {
            for x in 8..=12 {
                assert!(stamps.contains(&Texel::new(x, y)), "missing ({x}, {y})");
            }
        }
        assert_eq!(stamps.len(), 50);
    }

    #[test]
    fn test_stroke_step_count_matches_distance() {
        let mut stamps = StampBuffer::new();
        // With radius 1 every stamp covers exactly its center, so the
        // painted count equals the number of interpolation points.
        stamps.stroke_to(
            Some(Texel::new(0, 0)),
            Texel::new(0, 5),
            1,
            Rgba::RED,
            100,
            100,
        );
        assert_eq!(stamps.len(), 6);
        for y in 0..=5 {
            assert!(stamps.contains(&Texel::new(0, y)));
        }
    }

    #[test]
    fn test_diagonal_stroke_has_no_gaps() {
        let mut stamps = StampBuffer::new();
        stamps.stroke_to(
            Some(Texel::new(0, 0)),
            Texel::new(7, 3),
            1,
            Rgba::RED,
            100,
            100,
        );

        assert!(stamps.contains(&Texel::new(0, 0)));
        assert!(stamps.contains(&Texel::new(7, 3)));
        let texels: Vec<Texel> = (0..100)
            .flat_map(|x| (0..100).map(move |y| Texel::new(x, y)))
            .filter(|t| stamps.contains(t))
            .collect();
        // Every painted texel touches another painted texel.
        for texel in &texels {
            let has_neighbor = texels.iter().any(|other| {
                other != texel && (other.x - texel.x).abs() <= 1 && (other.y - texel.y).abs() <= 1
            });
            assert!(has_neighbor, "isolated texel ({}, {})", texel.x, texel.y);
        }
    }

    #[test]
    fn test_zero_distance_stroke_stamps_once() {
        let mut stamps = StampBuffer::new();
        stamps.stroke_to(
            Some(Texel::new(20, 20)),
            Texel::new(20, 20),
            1,
            Rgba::RED,
            100,
            100,
        );
        assert_eq!(stamps.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut stamps = StampBuffer::new();
        stamps.stamp_disc(Texel::new(10, 10), 2, Rgba::RED, 100, 100);
        stamps.stamp_disc(Texel::new(10, 10), 2, Rgba::BLACK, 100, 100);
        assert_eq!(stamps.len(), 9);

        let mut surface = PaintSurface::new(100, 100, Rgba::WHITE);
        stamps.apply_to(&mut surface);
        assert_eq!(surface.get(10, 10).unwrap(), Rgba::BLACK);
    }

    #[test]
    fn test_apply_to_multiple_buffers_then_clear() {
        let mut stamps = StampBuffer::new();
        stamps.stamp_disc(Texel::new(5, 5), 2, Rgba::RED, 20, 20);

        let mut canvas = PaintSurface::new(20, 20, Rgba::WHITE);
        let mut result = PaintSurface::new(20, 20, Rgba::WHITE);
        stamps.apply_to(&mut canvas);
        stamps.apply_to(&mut result);
        stamps.clear();

        assert_eq!(canvas.get(5, 5).unwrap(), Rgba::RED);
        assert_eq!(result.get(5, 5).unwrap(), Rgba::RED);
        assert!(stamps.is_empty());
    }
}
