//! Pixel surface storage and publication.
//!
//! Surfaces are stored as `ndarray::Array2<Rgba>` in row-major order, so a
//! pixel at image coordinate (x, y) lives at array index `[y, x]`. X runs
//! left to right and Y runs top to bottom, matching image conventions.

use crate::color::Rgba;
use image::RgbaImage;
use ndarray::Array2;
use thiserror::Error;

/// Errors returned by surface accessors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// Pixel coordinate outside the surface bounds.
    #[error("pixel ({x}, {y}) outside surface bounds {width}x{height}")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

/// Consumer of committed surface contents.
///
/// Stands in for whatever displays the canvas (a texture upload in the
/// interactive frontend). `present` is called exactly once per commit.
pub trait SurfaceSink {
    fn present(&mut self, surface: &PaintSurface);
}

/// Sink that discards committed contents.
#[derive(Debug, Default)]
pub struct NullSink;

impl SurfaceSink for NullSink {
    fn present(&mut self, _surface: &PaintSurface) {}
}

/// Rectangular RGBA pixel buffer addressed by (x, y) from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintSurface {
    pixels: Array2<Rgba>,
}

impl PaintSurface {
    /// Create a surface of `width` x `height` pixels, every pixel `fill`.
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        Self {
            pixels: Array2::from_elem((height as usize, width as usize), fill),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.nrows() as u32
    }

    /// (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Whether (x, y) addresses a pixel on this surface.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    /// Read the pixel at (x, y).
    ///
    /// # Returns
    /// The pixel color, or `SurfaceError::OutOfBounds` when the coordinate
    /// lies outside the surface.
    pub fn get(&self, x: i32, y: i32) -> Result<Rgba, SurfaceError> {
        if !self.contains(x, y) {
            return Err(SurfaceError::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(self.pixels[[y as usize, x as usize]])
    }

    /// Write the pixel at (x, y). Out-of-bounds writes are silently
    /// ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if self.contains(x, y) {
            self.pixels[[y as usize, x as usize]] = color;
        }
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Copy the full contents of `other` into this surface.
    ///
    /// # Panics
    /// Panics when the dimensions differ. The canvas and result buffers are
    /// dimension-locked for the life of a session.
    pub fn copy_from(&mut self, other: &PaintSurface) {
        assert_eq!(
            self.dimensions(),
            other.dimensions(),
            "surface dimension mismatch"
        );
        self.pixels.assign(&other.pixels);
    }

    /// Publish the current contents to `sink`. This is the only externally
    /// visible side effect of the paint pipeline.
    pub fn commit(&self, sink: &mut dyn SurfaceSink) {
        sink.present(self);
    }

    /// Convert to an `RgbaImage` for encoding.
    ///
    /// The array's `[row, col]` indexing maps to the image's (x, y) with
    /// `x = col` and `y = row`.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width(), self.height(), |x, y| {
            self.pixels[[y as usize, x as usize]].into()
        })
    }

    /// Build a surface from an `RgbaImage` (backdrop loading).
    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            (*image.get_pixel(col as u32, row as u32)).into()
        });
        Self { pixels }
    }
}
