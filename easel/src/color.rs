//! RGBA color type shared by the pixel surfaces and brush settings.

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color, stored in channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque white, the default canvas base color.
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    /// Opaque red, the default brush color.
    pub const RED: Rgba = Rgba::rgb(255, 0, 0);
    /// Light gray used by the hover indicator.
    pub const HOVER_GRAY: Rgba = Rgba::rgb(180, 180, 180);

    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from all four channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel array in RGBA order.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(channels: [u8; 4]) -> Self {
        Self::rgba(channels[0], channels[1], channels[2], channels[3])
    }
}

impl From<Rgba> for image::Rgba<u8> {
    fn from(color: Rgba) -> Self {
        image::Rgba(color.to_array())
    }
}

impl From<image::Rgba<u8>> for Rgba {
    fn from(pixel: image::Rgba<u8>) -> Self {
        Self::from(pixel.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_is_opaque() {
        let c = Rgba::rgb(10, 20, 30);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_array_round_trip() {
        let c = Rgba::rgba(1, 2, 3, 4);
        assert_eq!(Rgba::from(c.to_array()), c);
    }

    #[test]
    fn test_image_pixel_conversion() {
        let pixel: image::Rgba<u8> = Rgba::RED.into();
        assert_eq!(pixel.0, [255, 0, 0, 255]);
        assert_eq!(Rgba::from(pixel), Rgba::RED);
    }
}
