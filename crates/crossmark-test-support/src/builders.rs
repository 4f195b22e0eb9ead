//! Synthetic image builders for testing.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Builder for creating synthetic test images.
///
/// Provides images with known channel distributions so that cross
/// placement can be predicted.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Uniform Images ===

    /// Creates an image filled with a single color.
    #[must_use]
    pub fn uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([r, g, b])))
    }

    /// Creates a mid-gray image. Every pixel qualifies at any percentile.
    #[must_use]
    pub fn gray(width: u32, height: u32) -> DynamicImage {
        Self::uniform(width, height, 128, 128, 128)
    }

    // === Structured Images ===

    /// Creates a black image with a white rectangle.
    ///
    /// At 100% on every channel only the rectangle qualifies, so the cross
    /// lands on its center.
    #[must_use]
    pub fn bright_spot(width: u32, height: u32, x: u32, y: u32, w: u32, h: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |px, py| {
            if px >= x && px < x + w && py >= y && py < y + h {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Creates four quadrants: red, green, blue and white.
    #[must_use]
    pub fn quadrants(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            match (x < width / 2, y < height / 2) {
                (true, true) => Rgb([255, 0, 0]),
                (false, true) => Rgb([0, 255, 0]),
                (true, false) => Rgb([0, 0, 255]),
                (false, false) => Rgb([255, 255, 255]),
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    /// Creates an image split into pure red and pure blue halves.
    ///
    /// No pixel is at the top of both channels, so 100% thresholds select
    /// nothing.
    #[must_use]
    pub fn red_blue_split(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    // === Encoding ===

    /// Encodes an image as PNG bytes.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails, which only happens for unsupported color types.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn encode_png(image: &DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .expect("PNG encoding");
        out.into_inner()
    }

    /// Encodes an image as JPEG bytes.
    ///
    /// # Panics
    ///
    /// Panics if encoding fails.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn encode_jpeg(image: &DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_to(&mut out, ImageFormat::Jpeg)
            .expect("JPEG encoding");
        out.into_inner()
    }
}
