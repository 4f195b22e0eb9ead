//! Cross marking.
//!
//! Thresholds every channel at its requested percentile, takes the centroid
//! of the pixels that reach all three thresholds and draws a Latin cross
//! there.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use super::histogram::ChannelHistograms;
use crate::domain::{CrossPosition, MarkSummary};

/// Appearance of the cross.
#[derive(Debug, Clone)]
pub struct CrossStyle {
    /// Fill color.
    pub color: Rgb<u8>,
    /// Bar thickness in pixels. Derived from the image size when `None`.
    pub thickness: Option<u32>,
    /// Length of the short arms in pixels. Derived from the image size when `None`.
    pub arm: Option<u32>,
}

impl Default for CrossStyle {
    fn default() -> Self {
        Self {
            color: Rgb([255, 0, 0]),
            thickness: None,
            arm: None,
        }
    }
}

impl CrossStyle {
    /// Upper bound for a configured thickness or arm length.
    pub const MAX_EXTENT: u32 = 10_000;

    fn thickness_for(&self, width: u32, height: u32) -> u32 {
        self.thickness
            .unwrap_or_else(|| width.min(height) / 100)
            .max(1)
    }

    fn arm_for(&self, width: u32, height: u32) -> u32 {
        self.arm.unwrap_or_else(|| (width.min(height) / 10).max(3))
    }
}

/// A marked image.
#[derive(Debug, Clone)]
pub struct Mark {
    /// The image with the cross drawn on it.
    pub image: RgbImage,
    /// Where the cross went.
    pub summary: MarkSummary,
}

/// Finds the centroid of the pixels at or above all three thresholds.
///
/// Returns the rounded centroid and the number of qualifying pixels, or
/// `None` when no pixel qualifies.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn locate(image: &RgbImage, thresholds: [u8; 3]) -> Option<((u32, u32), u64)> {
    let [tr, tg, tb] = thresholds;
    let mut sum_x = 0u64;
    let mut sum_y = 0u64;
    let mut matched = 0u64;

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        if r >= tr && g >= tg && b >= tb {
            sum_x += u64::from(x);
            sum_y += u64::from(y);
            matched += 1;
        }
    }

    if matched == 0 {
        return None;
    }

    let cx = (sum_x as f64 / matched as f64).round() as u32;
    let cy = (sum_y as f64 / matched as f64).round() as u32;
    Some(((cx, cy), matched))
}

/// Draws a Latin cross centered at `center`.
///
/// The long beam extends twice the arm length past the crossing on one side
/// (down for [`CrossPosition::Vertical`], left for
/// [`CrossPosition::Horizontal`]). Bars are clipped to the image.
pub fn draw_cross(
    image: &mut RgbImage,
    center: (u32, u32),
    position: CrossPosition,
    style: &CrossStyle,
) {
    let (width, height) = image.dimensions();
    let thickness = i64::from(style.thickness_for(width, height));
    let arm = i64::from(style.arm_for(width, height));
    let half = thickness / 2;
    let (cx, cy) = (i64::from(center.0), i64::from(center.1));

    let (beam, bar) = match position {
        CrossPosition::Vertical => (
            [cx - half, cy - arm, thickness, 3 * arm + 1],
            [cx - arm, cy - half, 2 * arm + 1, thickness],
        ),
        CrossPosition::Horizontal => (
            [cx - 2 * arm, cy - half, 3 * arm + 1, thickness],
            [cx - half, cy - arm, thickness, 2 * arm + 1],
        ),
    };

    for [x, y, w, h] in [beam, bar] {
        if let Some(rect) = clip(x, y, w, h, width, height) {
            draw_filled_rect_mut(image, rect, style.color);
        }
    }
}

/// Intersects a rectangle with the image bounds.
fn clip(x: i64, y: i64, w: i64, h: i64, width: u32, height: u32) -> Option<Rect> {
    let (x0, y0) = (x.max(0), y.max(0));
    let x1 = (x + w).min(i64::from(width));
    let y1 = (y + h).min(i64::from(height));
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some(
        Rect::at(i32::try_from(x0).ok()?, i32::try_from(y0).ok()?)
            .of_size(u32::try_from(x1 - x0).ok()?, u32::try_from(y1 - y0).ok()?),
    )
}

/// Marks `image` at the position selected by the channel percentiles.
///
/// `fractions` are the red, green and blue percentiles as 0.0-1.0.
/// Returns `None` when no pixel reaches all three thresholds.
#[must_use]
pub fn mark(
    image: &DynamicImage,
    fractions: [f64; 3],
    position: CrossPosition,
    style: &CrossStyle,
) -> Option<Mark> {
    let mut rgb = image.to_rgb8();
    let thresholds = ChannelHistograms::from_rgb(&rgb).thresholds(fractions);

    let Some((center, matched)) = locate(&rgb, thresholds) else {
        debug!("No pixel reaches thresholds {thresholds:?}");
        return None;
    };

    debug!(
        "Cross at {center:?} ({matched} pixels over thresholds {thresholds:?}, {position})"
    );
    draw_cross(&mut rgb, center, position, style);

    Some(Mark {
        image: rgb,
        summary: MarkSummary {
            center,
            thresholds,
            matched,
        },
    })
}
