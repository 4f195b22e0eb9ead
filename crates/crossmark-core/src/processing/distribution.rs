//! Color distribution charts.
//!
//! Renders the red, green and blue histograms of an image as three
//! polylines on a white canvas.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use super::histogram::ChannelHistograms;

const BACKGROUND_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

const GRID_COLOR: Rgb<u8> = Rgb([225, 225, 225]);

const AXIS_COLOR: Rgb<u8> = Rgb([90, 90, 90]);

/// Line colors in RGB channel order.
pub const CHANNEL_COLORS: [Rgb<u8>; 3] = [
    Rgb([220, 40, 40]),
    Rgb([40, 160, 40]),
    Rgb([40, 80, 220]),
];

const MARGIN: u32 = 16;

const GRID_LINES: u32 = 4;

/// Chart size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ChartStyle {
    /// Smallest width that still leaves a plot area.
    pub const MIN_WIDTH: u32 = 64;
    /// Smallest height that still leaves a plot area.
    pub const MIN_HEIGHT: u32 = 48;
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 768,
            height: 384,
        }
    }
}

/// Renders the color distribution of an image.
#[must_use]
pub fn color_distribution(image: &DynamicImage, style: &ChartStyle) -> RgbImage {
    let histograms = ChannelHistograms::from_rgb(&image.to_rgb8());
    render_histograms(&histograms, style)
}

/// Renders precomputed channel histograms.
///
/// Counts are scaled to the largest bin over all channels. The chart is never
/// smaller than [`ChartStyle::MIN_WIDTH`] x [`ChartStyle::MIN_HEIGHT`].
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
#[must_use]
pub fn render_histograms(histograms: &ChannelHistograms, style: &ChartStyle) -> RgbImage {
    let width = style.width.max(ChartStyle::MIN_WIDTH);
    let height = style.height.max(ChartStyle::MIN_HEIGHT);
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND_COLOR);

    let left = MARGIN as f32;
    let top = MARGIN as f32;
    let plot_w = (width - 2 * MARGIN) as f32;
    let plot_h = (height - 2 * MARGIN) as f32;
    let bottom = top + plot_h;

    for i in 0..=GRID_LINES {
        let y = top + plot_h * i as f32 / GRID_LINES as f32;
        draw_line_segment_mut(&mut canvas, (left, y), (left + plot_w, y), GRID_COLOR);
    }

    let max = histograms.max_count().max(1) as f32;
    for (histogram, color) in histograms.channels().iter().zip(CHANNEL_COLORS) {
        let points: Vec<(f32, f32)> = histogram
            .bins()
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let x = left + plot_w * i as f32 / 255.0;
                let y = bottom - plot_h * count as f32 / max;
                (x, y)
            })
            .collect();
        for segment in points.windows(2) {
            draw_line_segment_mut(&mut canvas, segment[0], segment[1], color);
        }
    }

    // axes on top so the baseline stays visible under flat channels
    draw_filled_rect_mut(
        &mut canvas,
        Rect::at(MARGIN as i32, (bottom as i32) + 1).of_size(width - 2 * MARGIN, 1),
        AXIS_COLOR,
    );
    draw_filled_rect_mut(
        &mut canvas,
        Rect::at((MARGIN as i32) - 1, MARGIN as i32).of_size(1, height - 2 * MARGIN + 2),
        AXIS_COLOR,
    );

    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([r, g, b])))
    }

    #[test]
    fn test_default_size() {
        let chart = color_distribution(&uniform(10, 20, 30), &ChartStyle::default());
        assert_eq!(chart.dimensions(), (768, 384));
    }

    #[test]
    fn test_minimum_size_enforced() {
        let style = ChartStyle {
            width: 1,
            height: 1,
        };
        let chart = color_distribution(&uniform(10, 20, 30), &style);
        assert_eq!(chart.dimensions(), (ChartStyle::MIN_WIDTH, ChartStyle::MIN_HEIGHT));
    }

    #[test]
    fn test_every_channel_drawn() {
        // Peaks far apart so no channel is painted over by another.
        let chart = color_distribution(&uniform(200, 100, 30), &ChartStyle::default());
        for color in CHANNEL_COLORS {
            assert!(
                chart.pixels().any(|p| *p == color),
                "channel color {color:?} missing"
            );
        }
    }

    #[test]
    fn test_background_and_axes() {
        let chart = color_distribution(&uniform(0, 0, 0), &ChartStyle::default());
        assert_eq!(*chart.get_pixel(0, 0), BACKGROUND_COLOR);
        assert!(chart.pixels().any(|p| *p == AXIS_COLOR));
    }

    #[test]
    fn test_empty_histograms_render() {
        let empty = RgbImage::new(0, 0);
        let histograms = ChannelHistograms::from_rgb(&empty);
        let chart = render_histograms(&histograms, &ChartStyle::default());
        assert_eq!(chart.dimensions(), (768, 384));
    }
}
