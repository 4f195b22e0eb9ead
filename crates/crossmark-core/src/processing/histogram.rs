//! Per-channel 256-bin histograms.

use image::RgbImage;

/// 256-bin histogram of one 8-bit channel.
#[derive(Debug, Clone)]
pub struct Histogram {
    bins: [u64; 256],
    total: u64,
}

impl Histogram {
    /// Returns the per-value counts.
    #[must_use]
    pub const fn bins(&self) -> &[u64; 256] {
        &self.bins
    }

    /// Largest single bin count.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Calculate percentile value (0.0-1.0 → channel value 0-255).
    ///
    /// Returns the first value at which the cumulative count reaches
    /// `round(total * p)`, so `p = 0.0` always yields 0.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn percentile(&self, p: f64) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let target = (self.total as f64 * p.clamp(0.0, 1.0)).round() as u64;
        let mut cumulative = 0u64;
        for (i, &count) in self.bins.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                // i is a bin index, always 0-255
                return i as u8;
            }
        }
        255
    }
}

/// Histograms of the red, green and blue channels of one image.
#[derive(Debug, Clone)]
pub struct ChannelHistograms {
    /// Red channel.
    pub red: Histogram,
    /// Green channel.
    pub green: Histogram,
    /// Blue channel.
    pub blue: Histogram,
}

impl ChannelHistograms {
    /// Computes all three channel histograms.
    #[must_use]
    pub fn from_rgb(image: &RgbImage) -> Self {
        let mut red = [0u64; 256];
        let mut green = [0u64; 256];
        let mut blue = [0u64; 256];
        for pixel in image.pixels() {
            let [r, g, b] = pixel.0;
            red[usize::from(r)] += 1;
            green[usize::from(g)] += 1;
            blue[usize::from(b)] += 1;
        }
        let total = u64::from(image.width()) * u64::from(image.height());
        Self {
            red: Histogram { bins: red, total },
            green: Histogram { bins: green, total },
            blue: Histogram { bins: blue, total },
        }
    }

    /// Channels in RGB order.
    #[must_use]
    pub const fn channels(&self) -> [&Histogram; 3] {
        [&self.red, &self.green, &self.blue]
    }

    /// Per-channel percentile thresholds in RGB order.
    #[must_use]
    pub fn thresholds(&self, fractions: [f64; 3]) -> [u8; 3] {
        [
            self.red.percentile(fractions[0]),
            self.green.percentile(fractions[1]),
            self.blue.percentile(fractions[2]),
        ]
    }

    /// Largest bin over all channels.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.channels()
            .iter()
            .map(|h| h.max_count())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    fn histogram(samples: impl IntoIterator<Item = u8>) -> Histogram {
        let mut bins = [0u64; 256];
        for value in samples {
            bins[usize::from(value)] += 1;
        }
        Histogram {
            bins,
            total: bins.iter().sum(),
        }
    }

    #[test]
    fn test_histogram_from_ramp() {
        let hist = histogram(0..=255u8);
        assert_eq!(hist.total, 256);
        assert!(hist.bins().iter().all(|&c| c == 1));
        assert_eq!(hist.max_count(), 1);
    }

    #[test]
    fn test_percentile_bounds() {
        let hist = histogram([10u8, 20, 30, 40]);
        assert_eq!(hist.percentile(0.0), 0);
        assert_eq!(hist.percentile(0.25), 10);
        assert_eq!(hist.percentile(0.5), 20);
        assert_eq!(hist.percentile(1.0), 40);
    }

    #[test]
    fn test_percentile_uniform_distribution() {
        let samples = (0..100).flat_map(|_| 0..=255u8);
        let hist = histogram(samples);

        let p50 = hist.percentile(0.5);
        assert!(p50 > 120 && p50 < 136, "p50 should be ~128, got {p50}");
        let p95 = hist.percentile(0.95);
        assert!(p95 > 235, "p95 should be ~243, got {p95}");
    }

    #[test]
    fn test_percentile_empty() {
        let hist = histogram(std::iter::empty());
        assert_eq!(hist.percentile(0.7), 0);
        assert_eq!(hist.max_count(), 0);
    }

    #[test]
    fn test_channel_histograms() {
        let img = RgbImage::from_fn(16, 16, |x, _| image::Rgb([x as u8, 200, 0]));
        let hists = ChannelHistograms::from_rgb(&img);

        assert_eq!(hists.red.total, 256);
        assert_eq!(hists.green.bins()[200], 256);
        assert_eq!(hists.blue.bins()[0], 256);
        assert_eq!(hists.max_count(), 256);
        assert_eq!(hists.thresholds([1.0, 0.5, 0.5]), [15, 200, 0]);
    }
}
