//! Image processing routines.
//!
//! `mark` places the cross, `distribution` renders channel histograms.

pub mod distribution;
pub mod histogram;
pub mod mark;

pub use distribution::{color_distribution, ChartStyle};
pub use histogram::{ChannelHistograms, Histogram};
pub use mark::{mark, CrossStyle, Mark};
