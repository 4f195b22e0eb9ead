//! Core domain types for a single form submission.

mod image_info;
mod outcome;
mod params;

pub use image_info::ImageInfo;
pub use outcome::{MarkSummary, Outcome, StoredImage};
pub use params::{ChannelPercents, CrossPosition, DisplayOptions, ParamError, Percent, Submission};
