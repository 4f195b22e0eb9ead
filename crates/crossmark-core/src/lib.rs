//! Crossmark Core - Domain logic for the cross marking form.
//!
//! This crate contains the form parameter types, the cross marking and color
//! distribution routines, the ports implemented by adapters, and the
//! submission service that ties them together.

pub mod domain;
pub mod ports;
pub mod processing;
pub mod service;

pub use domain::{
    ChannelPercents, CrossPosition, DisplayOptions, ImageInfo, MarkSummary, Outcome, ParamError,
    Percent, StoredImage, Submission,
};
pub use ports::{CaptchaRejection, CaptchaVerifier, DistributionKind, ImageStore};
pub use processing::{ChartStyle, CrossStyle};
pub use service::{process, ProcessFailure, ProcessOptions};
