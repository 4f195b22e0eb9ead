//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod captcha;
mod image_store;

pub use captcha::{CaptchaRejection, CaptchaVerifier};
pub use image_store::{DistributionKind, ImageStore};
