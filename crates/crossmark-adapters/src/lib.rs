//! Crossmark Adapters - External adapters for crossmark.
//!
//! This crate provides adapters for:
//! - Static directory image storage
//! - reCAPTCHA verification

pub mod fs;
pub mod recaptcha;

pub use fs::{is_allowed_upload, secure_filename, FsImageStore, STATIC_URL_PREFIX};
pub use recaptcha::{DisabledCaptcha, RecaptchaVerifier, DEFAULT_VERIFY_URL};
