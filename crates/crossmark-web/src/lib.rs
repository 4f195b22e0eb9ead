//! Crossmark Web - HTTP form and configuration for the `crossmark` binary.
//!
//! The router renders the upload form, validates submissions and hands them
//! to the core submission service on a blocking thread.

pub mod config;
pub mod csrf;
pub mod form;
pub mod web;

pub use config::AppConfig;
pub use web::{router, AppState, CaptchaWidget, Templates};
