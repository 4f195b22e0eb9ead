//! Test support utilities for crossmark.
//!
//! Provides synthetic image builders and in-memory implementations of the
//! core ports.
//!
//! # Example
//!
//! ```
//! use crossmark_test_support::{MockImageStore, SyntheticImageBuilder};
//!
//! let png = SyntheticImageBuilder::encode_png(&SyntheticImageBuilder::quadrants(64, 64));
//! let store = MockImageStore::new();
//! assert!(store.saved_names().is_empty());
//! assert!(!png.is_empty());
//! ```

mod builders;
mod mocks;

pub use builders::SyntheticImageBuilder;
pub use mocks::{MockCaptchaVerifier, MockImageStore, StoreOperation};
