//! Image storage port for uploads and derived images.

use image::RgbImage;

use crate::domain::{CrossPosition, ImageInfo, StoredImage};

/// Which image a color distribution chart describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionKind {
    /// The image as uploaded.
    Original,
    /// The image after marking.
    Processed,
}

/// Port for persisting uploads and the images derived from them.
///
/// Implementations decide where files live and how they are named.
pub trait ImageStore: Send + Sync {
    /// Stores an uploaded file under a sanitised version of `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be sanitised or writing fails.
    fn save_upload(&self, file_name: &str, data: &[u8]) -> anyhow::Result<StoredImage>;

    /// Loads and decodes a stored image.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    fn open(&self, image: &StoredImage) -> anyhow::Result<ImageInfo>;

    /// Stores the marked version of `upload`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    fn save_marked(&self, upload: &StoredImage, image: &RgbImage) -> anyhow::Result<StoredImage>;

    /// Stores a color distribution chart.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    fn save_distribution(
        &self,
        kind: DistributionKind,
        position: CrossPosition,
        chart: &RgbImage,
    ) -> anyhow::Result<StoredImage>;
}
