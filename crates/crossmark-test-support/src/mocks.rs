//! Mock implementations of core port traits.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use async_trait::async_trait;
use crossmark_adapters::secure_filename;
use crossmark_core::domain::{CrossPosition, ImageInfo, StoredImage};
use crossmark_core::ports::{CaptchaRejection, CaptchaVerifier, DistributionKind, ImageStore};
use image::{DynamicImage, RgbImage};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    /// `save_upload`
    SaveUpload,
    /// `open`
    Open,
    /// `save_marked`
    SaveMarked,
    /// `save_distribution`
    SaveDistribution,
}

/// In-memory implementation of `ImageStore` for testing.
///
/// Behaves like the filesystem store: uploads are kept as raw bytes under
/// their sanitised name and only decoded by `open`, marked images are
/// `mark<name>` and charts `<position>_colors_.png` /
/// `<position>_colors_new_.png`.
pub struct MockImageStore {
    uploads: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    images: Arc<Mutex<HashMap<PathBuf, DynamicImage>>>,
    saved: Arc<Mutex<Vec<String>>>,
    fail_on: Option<StoreOperation>,
}

impl MockImageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(Mutex::new(HashMap::new())),
            images: Arc::new(Mutex::new(HashMap::new())),
            saved: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    /// Creates a store whose `operation` always fails.
    #[must_use]
    pub fn failing_on(operation: StoreOperation) -> Self {
        Self {
            fail_on: Some(operation),
            ..Self::new()
        }
    }

    /// Names of all files saved so far, in order.
    #[must_use]
    pub fn saved_names(&self) -> Vec<String> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a stored image by name, decoding uploads on the fly.
    #[must_use]
    pub fn image(&self, name: &str) -> Option<DynamicImage> {
        self.decode(&Self::path(name)).ok()
    }

    fn decode(&self, path: &Path) -> anyhow::Result<DynamicImage> {
        if let Some(image) = self
            .images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            return Ok(image.clone());
        }
        let uploads = self.uploads.lock().unwrap_or_else(PoisonError::into_inner);
        let data = uploads
            .get(path)
            .with_context(|| format!("not stored: {}", path.display()))?;
        image::load_from_memory(data)
            .with_context(|| format!("Failed to open image: {}", path.display()))
    }

    fn path(name: &str) -> PathBuf {
        PathBuf::from("mem").join(name)
    }

    fn check(&self, operation: StoreOperation) -> anyhow::Result<()> {
        if self.fail_on == Some(operation) {
            anyhow::bail!("injected {operation:?} failure");
        }
        Ok(())
    }

    fn record(&self, name: &str) -> StoredImage {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name.to_string());
        StoredImage {
            path: Self::path(name),
            url: format!("/static/{name}"),
        }
    }

    fn put(&self, name: &str, image: DynamicImage) -> StoredImage {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::path(name), image);
        self.record(name)
    }
}

impl Default for MockImageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageStore for MockImageStore {
    fn save_upload(&self, file_name: &str, data: &[u8]) -> anyhow::Result<StoredImage> {
        self.check(StoreOperation::SaveUpload)?;
        let name = secure_filename(file_name)
            .with_context(|| format!("Unusable file name: {file_name:?}"))?;
        self.uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::path(&name), data.to_vec());
        Ok(self.record(&name))
    }

    fn open(&self, image: &StoredImage) -> anyhow::Result<ImageInfo> {
        self.check(StoreOperation::Open)?;
        let decoded = self.decode(&image.path)?;
        Ok(ImageInfo::new(image.path.to_string_lossy(), decoded))
    }

    fn save_marked(&self, upload: &StoredImage, image: &RgbImage) -> anyhow::Result<StoredImage> {
        self.check(StoreOperation::SaveMarked)?;
        let name = upload
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.put(
            &format!("mark{name}"),
            DynamicImage::ImageRgb8(image.clone()),
        ))
    }

    fn save_distribution(
        &self,
        kind: DistributionKind,
        position: CrossPosition,
        chart: &RgbImage,
    ) -> anyhow::Result<StoredImage> {
        self.check(StoreOperation::SaveDistribution)?;
        let suffix = match kind {
            DistributionKind::Original => "colors_",
            DistributionKind::Processed => "colors_new_",
        };
        Ok(self.put(
            &format!("{position}_{suffix}.png"),
            DynamicImage::ImageRgb8(chart.clone()),
        ))
    }
}

/// Mock implementation of `CaptchaVerifier` for testing.
///
/// Accepts exactly one token and records every call.
pub struct MockCaptchaVerifier {
    accepted: String,
    calls: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockCaptchaVerifier {
    /// Creates a verifier that accepts `token`.
    #[must_use]
    pub fn accepting(token: &str) -> Self {
        Self {
            accepted: token.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Responses passed to `verify` so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Option<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CaptchaVerifier for MockCaptchaVerifier {
    async fn verify(
        &self,
        response: Option<&str>,
        _remote_ip: Option<IpAddr>,
    ) -> Result<(), CaptchaRejection> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(response.map(str::to_string));
        match response {
            None | Some("") => Err(CaptchaRejection::Missing),
            Some(token) if token == self.accepted => Ok(()),
            Some(_) => Err(CaptchaRejection::Invalid),
        }
    }
}
