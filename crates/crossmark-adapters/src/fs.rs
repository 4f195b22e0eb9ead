//! Filesystem adapter for uploads and derived images.
//!
//! Everything lands flat in one static directory:
//! - uploads under their sanitised name
//! - marked images as `mark<name>`
//! - charts as `<position>_colors_.png` and `<position>_colors_new_.png`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossmark_core::{CrossPosition, DistributionKind, ImageInfo, ImageStore, StoredImage};
use image::{ImageFormat, RgbImage};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Extensions accepted for uploads.
pub const UPLOAD_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg"];

/// URL prefix under which the static directory is served.
pub const STATIC_URL_PREFIX: &str = "/static";

#[allow(clippy::expect_used)]
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid pattern"));

const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "AUX", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9", "LPT1",
    "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9", "PRN", "NUL",
];

/// Reduces a client supplied file name to a safe, flat name.
///
/// Characters are NFKD decomposed and whatever is not ASCII afterwards
/// is dropped, so accented letters keep their base letter. Path separators and whitespace become
/// `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or trailing
/// dots and underscores are stripped. Windows device names get a `_` prefix.
/// Returns `None` when nothing usable remains.
#[must_use]
pub fn secure_filename(name: &str) -> Option<String> {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        return None;
    }

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES.contains(&stem.to_ascii_uppercase().as_str()) {
        return Some(format!("_{trimmed}"));
    }
    Some(trimmed.to_string())
}

/// Checks the upload extension against [`UPLOAD_EXTENSIONS`], ignoring case.
#[must_use]
pub fn is_allowed_upload(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| UPLOAD_EXTENSIONS.contains(&e.as_str()))
}

/// Name of the marked version of `upload_name`.
#[must_use]
pub fn marked_name(upload_name: &str) -> String {
    format!("mark{upload_name}")
}

/// Name of a color distribution chart.
#[must_use]
pub fn distribution_name(kind: DistributionKind, position: CrossPosition) -> String {
    match kind {
        DistributionKind::Original => format!("{position}_colors_.png"),
        DistributionKind::Processed => format!("{position}_colors_new_.png"),
    }
}

/// Static directory image store.
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create static directory: {}", root.display()))?;
        Ok(Self { root })
    }

    /// The static directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn stored(&self, name: &str) -> StoredImage {
        StoredImage {
            path: self.root.join(name),
            url: format!("{STATIC_URL_PREFIX}/{name}"),
        }
    }

    fn write_image(&self, name: &str, image: &RgbImage) -> Result<StoredImage> {
        let stored = self.stored(name);
        let format = ImageFormat::from_path(&stored.path)
            .with_context(|| format!("Unsupported output format: {name}"))?;
        image
            .save_with_format(&stored.path, format)
            .with_context(|| format!("Failed to write image: {}", stored.path.display()))?;
        debug!("Wrote {}", stored.path.display());
        Ok(stored)
    }
}

impl ImageStore for FsImageStore {
    fn save_upload(&self, file_name: &str, data: &[u8]) -> Result<StoredImage> {
        let name = secure_filename(file_name)
            .with_context(|| format!("Unusable file name: {file_name:?}"))?;
        let stored = self.stored(&name);
        fs::write(&stored.path, data)
            .with_context(|| format!("Failed to write upload: {}", stored.path.display()))?;
        Ok(stored)
    }

    fn open(&self, image: &StoredImage) -> Result<ImageInfo> {
        let decoded = image::open(&image.path)
            .with_context(|| format!("Failed to open image: {}", image.path.display()))?;
        Ok(ImageInfo::new(image.path.to_string_lossy(), decoded))
    }

    fn save_marked(&self, upload: &StoredImage, image: &RgbImage) -> Result<StoredImage> {
        let upload_name = upload
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Upload has no file name: {}", upload.path.display()))?;
        self.write_image(&marked_name(upload_name), image)
    }

    fn save_distribution(
        &self,
        kind: DistributionKind,
        position: CrossPosition,
        chart: &RgbImage,
    ) -> Result<StoredImage> {
        self.write_image(&distribution_name(kind, position), chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My cool movie.mov").as_deref(), Some("My_cool_movie.mov"));
        assert_eq!(secure_filename("../../../etc/passwd").as_deref(), Some("etc_passwd"));
        assert_eq!(
            secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt").as_deref(),
            Some("i_contain_cool_umlauts.txt")
        );
        assert_eq!(secure_filename("photo (1).png").as_deref(), Some("photo_1.png"));
        assert_eq!(
            secure_filename("C:\\Users\\me\\cat.JPG").as_deref(),
            Some("C_Users_me_cat.JPG")
        );
        assert_eq!(secure_filename("__.png__").as_deref(), Some("png"));
    }

    #[test]
    fn test_secure_filename_folds_accents() {
        assert_eq!(secure_filename("caf\u{e9}.png").as_deref(), Some("cafe.png"));
        assert_eq!(secure_filename("Se\u{f1}or.JPG").as_deref(), Some("Senor.JPG"));
        // fullwidth forms fold to ASCII under NFKD
        assert_eq!(secure_filename("\u{ff41}.png").as_deref(), Some("a.png"));
    }

    #[test]
    fn test_secure_filename_empty() {
        assert_eq!(secure_filename(""), None);
        assert_eq!(secure_filename("../.."), None);
        assert_eq!(secure_filename("\u{65e5}\u{672c}"), None);
    }

    #[test]
    fn test_secure_filename_device_names() {
        assert_eq!(secure_filename("con.png").as_deref(), Some("_con.png"));
        assert_eq!(secure_filename("NUL").as_deref(), Some("_NUL"));
        assert_eq!(secure_filename("console.png").as_deref(), Some("console.png"));
    }

    #[test]
    fn test_is_allowed_upload() {
        assert!(is_allowed_upload("a.jpg"));
        assert!(is_allowed_upload("a.JPEG"));
        assert!(is_allowed_upload("a.Png"));
        assert!(!is_allowed_upload("a.gif"));
        assert!(!is_allowed_upload("a.png.exe"));
        assert!(!is_allowed_upload("png"));
    }

    #[test]
    fn test_derived_names() {
        assert_eq!(marked_name("cat.png"), "markcat.png");
        assert_eq!(
            distribution_name(DistributionKind::Original, CrossPosition::Horizontal),
            "horizontal_colors_.png"
        );
        assert_eq!(
            distribution_name(DistributionKind::Processed, CrossPosition::Vertical),
            "vertical_colors_new_.png"
        );
    }
}
