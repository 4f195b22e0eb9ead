//! Result of processing a submission.

use std::path::PathBuf;

use serde::Serialize;

/// A file written to the static directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    /// Location on disk.
    pub path: PathBuf,
    /// Path under which the web server exposes the file.
    pub url: String,
}

/// Where the cross was placed and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkSummary {
    /// Cross center in pixel coordinates.
    pub center: (u32, u32),
    /// Per-channel thresholds in RGB order.
    pub thresholds: [u8; 3],
    /// Number of pixels at or above all three thresholds.
    pub matched: u64,
}

/// Everything the result page shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// The saved upload.
    pub upload: Option<StoredImage>,
    /// The marked image; absent when no pixel qualified.
    pub marked: Option<StoredImage>,
    /// Color distribution of the upload.
    pub original_colors: Option<StoredImage>,
    /// Color distribution of the marked image.
    pub processed_colors: Option<StoredImage>,
    /// Marking details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<MarkSummary>,
}

impl Outcome {
    /// Whether a cross was drawn.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.marked.is_some()
    }
}
