//! Submission processing.
//!
//! Saves the upload, marks it, and renders the requested distribution charts.

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{Outcome, Submission};
use crate::ports::{DistributionKind, ImageStore};
use crate::processing::{color_distribution, mark, ChartStyle, CrossStyle};

/// Rendering settings for one run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Cross appearance.
    pub cross: CrossStyle,
    /// Distribution chart size.
    pub chart: ChartStyle,
}

/// Processing stopped part way through.
///
/// `partial` holds whatever had been stored before the failure.
#[derive(Debug, Error)]
#[error("{source:#}")]
pub struct ProcessFailure {
    /// Artifacts written before the failure.
    pub partial: Outcome,
    /// What went wrong.
    #[source]
    pub source: anyhow::Error,
}

/// Processes a validated submission.
///
/// Charts are only produced when a cross was drawn; a submission whose
/// thresholds select no pixel yields an outcome with the upload alone.
///
/// # Errors
///
/// Returns a [`ProcessFailure`] if storing, decoding or encoding fails.
pub fn process(
    store: &dyn ImageStore,
    submission: &Submission,
    options: &ProcessOptions,
) -> Result<Outcome, ProcessFailure> {
    let mut outcome = Outcome::default();
    match run(store, submission, options, &mut outcome) {
        Ok(()) => Ok(outcome),
        Err(source) => Err(ProcessFailure {
            partial: outcome,
            source,
        }),
    }
}

fn run(
    store: &dyn ImageStore,
    submission: &Submission,
    options: &ProcessOptions,
    outcome: &mut Outcome,
) -> anyhow::Result<()> {
    let upload = store
        .save_upload(&submission.file_name, &submission.data)
        .context("Failed to save upload")?;
    info!("Saved upload {}", upload.path.display());
    outcome.upload = Some(upload.clone());

    let original = store.open(&upload)?;
    let Some(marked) = mark(
        &original.image,
        submission.percents.fractions(),
        submission.position,
        &options.cross,
    ) else {
        info!("No pixel reaches the requested percentiles, nothing marked");
        return Ok(());
    };
    debug!("Mark: {:?}", marked.summary);
    outcome.mark = Some(marked.summary);

    let marked_file = store
        .save_marked(&upload, &marked.image)
        .context("Failed to save marked image")?;
    outcome.marked = Some(marked_file.clone());

    if submission.display.original_colors {
        let chart = color_distribution(&original.image, &options.chart);
        outcome.original_colors = Some(
            store
                .save_distribution(DistributionKind::Original, submission.position, &chart)
                .context("Failed to save original color distribution")?,
        );
    }

    if submission.display.processed_colors {
        // chart what was written, including any encoder loss
        let reloaded = store.open(&marked_file)?;
        let chart = color_distribution(&reloaded.image, &options.chart);
        outcome.processed_colors = Some(
            store
                .save_distribution(DistributionKind::Processed, submission.position, &chart)
                .context("Failed to save processed color distribution")?,
        );
    }

    Ok(())
}
