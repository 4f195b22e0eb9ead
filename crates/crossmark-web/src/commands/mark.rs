//! Mark command - run the submission service on a local file.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use crossmark_adapters::{is_allowed_upload, FsImageStore};
use crossmark_core::{
    process, ChannelPercents, CrossPosition, DisplayOptions, Percent, Submission,
};
use crossmark_web::config::AppConfig;
use tracing::info;

use super::ExitCode;

/// Parse and validate a percentage (0-100).
fn parse_percent(s: &str) -> Result<Percent, String> {
    s.parse::<Percent>().map_err(|e| format!("'{s}': {e}"))
}

/// Parse a cross position.
fn parse_position(s: &str) -> Result<CrossPosition, String> {
    s.parse::<CrossPosition>()
        .map_err(|_| format!("'{s}' is not one of: horizontal, vertical"))
}

/// Arguments for marking a single image.
#[derive(Args, Clone)]
pub struct MarkArgs {
    /// Image to mark (jpg, jpeg or png)
    pub image: PathBuf,

    /// Red percentile (0-100)
    #[arg(long, value_parser = parse_percent)]
    pub red: Percent,

    /// Green percentile (0-100)
    #[arg(long, value_parser = parse_percent)]
    pub green: Percent,

    /// Blue percentile (0-100)
    #[arg(long, value_parser = parse_percent)]
    pub blue: Percent,

    /// Orientation of the long beam
    #[arg(long, default_value = "horizontal", value_parser = parse_position)]
    pub position: CrossPosition,

    /// Render the color distribution of the original image
    #[arg(long)]
    pub original_colors: bool,

    /// Render the color distribution of the marked image
    #[arg(long)]
    pub processed_colors: bool,

    /// Directory for the copy and derived images (overrides config)
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Run the mark command.
///
/// Prints the outcome as JSON on stdout. Returns [`ExitCode::NotMarked`]
/// when no pixel reaches the requested percentiles.
pub fn run(args: &MarkArgs, config: &AppConfig) -> Result<ExitCode> {
    let file_name = args
        .image
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a file: {}", args.image.display()))?
        .to_string();
    if !is_allowed_upload(&file_name) {
        anyhow::bail!("Incorrect image format: {file_name} (expected jpg, jpeg or png)");
    }

    let data = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read {}", args.image.display()))?;

    let static_dir = args
        .static_dir
        .clone()
        .unwrap_or_else(|| config.static_dir());
    let store = FsImageStore::new(static_dir)?;
    let options = config.process_options()?;

    let submission = Submission {
        position: args.position,
        percents: ChannelPercents {
            red: args.red,
            green: args.green,
            blue: args.blue,
        },
        display: DisplayOptions {
            original_colors: args.original_colors,
            processed_colors: args.processed_colors,
        },
        file_name,
        data,
    };

    info!("Marking {}", args.image.display());
    let outcome = process(&store, &submission, &options)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;

    Ok(if outcome.is_marked() {
        ExitCode::Success
    } else {
        ExitCode::NotMarked
    })
}
