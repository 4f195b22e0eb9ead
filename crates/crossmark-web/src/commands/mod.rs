//! CLI command definitions and handlers.

pub mod mark;
pub mod serve;

use clap::{Parser, Subcommand};

/// Crossmark - mark images at color percentile positions
#[derive(Parser)]
#[command(name = "crossmark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server arguments used when no subcommand is given.
    #[command(flatten)]
    pub serve: serve::ServeArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the web form
    Serve(serve::ServeArgs),
    /// Mark a local image and print the outcome as JSON
    Mark(mark::MarkArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Finished; for `mark`, a cross was drawn.
    Success = 0,
    /// `mark` found no pixel reaching the percentiles.
    NotMarked = 1,
    /// Any error.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
