//! Crossmark - web form and CLI for marking images at color percentiles.

use clap::Parser;
use crossmark_web::AppConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::serve::ServeArgs;
use commands::{Cli, Commands, ExitCode};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let exit_code = match cli.command {
        Some(Commands::Serve(args)) => serve(args, &config),
        Some(Commands::Mark(ref args)) => match commands::mark::run(args, &config) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
        // Default behavior: serve with flattened args
        None => serve(cli.serve, &config),
    };

    exit_code.into()
}

fn serve(args: ServeArgs, config: &AppConfig) -> ExitCode {
    let args = ServeArgs::with_config(args, config);
    match commands::serve::run(&args) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}
