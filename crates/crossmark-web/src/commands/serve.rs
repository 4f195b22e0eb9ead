//! Serve command - run the web form.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use crossmark_web::config::{defaults, AppConfig};
use crossmark_web::{router, AppState};
use tokio::net::TcpListener;
use tracing::info;

/// Arguments for the web server.
#[derive(Args, Clone, Default)]
pub struct ServeArgs {
    /// Interface to bind [default: localhost]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind [default: 6001]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for uploads and derived images [default: ./static]
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: AppConfig,
}

impl ServeArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.host = args.host.or_else(|| config.server.host.clone());
        args.port = args.port.or(config.server.port);
        args.static_dir = args
            .static_dir
            .or_else(|| config.storage.static_dir.clone());
        args.config = config.clone();
        args
    }

    fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(defaults::HOST)
    }

    fn port(&self) -> u16 {
        self.port.unwrap_or(defaults::PORT)
    }

    fn static_dir(&self) -> PathBuf {
        self.static_dir
            .clone()
            .unwrap_or_else(|| self.config.static_dir())
    }
}

/// Run the serve command until interrupted.
///
/// Expects `args` to have been processed through `with_config()` first.
pub fn run(args: &ServeArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(serve(args))
}

async fn serve(args: &ServeArgs) -> Result<()> {
    let static_dir = args.static_dir();
    let state = Arc::new(AppState::from_config(&args.config, static_dir.clone())?);
    let app = router(state);

    let address = format!("{}:{}", args.host(), args.port());
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(
        "Listening on http://{} (static dir {})",
        listener.local_addr()?,
        static_dir.display()
    );
    eprintln!("crossmark listening on http://{address}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
