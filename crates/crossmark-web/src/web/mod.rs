//! HTTP front end.

mod handlers;
mod templates;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use crossmark_adapters::{DisabledCaptcha, FsImageStore, RecaptchaVerifier, DEFAULT_VERIFY_URL};
use crossmark_core::{CaptchaVerifier, ImageStore, ProcessOptions};
use serde::Serialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use templates::Templates;

use crate::config::{defaults, AppConfig};
use crate::csrf::CsrfTokens;

/// What the page needs to render the reCAPTCHA widget.
#[derive(Debug, Clone, Serialize)]
pub struct CaptchaWidget {
    pub site_key: String,
    pub theme: String,
}

/// Shared, read-only state of the server.
pub struct AppState {
    pub store: Arc<dyn ImageStore>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    /// `None` when submissions are not CAPTCHA protected.
    pub captcha_widget: Option<CaptchaWidget>,
    pub csrf: CsrfTokens,
    pub templates: Templates,
    pub options: ProcessOptions,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires the filesystem store and the configured CAPTCHA verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the static directory cannot be created, a
    /// template fails to compile, or the configuration holds invalid values.
    pub fn from_config(config: &AppConfig, static_dir: PathBuf) -> Result<Self> {
        let store = FsImageStore::new(&static_dir)?;

        let (captcha, captcha_widget) =
            match (&config.captcha.site_key, &config.captcha.secret_key) {
                (Some(site_key), Some(secret_key)) if config.captcha_enabled() => {
                    let verify_url = config
                        .captcha
                        .verify_url
                        .clone()
                        .unwrap_or_else(|| DEFAULT_VERIFY_URL.to_string());
                    let widget = CaptchaWidget {
                        site_key: site_key.clone(),
                        theme: config
                            .captcha
                            .theme
                            .clone()
                            .unwrap_or_else(|| defaults::CAPTCHA_THEME.to_string()),
                    };
                    info!("CAPTCHA enabled, verifying against {verify_url}");
                    let verifier: Arc<dyn CaptchaVerifier> =
                        Arc::new(RecaptchaVerifier::new(secret_key.clone(), verify_url)?);
                    (verifier, Some(widget))
                }
                _ => {
                    let verifier: Arc<dyn CaptchaVerifier> = Arc::new(DisabledCaptcha);
                    (verifier, None)
                }
            };

        let csrf = match config.server.secret_key {
            Some(ref secret) => CsrfTokens::new(secret.as_bytes().to_vec(), config.csrf_ttl_secs()),
            None => CsrfTokens::random(config.csrf_ttl_secs()),
        };

        Ok(Self {
            store: Arc::new(store),
            captcha,
            captcha_widget,
            csrf,
            templates: Templates::new()?,
            options: config.process_options()?,
            static_dir,
            max_upload_bytes: config.max_upload_bytes(),
        })
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/info", get(handlers::info))
        .nest_service("/static", static_files)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
