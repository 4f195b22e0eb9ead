//! Configuration file support for crossmark.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/crossmark/config.toml` (lowest priority)
//! - Project-local: `.crossmark.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use anyhow::Result;
use crossmark_core::{ChartStyle, CrossStyle, ProcessOptions};
use image::Rgb;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Hardcoded fallbacks for settings no layer provides.
pub mod defaults {
    pub const HOST: &str = "localhost";
    pub const PORT: u16 = 6001;
    pub const STATIC_DIR: &str = "./static";
    pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
    pub const CAPTCHA_THEME: &str = "dark";
    pub const CSRF_TTL_SECS: i64 = 3600;
}

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Where uploads and derived images are written.
    pub storage: StorageConfig,
    /// reCAPTCHA settings.
    pub captcha: CaptchaConfig,
    /// Cross appearance.
    pub mark: MarkConfig,
    /// Distribution chart settings.
    pub distribution: DistributionConfig,
}

/// HTTP server configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Largest accepted request body.
    pub max_upload_bytes: Option<usize>,
    /// Secret for CSRF tokens. Random per process when unset.
    pub secret_key: Option<String>,
    /// CSRF token lifetime in seconds.
    pub csrf_ttl_secs: Option<i64>,
}

/// Storage configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Static directory for uploads and derived images.
    pub static_dir: Option<PathBuf>,
}

/// reCAPTCHA configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// Require a CAPTCHA on submission.
    pub enabled: Option<bool>,
    /// Public site key rendered into the widget.
    pub site_key: Option<String>,
    /// Private key sent to the verification endpoint.
    pub secret_key: Option<String>,
    /// Widget theme: "dark" or "light".
    pub theme: Option<String>,
    /// Verification endpoint override.
    pub verify_url: Option<String>,
}

/// Cross appearance configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MarkConfig {
    /// Cross color as `#rrggbb`.
    pub color: Option<String>,
    /// Bar thickness in pixels.
    pub thickness: Option<u32>,
    /// Short arm length in pixels.
    pub arm: Option<u32>,
}

/// Distribution chart configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Chart width in pixels.
    pub width: Option<u32>,
    /// Chart height in pixels.
    pub height: Option<u32>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/crossmark/config.toml`
    /// 2. Project-local: `.crossmark.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            warn!("{e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending key.
    pub fn validate(&self) -> Result<(), String> {
        if self.captcha.enabled == Some(true)
            && (self.captcha.site_key.is_none() || self.captcha.secret_key.is_none())
        {
            return Err("captcha.enabled requires captcha.site_key and captcha.secret_key".into());
        }
        if let Some(ref theme) = self.captcha.theme {
            if theme != "dark" && theme != "light" {
                return Err(format!(
                    "captcha.theme must be 'dark' or 'light', got '{theme}'"
                ));
            }
        }
        if let Some(ref color) = self.mark.color {
            parse_hex_color(color).map_err(|e| format!("mark.color: {e}"))?;
        }
        if let Some(t) = self.mark.thickness {
            if !(1..=CrossStyle::MAX_EXTENT).contains(&t) {
                return Err(format!(
                    "mark.thickness must be between 1 and {}, got {t}",
                    CrossStyle::MAX_EXTENT
                ));
            }
        }
        if let Some(arm) = self.mark.arm {
            if arm > CrossStyle::MAX_EXTENT {
                return Err(format!(
                    "mark.arm must be at most {}, got {arm}",
                    CrossStyle::MAX_EXTENT
                ));
            }
        }
        if let Some(w) = self.distribution.width {
            if w < ChartStyle::MIN_WIDTH {
                return Err(format!(
                    "distribution.width must be at least {}, got {w}",
                    ChartStyle::MIN_WIDTH
                ));
            }
        }
        if let Some(h) = self.distribution.height {
            if h < ChartStyle::MIN_HEIGHT {
                return Err(format!(
                    "distribution.height must be at least {}, got {h}",
                    ChartStyle::MIN_HEIGHT
                ));
            }
        }
        if self.server.max_upload_bytes == Some(0) {
            return Err("server.max_upload_bytes must be positive".into());
        }
        if let Some(ttl) = self.server.csrf_ttl_secs {
            if ttl <= 0 {
                return Err(format!("server.csrf_ttl_secs must be positive, got {ttl}"));
            }
        }
        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    pub fn merge(&mut self, other: Self) {
        // Server
        self.server.host = other.server.host.or_else(|| self.server.host.take());
        self.server.port = other.server.port.or(self.server.port);
        self.server.max_upload_bytes = other
            .server
            .max_upload_bytes
            .or(self.server.max_upload_bytes);
        self.server.secret_key = other
            .server
            .secret_key
            .or_else(|| self.server.secret_key.take());
        self.server.csrf_ttl_secs = other.server.csrf_ttl_secs.or(self.server.csrf_ttl_secs);

        // Storage
        self.storage.static_dir = other
            .storage
            .static_dir
            .or_else(|| self.storage.static_dir.take());

        // Captcha
        self.captcha.enabled = other.captcha.enabled.or(self.captcha.enabled);
        self.captcha.site_key = other
            .captcha
            .site_key
            .or_else(|| self.captcha.site_key.take());
        self.captcha.secret_key = other
            .captcha
            .secret_key
            .or_else(|| self.captcha.secret_key.take());
        self.captcha.theme = other.captcha.theme.or_else(|| self.captcha.theme.take());
        self.captcha.verify_url = other
            .captcha
            .verify_url
            .or_else(|| self.captcha.verify_url.take());

        // Mark
        self.mark.color = other.mark.color.or_else(|| self.mark.color.take());
        self.mark.thickness = other.mark.thickness.or(self.mark.thickness);
        self.mark.arm = other.mark.arm.or(self.mark.arm);

        // Distribution
        self.distribution.width = other.distribution.width.or(self.distribution.width);
        self.distribution.height = other.distribution.height.or(self.distribution.height);
    }

    /// Whether submissions must pass a CAPTCHA.
    ///
    /// Requires both keys; a half-configured captcha stays off.
    #[must_use]
    pub fn captcha_enabled(&self) -> bool {
        self.captcha.enabled.unwrap_or(false)
            && self.captcha.site_key.is_some()
            && self.captcha.secret_key.is_some()
    }

    /// Static directory with fallback to `./static`.
    #[must_use]
    pub fn static_dir(&self) -> PathBuf {
        self.storage
            .static_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::STATIC_DIR))
    }

    /// Request body limit with fallback to 16 MiB.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.server
            .max_upload_bytes
            .unwrap_or(defaults::MAX_UPLOAD_BYTES)
    }

    /// CSRF token lifetime with fallback to one hour.
    #[must_use]
    pub fn csrf_ttl_secs(&self) -> i64 {
        self.server.csrf_ttl_secs.unwrap_or(defaults::CSRF_TTL_SECS)
    }

    /// Builds the rendering options for the submission service.
    ///
    /// # Errors
    ///
    /// Returns an error if `mark.color` is not a valid hex color.
    pub fn process_options(&self) -> Result<ProcessOptions> {
        let defaults = ProcessOptions::default();
        let color = match self.mark.color {
            Some(ref c) => parse_hex_color(c).map_err(|e| anyhow::anyhow!("mark.color: {e}"))?,
            None => defaults.cross.color,
        };
        Ok(ProcessOptions {
            cross: CrossStyle {
                color,
                thickness: self.mark.thickness,
                arm: self.mark.arm,
            },
            chart: ChartStyle {
                width: self.distribution.width.unwrap_or(defaults.chart.width),
                height: self.distribution.height.unwrap_or(defaults.chart.height),
            },
        })
    }
}

/// Parses `#rrggbb` (the `#` is optional).
///
/// # Errors
///
/// Returns a message if the string is not six hex digits.
pub fn parse_hex_color(s: &str) -> Result<Rgb<u8>, String> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("'{s}' is not a #rrggbb color"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("'{s}' is not a #rrggbb color"))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("crossmark").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.crossmark.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".crossmark.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
