//! reCAPTCHA verification adapter.

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use crossmark_core::{CaptchaRejection, CaptchaVerifier};
use serde::Deserialize;
use tracing::{debug, warn};

/// Google's verification endpoint.
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Response body of the verification endpoint.
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifies tokens against the reCAPTCHA `siteverify` API.
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    /// Creates a verifier for the given secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(secret: impl Into<String>, verify_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            secret: secret.into(),
            verify_url: verify_url.into(),
        })
    }

    async fn site_verify(
        &self,
        token: &str,
        remote_ip: Option<IpAddr>,
    ) -> Result<SiteVerifyResponse> {
        let mut form = vec![("secret", self.secret.clone()), ("response", token.to_string())];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip.to_string()));
        }

        let response = self
            .client
            .post(&self.verify_url)
            .form(&form)
            .send()
            .await
            .context("siteverify request failed")?
            .error_for_status()
            .context("siteverify returned an error status")?;

        response
            .json::<SiteVerifyResponse>()
            .await
            .context("siteverify returned malformed JSON")
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(
        &self,
        response: Option<&str>,
        remote_ip: Option<IpAddr>,
    ) -> Result<(), CaptchaRejection> {
        let token = match response.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(CaptchaRejection::Missing),
        };

        match self.site_verify(token, remote_ip).await {
            Ok(body) if body.success => Ok(()),
            Ok(body) => {
                debug!("CAPTCHA rejected: {:?}", body.error_codes);
                Err(CaptchaRejection::Invalid)
            }
            Err(e) => {
                warn!("CAPTCHA verification unavailable: {e:#}");
                Err(CaptchaRejection::Unavailable)
            }
        }
    }
}

/// Accepts every submission. Used when no CAPTCHA keys are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCaptcha;

#[async_trait]
impl CaptchaVerifier for DisabledCaptcha {
    async fn verify(
        &self,
        _response: Option<&str>,
        _remote_ip: Option<IpAddr>,
    ) -> Result<(), CaptchaRejection> {
        Ok(())
    }
}
