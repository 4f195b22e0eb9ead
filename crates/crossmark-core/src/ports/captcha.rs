//! CAPTCHA verification port.

use std::net::IpAddr;

use async_trait::async_trait;
use thiserror::Error;

/// Why a CAPTCHA response was not accepted.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptchaRejection {
    /// The form carried no response token.
    #[error("The response parameter is missing.")]
    Missing,
    /// The verification service refused the token.
    #[error("The response parameter is invalid or malformed.")]
    Invalid,
    /// The verification service could not be reached.
    #[error("Could not verify the CAPTCHA, please try again.")]
    Unavailable,
}

/// Port for checking a CAPTCHA response token.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Verifies the token submitted with the form.
    ///
    /// # Errors
    ///
    /// Returns the reason the submission must be rejected.
    async fn verify(
        &self,
        response: Option<&str>,
        remote_ip: Option<IpAddr>,
    ) -> Result<(), CaptchaRejection>;
}
