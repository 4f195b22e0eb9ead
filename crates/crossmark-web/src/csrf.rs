//! Stateless CSRF tokens.
//!
//! A token is `<issued_unix>.<hex sha256(secret "." issued_unix)>`, so the
//! server needs no session storage to check it.

use sha2::{Digest, Sha256};
use thiserror::Error;
use time::OffsetDateTime;

/// Tokens issued this far in the future are still accepted.
const CLOCK_SKEW_SECS: i64 = 60;

/// Why a submitted token was refused. Messages are shown on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("The CSRF token is missing.")]
    Missing,
    #[error("The CSRF token is invalid.")]
    Invalid,
    #[error("The CSRF token has expired.")]
    Expired,
}

/// Issues and checks tokens for one secret.
#[derive(Clone)]
pub struct CsrfTokens {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl std::fmt::Debug for CsrfTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfTokens")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl CsrfTokens {
    /// Creates a token source for `secret`.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    /// Creates a token source with 16 random secret bytes.
    ///
    /// Tokens do not survive a restart.
    #[must_use]
    pub fn random(ttl_secs: i64) -> Self {
        let secret: [u8; 16] = rand::random();
        Self::new(secret.to_vec(), ttl_secs)
    }

    /// Issues a token valid from now.
    #[must_use]
    pub fn issue(&self) -> String {
        self.issue_at(now())
    }

    /// Issues a token stamped with `issued` (unix seconds).
    #[must_use]
    pub fn issue_at(&self, issued: i64) -> String {
        format!("{issued}.{}", self.sign(issued))
    }

    /// Checks a submitted token against the current time.
    ///
    /// # Errors
    ///
    /// Returns the reason the token was refused.
    pub fn verify(&self, token: Option<&str>) -> Result<(), CsrfError> {
        self.verify_at(token, now())
    }

    /// Checks a submitted token against `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns the reason the token was refused.
    pub fn verify_at(&self, token: Option<&str>, now: i64) -> Result<(), CsrfError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let token = token.ok_or(CsrfError::Missing)?;

        let (issued, signature) = token.split_once('.').ok_or(CsrfError::Invalid)?;
        let issued: i64 = issued.parse().map_err(|_| CsrfError::Invalid)?;

        if !constant_time_eq(signature.as_bytes(), self.sign(issued).as_bytes()) {
            return Err(CsrfError::Invalid);
        }
        if issued > now + CLOCK_SKEW_SECS {
            return Err(CsrfError::Invalid);
        }
        if now - issued > self.ttl_secs {
            return Err(CsrfError::Expired);
        }
        Ok(())
    }

    fn sign(&self, issued: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b".");
        hasher.update(issued.to_string().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
