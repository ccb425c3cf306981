//! Failure kinds for issuing and verifying reset tokens
//!
//! Every variant is terminal: the caller discards the token and asks the user
//! to request a new one.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResetTokenError>;

#[derive(Debug, Error)]
pub enum ResetTokenError {
    /// Issuer URL, signing key or TTL is missing or malformed
    #[error("invalid reset token configuration: {0}")]
    Configuration(String),

    /// The encoder could not produce a signed token
    #[error("failed to sign reset token: {0}")]
    Signing(String),

    /// Signature does not verify under the configured key
    #[error("invalid reset token signature")]
    Signature,

    /// Scope, issuer or audience does not match this deployment
    #[error("reset token claim `{claim}` mismatch: expected {expected}, got {actual}")]
    ClaimMismatch {
        claim: &'static str,
        expected: String,
        actual: String,
    },

    #[error("reset token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("reset token not valid until {issued_at}")]
    NotYetValid { issued_at: DateTime<Utc> },

    /// The token text cannot be decoded into header, claims and signature
    #[error("malformed reset token: {0}")]
    MalformedToken(String),
}

impl ResetTokenError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn mismatch(
        claim: &'static str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ClaimMismatch {
            claim,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
