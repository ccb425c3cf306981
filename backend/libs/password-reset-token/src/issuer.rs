//! Reset token issuance
//!
//! `create` builds the claim set, `sign` turns it into a compact HS256 JWT.
//! They are split so callers can inspect or log the claims before signing.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use tracing::debug;

use crate::claims::{truncate_to_second, Audience, Claims, RESET_SCOPE};
use crate::config::ResetTokenConfig;
use crate::error::{ResetTokenError, Result};
use crate::RESET_TOKEN_ALGORITHM;

/// Build reset claims for `account_id`, stamped with the current time.
///
/// `lock_time` must be re-fetched from the account store immediately before
/// this call, otherwise the token can be stale the moment it is created.
pub fn create(config: &ResetTokenConfig, account_id: u64, lock_time: DateTime<Utc>) -> Result<Claims> {
    create_at(config, account_id, lock_time, Utc::now())
}

/// Same as [`create`] with an explicit issuance instant.
///
/// Fails only on malformed configuration.
pub fn create_at(
    config: &ResetTokenConfig,
    account_id: u64,
    lock_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Claims> {
    let issuer = config.issuer_url();
    if issuer.is_empty() {
        return Err(ResetTokenError::config("issuer URL is missing"));
    }

    let ttl = i64::try_from(config.token_ttl_secs())
        .ok()
        .and_then(Duration::try_seconds)
        .filter(|ttl| *ttl > Duration::zero())
        .ok_or_else(|| ResetTokenError::config("token TTL out of range"))?;

    let issued_at = truncate_to_second(now);
    let expiry = issued_at
        .checked_add_signed(ttl)
        .ok_or_else(|| ResetTokenError::config("token TTL overflows expiry"))?;

    Ok(Claims {
        scope: RESET_SCOPE.to_string(),
        subject: account_id.to_string(),
        issuer: issuer.to_string(),
        audience: Audience::single(issuer),
        issued_at,
        expiry,
        lock: truncate_to_second(lock_time),
    })
}

/// Serialize and sign `claims` with the shared HMAC `key`.
///
/// Returns `header.payload.signature`, each part base64url without padding.
pub fn sign(claims: &Claims, key: &[u8]) -> Result<String> {
    if key.is_empty() {
        return Err(ResetTokenError::config("signing key must not be empty"));
    }

    let token = encode(
        &Header::new(RESET_TOKEN_ALGORITHM),
        claims,
        &EncodingKey::from_secret(key),
    )
    .map_err(|e| ResetTokenError::Signing(e.to_string()))?;

    debug!(
        subject = %claims.subject,
        expiry = %claims.expiry,
        "Password reset token signed"
    );

    Ok(token)
}

impl Claims {
    /// Method form of [`sign`].
    pub fn sign(&self, key: &[u8]) -> Result<String> {
        sign(self, key)
    }
}
