//! Reset token verification
//!
//! Single pass, in order: structure, HS256 signature, scope/issuer/audience,
//! then expiry and issuance time. The first failure is returned; nothing is
//! retried or logged here.
//!
//! Lock staleness is deliberately not part of parsing. After a successful
//! parse the caller re-fetches the account's lock timestamp and checks
//! [`Claims::is_lock_stale`].

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::claims::{Claims, RESET_SCOPE};
use crate::config::ResetTokenConfig;
use crate::error::{ResetTokenError, Result};
use crate::RESET_TOKEN_ALGORITHM;

/// Verify `token` against `config` at the current time.
pub fn parse(token: &str, config: &ResetTokenConfig) -> Result<Claims> {
    parse_at(token, config, Utc::now())
}

/// Same as [`parse`] with an explicit verification instant.
pub fn parse_at(token: &str, config: &ResetTokenConfig, now: DateTime<Utc>) -> Result<Claims> {
    check_structure(token)?;

    let claims = verify_signature(token, config.signing_key())?;

    check_claims(&claims, config.issuer_url())?;
    check_times(&claims, now, config.clock_skew_secs())?;

    Ok(claims)
}

fn check_structure(token: &str) -> Result<()> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ResetTokenError::MalformedToken(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    }

    let is_b64url = |part: &str| {
        part.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    };
    if parts.iter().any(|part| part.is_empty() || !is_b64url(part)) {
        return Err(ResetTokenError::MalformedToken(
            "segments must be non-empty unpadded base64url".to_string(),
        ));
    }

    Ok(())
}

/// HS256 only; `exp`/`aud` are checked by hand so each failure gets its own
/// error kind and the verification instant can be injected.
fn verify_signature(token: &str, key: &[u8]) -> Result<Claims> {
    if key.is_empty() {
        return Err(ResetTokenError::config("signing key must not be empty"));
    }

    let mut validation = Validation::new(RESET_TOKEN_ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(key), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => ResetTokenError::Signature,
            _ => ResetTokenError::MalformedToken(e.to_string()),
        })
}

fn check_claims(claims: &Claims, issuer_url: &str) -> Result<()> {
    if claims.scope != RESET_SCOPE {
        return Err(ResetTokenError::mismatch("scope", RESET_SCOPE, claims.scope.as_str()));
    }

    if claims.issuer != issuer_url {
        return Err(ResetTokenError::mismatch("iss", issuer_url, claims.issuer.as_str()));
    }

    if !claims.audience.contains(issuer_url) {
        return Err(ResetTokenError::mismatch(
            "aud",
            issuer_url,
            claims.audience.to_string(),
        ));
    }

    Ok(())
}

fn check_times(claims: &Claims, now: DateTime<Utc>, clock_skew_secs: u64) -> Result<()> {
    if now > claims.expiry {
        return Err(ResetTokenError::Expired {
            expired_at: claims.expiry,
        });
    }

    let earliest = i64::try_from(clock_skew_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|skew| claims.issued_at.checked_sub_signed(skew))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    if now < earliest {
        return Err(ResetTokenError::NotYetValid {
            issued_at: claims.issued_at,
        });
    }

    Ok(())
}
