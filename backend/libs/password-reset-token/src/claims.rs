//! Password reset claim set
//!
//! The payload is a JWT claim set using the registered names (`iss`, `sub`,
//! `aud`, `iat`, `exp`) plus two private claims: `scope`, fixed to `"reset"`,
//! and `lock`, the account's security-state timestamp at issuance.
//!
//! All timestamps are NumericDate (whole Unix seconds). Sub-second precision
//! is dropped when claims are built, so a decoded token compares equal to the
//! claims it was signed from.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ResetTokenError, Result};

/// The only scope a password reset token may carry
pub const RESET_SCOPE: &str = "reset";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Token purpose, always [`RESET_SCOPE`] for tokens this crate issues
    pub scope: String,

    /// Account ID in decimal
    #[serde(rename = "sub")]
    pub subject: String,

    /// Canonical base URL of the issuing service
    #[serde(rename = "iss")]
    pub issuer: String,

    #[serde(rename = "aud")]
    pub audience: Audience,

    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expiry: DateTime<Utc>,

    /// Account lock snapshot; opaque, only ever compared
    #[serde(with = "chrono::serde::ts_seconds")]
    pub lock: DateTime<Utc>,
}

impl Claims {
    /// Whether the account's security state moved on since issuance.
    ///
    /// True iff `current_lock`, truncated to the second, is strictly later
    /// than the embedded `lock`. A change landing in the same second as the
    /// snapshot does not invalidate the token.
    ///
    /// The caller must fetch `current_lock` from the account store right
    /// before calling this; a stale token must be refused even though
    /// [`crate::parse`] accepted it.
    pub fn is_lock_stale(&self, current_lock: DateTime<Utc>) -> bool {
        current_lock.timestamp() > self.lock.timestamp()
    }

    /// Parse `sub` back into the numeric account id.
    pub fn account_id(&self) -> Result<u64> {
        self.subject.parse().map_err(|_| {
            ResetTokenError::MalformedToken(format!("subject `{}` is not an account id", self.subject))
        })
    }

    /// Remaining lifetime at `now`; negative once expired.
    pub fn expires_in(&self, now: DateTime<Utc>) -> Duration {
        self.expiry - truncate_to_second(now)
    }
}

/// Drop the sub-second part, leaving the same NumericDate a JWT would carry.
pub fn truncate_to_second(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(0).unwrap_or(at)
}

/// Intended recipients of a token.
///
/// Serialized as a bare string when it holds one entry and as an array
/// otherwise, matching RFC 7519 `aud`. Both forms decode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audience(Vec<String>);

impl Audience {
    pub fn single(recipient: impl Into<String>) -> Self {
        Self(vec![recipient.into()])
    }

    pub fn contains(&self, recipient: &str) -> bool {
        self.0.iter().any(|r| r == recipient)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Audience {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut recipients: Vec<String> = Vec::new();
        for recipient in iter {
            let recipient = recipient.into();
            if !recipients.contains(&recipient) {
                recipients.push(recipient);
            }
        }
        Self(recipients)
    }
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl Serialize for Audience {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [only] => serializer.serialize_str(only),
            all => all.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::One(recipient) => Audience::single(recipient),
            Wire::Many(recipients) => recipients.into_iter().collect(),
        })
    }
}
