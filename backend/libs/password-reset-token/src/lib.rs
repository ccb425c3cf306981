//! Stateless, self-invalidating password reset tokens
//!
//! A reset token is an HS256 JWT scoped to one account. Besides the usual
//! issuer/audience/expiry claims it embeds the account's `lock` timestamp (the
//! last security-relevant change, e.g. a password change) as it was when the
//! token was issued. No revocation list is kept: once the account's lock moves
//! to a later second, every outstanding token for it is stale.
//!
//! **Flow**:
//! 1. `create` + `sign` with the account's freshly fetched lock time
//! 2. deliver the token out of band (email link, ...)
//! 3. `parse` checks signature, scope, issuer, audience and expiry
//! 4. the caller re-fetches the lock time and refuses the reset if
//!    `claims.is_lock_stale(current_lock)`
//!
//! Staleness is a separate boolean rather than a `parse` error so that
//! cryptographic validity and account state stay independent.
//!
//! ```rust,no_run
//! use chrono::Utc;
//! use password_reset_token::{create, parse, ResetTokenConfig};
//!
//! # fn main() -> password_reset_token::Result<()> {
//! let config = ResetTokenConfig::new("https://authn.example.com", "key-a-reno", 1800)?;
//! let password_changed_at = Utc::now();
//!
//! let token = create(&config, 52167, password_changed_at)?.sign(config.signing_key())?;
//!
//! let claims = parse(&token, &config)?;
//! if claims.is_lock_stale(password_changed_at) {
//!     // superseded by a later password change
//! }
//! # Ok(())
//! # }
//! ```
//!
//! All functions are pure over their inputs. Configuration is always passed
//! in; nothing here reads a global key.

use jsonwebtoken::Algorithm;

pub mod claims;
pub mod config;
pub mod error;
pub mod issuer;
pub mod key_strength;
pub mod verifier;

pub use claims::{Audience, Claims, RESET_SCOPE};
pub use config::ResetTokenConfig;
pub use error::{ResetTokenError, Result};
pub use issuer::{create, create_at, sign};
pub use key_strength::{classify_key, KeyStrength};
pub use verifier::{parse, parse_at};

/// Shared-secret HMAC; the issuer is also the only consumer.
pub const RESET_TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;
