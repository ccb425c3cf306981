//! Reset token configuration
//!
//! A `ResetTokenConfig` is passed by reference into every issue/verify call.
//! There is no process-wide key or issuer; two configurations can coexist in
//! one process (e.g. tests, or a verifier checking a neighbouring deployment).

use std::fmt;

use serde::Deserialize;
use tracing::warn;
use url::Url;
use zeroize::Zeroizing;

use crate::error::{ResetTokenError, Result};
use crate::key_strength::{classify_key, KeyStrength};

const DEFAULT_TOKEN_TTL_SECS: u64 = 1800; // 30 minutes
const DEFAULT_CLOCK_SKEW_SECS: u64 = 30;

#[derive(Clone)]
pub struct ResetTokenConfig {
    issuer_url: String,
    signing_key: Zeroizing<Vec<u8>>,
    token_ttl_secs: u64,
    clock_skew_secs: u64,
}

impl ResetTokenConfig {
    /// Build a validated configuration.
    ///
    /// `issuer_url` must be an absolute http(s) URL with a host. It is stored
    /// in canonical form: a bare origin loses its trailing `/`, so
    /// `https://authn.example.com/` and `https://authn.example.com` name the
    /// same issuer.
    pub fn new(
        issuer_url: &str,
        signing_key: impl Into<Vec<u8>>,
        token_ttl_secs: u64,
    ) -> Result<Self> {
        let issuer_url = canonical_issuer(issuer_url)?;

        let signing_key = Zeroizing::new(signing_key.into());
        if signing_key.is_empty() {
            return Err(ResetTokenError::config("signing key must not be empty"));
        }

        if token_ttl_secs == 0 {
            return Err(ResetTokenError::config("token TTL must be positive"));
        }

        Ok(Self {
            issuer_url,
            signing_key,
            token_ttl_secs,
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
        })
    }

    /// Tolerance applied when a token's `iat` lies in the verifier's future.
    pub fn with_clock_skew(mut self, secs: u64) -> Self {
        self.clock_skew_secs = secs;
        self
    }

    /// Load from process environment, reading `.env` first when present.
    ///
    /// **Environment Variables**:
    /// - `AUTHN_URL`: canonical base URL of this service (REQUIRED)
    /// - `PASSWORD_RESET_SIGNING_KEY`: HMAC secret (REQUIRED)
    /// - `PASSWORD_RESET_TOKEN_TTL`: lifetime in seconds (default: 1800)
    /// - `PASSWORD_RESET_CLOCK_SKEW`: `iat` tolerance in seconds (default: 30)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let env: EnvSettings = envy::from_env()
            .map_err(|e| ResetTokenError::config(format!("environment: {e}")))?;

        if classify_key(env.password_reset_signing_key.as_bytes()) == KeyStrength::Weak {
            warn!("PASSWORD_RESET_SIGNING_KEY is weak - use at least 32 random bytes");
        }

        Ok(Self::new(
            &env.authn_url,
            env.password_reset_signing_key.into_bytes(),
            env.password_reset_token_ttl,
        )?
        .with_clock_skew(env.password_reset_clock_skew))
    }

    pub fn issuer_url(&self) -> &str {
        &self.issuer_url
    }

    pub fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_secs
    }

    pub fn clock_skew_secs(&self) -> u64 {
        self.clock_skew_secs
    }
}

impl fmt::Debug for ResetTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetTokenConfig")
            .field("issuer_url", &self.issuer_url)
            .field("signing_key", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .finish()
    }
}

#[derive(Deserialize)]
struct EnvSettings {
    authn_url: String,
    password_reset_signing_key: String,
    #[serde(default = "default_token_ttl")]
    password_reset_token_ttl: u64,
    #[serde(default = "default_clock_skew")]
    password_reset_clock_skew: u64,
}

fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

fn default_clock_skew() -> u64 {
    DEFAULT_CLOCK_SKEW_SECS
}

fn canonical_issuer(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ResetTokenError::config(format!("issuer URL `{raw}`: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ResetTokenError::config(format!(
            "issuer URL `{raw}` must use http or https"
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ResetTokenError::config(format!(
            "issuer URL `{raw}` has no host"
        )));
    }

    let serialized = url.as_str();
    if url.path() == "/" && url.query().is_none() && url.fragment().is_none() {
        Ok(serialized.trim_end_matches('/').to_string())
    } else {
        Ok(serialized.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "AUTHN_URL",
            "PASSWORD_RESET_SIGNING_KEY",
            "PASSWORD_RESET_TOKEN_TTL",
            "PASSWORD_RESET_CLOCK_SKEW",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn bare_origin_is_canonicalized_without_trailing_slash() {
        let cfg = ResetTokenConfig::new("https://authn.example.com/", "k", 60).unwrap();
        assert_eq!(cfg.issuer_url(), "https://authn.example.com");

        let cfg = ResetTokenConfig::new("https://authn.example.com", "k", 60).unwrap();
        assert_eq!(cfg.issuer_url(), "https://authn.example.com");
    }

    #[test]
    fn issuer_with_path_keeps_path() {
        let cfg = ResetTokenConfig::new("https://example.com/authn", "k", 60).unwrap();
        assert_eq!(cfg.issuer_url(), "https://example.com/authn");
    }

    #[test]
    fn rejects_missing_or_bad_issuer() {
        for raw in ["", "authn.example.com", "ftp://authn.example.com", "https://"] {
            let err = ResetTokenConfig::new(raw, "k", 60).unwrap_err();
            assert!(
                matches!(err, ResetTokenError::Configuration(_)),
                "expected configuration error for {raw:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_empty_key_and_zero_ttl() {
        assert!(matches!(
            ResetTokenConfig::new("https://authn.example.com", Vec::new(), 60),
            Err(ResetTokenError::Configuration(_))
        ));
        assert!(matches!(
            ResetTokenConfig::new("https://authn.example.com", "k", 0),
            Err(ResetTokenError::Configuration(_))
        ));
    }

    #[test]
    fn debug_redacts_signing_key() {
        let cfg = ResetTokenConfig::new("https://authn.example.com", "key-a-reno", 60).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("key-a-reno"));
    }

    #[test]
    fn clock_skew_defaults_and_overrides() {
        let cfg = ResetTokenConfig::new("https://authn.example.com", "k", 60).unwrap();
        assert_eq!(cfg.clock_skew_secs(), DEFAULT_CLOCK_SKEW_SECS);
        assert_eq!(cfg.with_clock_skew(5).clock_skew_secs(), 5);
    }

    #[test]
    #[serial]
    fn from_env_reads_required_and_default_values() {
        clear_env();
        std::env::set_var("AUTHN_URL", "https://authn.example.com");
        std::env::set_var("PASSWORD_RESET_SIGNING_KEY", "key-a-reno");

        let cfg = ResetTokenConfig::from_env().unwrap();
        assert_eq!(cfg.issuer_url(), "https://authn.example.com");
        assert_eq!(cfg.signing_key(), b"key-a-reno");
        assert_eq!(cfg.token_ttl_secs(), DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(cfg.clock_skew_secs(), DEFAULT_CLOCK_SKEW_SECS);

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_parses_overrides() {
        clear_env();
        std::env::set_var("AUTHN_URL", "https://authn.example.com");
        std::env::set_var("PASSWORD_RESET_SIGNING_KEY", "key-a-reno");
        std::env::set_var("PASSWORD_RESET_TOKEN_TTL", "3600");
        std::env::set_var("PASSWORD_RESET_CLOCK_SKEW", "0");

        let cfg = ResetTokenConfig::from_env().unwrap();
        assert_eq!(cfg.token_ttl_secs(), 3600);
        assert_eq!(cfg.clock_skew_secs(), 0);

        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_requires_issuer_and_key() {
        clear_env();
        std::env::set_var("PASSWORD_RESET_SIGNING_KEY", "key-a-reno");

        let err = ResetTokenConfig::from_env().unwrap_err();
        assert!(matches!(err, ResetTokenError::Configuration(_)));

        clear_env();
    }
}
