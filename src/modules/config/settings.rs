use std::collections::HashSet;
use std::fmt;
use std::io;

use chrono::Duration;

use crate::modules::auth::error::{AuthError, Result};
use crate::modules::security::keyring::SecureSigningKey;
use crate::modules::utils::io::is_valid_email;
use crate::{DEFAULT_TIMEOUT_MINS, MIN_SECRET_KEY_LEN};

pub const ENV_SENDER_ADDRESS: &str = "SENDER_ADDRESS";
pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_TIMEOUT_MINS: &str = "TIMEOUT_MINS";
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
pub const ENV_MAX_ATTEMPTS: &str = "MAX_CHALLENGE_ATTEMPTS";
pub const ENV_STRICT_VERIFICATION: &str = "STRICT_VERIFICATION";
pub const ENV_LEGACY_PUBLIC_TOKEN: &str = "LEGACY_PUBLIC_TOKEN";

// Sample values that have shipped in example configs
const PLACEHOLDER_SECRETS: &[&str] = &["your-secure-secret-key", "changeme", "change-me", "secret"];
const MIN_DISTINCT_BYTES: usize = 8;

/// Process-wide settings, built once at startup and shared read-only
#[derive(Clone)]
pub struct MagicLinkConfig {
    pub sender_address: String,
    pub base_url: String,
    pub timeout_mins: u32,
    pub max_attempts: Option<u32>,
    pub strict_verification: bool, // Re-check HMAC at verify time
    pub legacy_public_token: bool, // Expose raw email and token publicly
    secret_key: Vec<u8>,
}

impl fmt::Debug for MagicLinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagicLinkConfig")
            .field("sender_address", &self.sender_address)
            .field("base_url", &self.base_url)
            .field("timeout_mins", &self.timeout_mins)
            .field("max_attempts", &self.max_attempts)
            .field("strict_verification", &self.strict_verification)
            .field("legacy_public_token", &self.legacy_public_token)
            .field("secret_key", &"[redacted]")
            .finish()
    }
}

impl MagicLinkConfig {
    /// Create a configuration with default timeout and policy flags
    pub fn new(
        sender_address: impl Into<String>,
        base_url: impl Into<String>,
        secret_key: impl AsRef<[u8]>,
    ) -> Result<Self> {
        let sender_address = sender_address.into();
        let base_url = base_url.into();

        if !is_valid_email(&sender_address) {
            return Err(AuthError::Config(format!(
                "{} is not a valid email address",
                ENV_SENDER_ADDRESS
            )));
        }
        validate_base_url(&base_url)?;
        validate_secret(secret_key.as_ref())?;

        Ok(Self {
            sender_address,
            base_url,
            timeout_mins: DEFAULT_TIMEOUT_MINS,
            max_attempts: None,
            strict_verification: true,
            legacy_public_token: false,
            secret_key: secret_key.as_ref().to_vec(),
        })
    }

    pub fn with_timeout_mins(mut self, timeout_mins: u32) -> Self {
        self.timeout_mins = timeout_mins;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_strict_verification(mut self, strict: bool) -> Self {
        self.strict_verification = strict;
        self
    }

    pub fn with_legacy_public_token(mut self, legacy: bool) -> Self {
        self.legacy_public_token = legacy;
        self
    }

    pub fn secret_key(&self) -> &[u8] {
        &self.secret_key
    }

    pub fn ttl(&self) -> Duration {
        Duration::minutes(i64::from(self.timeout_mins))
    }

    /// Load from the process environment.
    ///
    /// When `SECRET_KEY` is unset the signing key stored by `init-key` in the
    /// system keyring is used instead.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(
            |key| std::env::var(key).ok(),
            || SecureSigningKey::new().and_then(|store| store.get_key()),
        )
    }

    /// Build from an arbitrary key/value source
    pub fn from_lookup<F, K>(lookup: F, stored_secret: K) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
        K: FnOnce() -> io::Result<Vec<u8>>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AuthError::Config(format!("{} is not set", key)))
        };

        let sender_address = required(ENV_SENDER_ADDRESS)?;
        let base_url = required(ENV_BASE_URL)?;

        let secret_key = match lookup(ENV_SECRET_KEY).filter(|v| !v.is_empty()) {
            Some(secret) => secret.into_bytes(),
            None => stored_secret().map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => AuthError::Config(format!(
                    "{} is not set and no signing key is stored in the keyring",
                    ENV_SECRET_KEY
                )),
                _ => AuthError::Config(format!(
                    "{} is not set and the stored signing key could not be read: {}",
                    ENV_SECRET_KEY, e
                )),
            })?,
        };

        let timeout_mins = match lookup(ENV_TIMEOUT_MINS) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(mins) if mins > 0 => mins,
                _ => {
                    return Err(AuthError::Config(format!(
                        "{} must be a positive number of minutes",
                        ENV_TIMEOUT_MINS
                    )))
                }
            },
            None => DEFAULT_TIMEOUT_MINS,
        };

        let max_attempts = match lookup(ENV_MAX_ATTEMPTS) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(max) if max > 0 => Some(max),
                _ => {
                    return Err(AuthError::Config(format!(
                        "{} must be a positive integer",
                        ENV_MAX_ATTEMPTS
                    )))
                }
            },
            None => None,
        };

        let strict_verification = parse_flag(ENV_STRICT_VERIFICATION, lookup(ENV_STRICT_VERIFICATION), true)?;
        let legacy_public_token = parse_flag(ENV_LEGACY_PUBLIC_TOKEN, lookup(ENV_LEGACY_PUBLIC_TOKEN), false)?;

        Ok(Self::new(sender_address, base_url, secret_key)?
            .with_timeout_mins(timeout_mins)
            .with_max_attempts(max_attempts)
            .with_strict_verification(strict_verification)
            .with_legacy_public_token(legacy_public_token))
    }
}

fn parse_flag(key: &str, raw: Option<String>, default: bool) -> Result<bool> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AuthError::Config(format!(
            "{} has an unrecognized value: {}",
            key, other
        ))),
    }
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let host = base_url
        .strip_prefix("https://")
        .or_else(|| base_url.strip_prefix("http://"));
    match host {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') && !rest.contains(' ') => Ok(()),
        _ => Err(AuthError::Config(format!(
            "{} must be an absolute http(s) URL",
            ENV_BASE_URL
        ))),
    }
}

/// Refuse absent, short, placeholder or low-entropy signing keys
pub fn validate_secret(secret_key: &[u8]) -> Result<()> {
    if secret_key.is_empty() {
        return Err(AuthError::Config(format!("{} is empty", ENV_SECRET_KEY)));
    }

    let lowered = String::from_utf8_lossy(secret_key).to_lowercase();
    if PLACEHOLDER_SECRETS
        .iter()
        .any(|placeholder| lowered.contains(placeholder))
    {
        return Err(AuthError::Config(format!(
            "{} looks like a placeholder value",
            ENV_SECRET_KEY
        )));
    }

    if secret_key.len() < MIN_SECRET_KEY_LEN {
        return Err(AuthError::Config(format!(
            "{} must be at least {} bytes",
            ENV_SECRET_KEY, MIN_SECRET_KEY_LEN
        )));
    }

    let distinct: HashSet<&u8> = secret_key.iter().collect();
    if distinct.len() < MIN_DISTINCT_BYTES {
        return Err(AuthError::Config(format!(
            "{} does not have enough entropy",
            ENV_SECRET_KEY
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const GOOD_SECRET: &str = "k7Qe9zR2mW4xT8vB1nL6pY3sD0fH5jGa";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_stored_key() -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::NotFound, "No secret set"))
    }

    fn base_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_SENDER_ADDRESS, "noreply@example.com"),
            (ENV_BASE_URL, "https://app.example.com/login"),
            (ENV_SECRET_KEY, GOOD_SECRET),
        ]
    }

    #[test]
    fn test_defaults_from_lookup() {
        let config = MagicLinkConfig::from_lookup(lookup_from(&base_env()), no_stored_key).unwrap();
        assert_eq!(config.timeout_mins, 15);
        assert_eq!(config.ttl(), Duration::minutes(15));
        assert!(config.max_attempts.is_none());
        assert!(config.strict_verification);
        assert!(!config.legacy_public_token);
        assert_eq!(config.secret_key(), GOOD_SECRET.as_bytes());
    }

    #[test]
    fn test_overrides_from_lookup() {
        let mut env = base_env();
        env.push((ENV_TIMEOUT_MINS, "5"));
        env.push((ENV_MAX_ATTEMPTS, "3"));
        env.push((ENV_STRICT_VERIFICATION, "false"));
        env.push((ENV_LEGACY_PUBLIC_TOKEN, "yes"));

        let config = MagicLinkConfig::from_lookup(lookup_from(&env), no_stored_key).unwrap();
        assert_eq!(config.timeout_mins, 5);
        assert_eq!(config.max_attempts, Some(3));
        assert!(!config.strict_verification);
        assert!(config.legacy_public_token);
    }

    #[test]
    fn test_missing_secret_refuses_to_start() {
        let env = vec![
            (ENV_SENDER_ADDRESS, "noreply@example.com"),
            (ENV_BASE_URL, "https://app.example.com"),
        ];
        let result = MagicLinkConfig::from_lookup(lookup_from(&env), no_stored_key);
        match result {
            Err(AuthError::Config(msg)) => assert!(msg.contains("no signing key is stored")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_stored_secret_reports_cause() {
        let env = vec![
            (ENV_SENDER_ADDRESS, "noreply@example.com"),
            (ENV_BASE_URL, "https://app.example.com"),
        ];
        let result = MagicLinkConfig::from_lookup(lookup_from(&env), || {
            Err(io::Error::new(io::ErrorKind::InvalidData, "Odd number of digits"))
        });
        match result {
            Err(AuthError::Config(msg)) => {
                assert!(msg.contains("could not be read"));
                assert!(msg.contains("Odd number of digits"));
            }
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_stored_secret_is_used_when_env_is_unset() {
        let env = vec![
            (ENV_SENDER_ADDRESS, "noreply@example.com"),
            (ENV_BASE_URL, "https://app.example.com"),
        ];
        let stored: Vec<u8> = (0u8..32).collect();
        let config =
            MagicLinkConfig::from_lookup(lookup_from(&env), || Ok(stored.clone())).unwrap();
        assert_eq!(config.secret_key(), stored.as_slice());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (key, value) in [
            (ENV_TIMEOUT_MINS, "0"),
            (ENV_TIMEOUT_MINS, "fifteen"),
            (ENV_MAX_ATTEMPTS, "0"),
            (ENV_STRICT_VERIFICATION, "maybe"),
            (ENV_BASE_URL, "app.example.com"),
            (ENV_SENDER_ADDRESS, "not-an-email"),
        ] {
            let mut env = base_env();
            env.retain(|(k, _)| *k != key);
            env.push((key, value));
            assert!(
                MagicLinkConfig::from_lookup(lookup_from(&env), no_stored_key).is_err(),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_secret_validation() {
        assert!(validate_secret(b"").is_err());
        assert!(validate_secret(b"short-but-random-9f8e").is_err());
        assert!(validate_secret(b"your-secure-secret-key-padded-out-to-length").is_err());
        assert!(validate_secret(&[b'a'; 64]).is_err());
        assert!(validate_secret(GOOD_SECRET.as_bytes()).is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = MagicLinkConfig::from_lookup(lookup_from(&base_env()), no_stored_key).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(GOOD_SECRET));
        assert!(rendered.contains("[redacted]"));
    }
}
