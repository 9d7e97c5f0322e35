use log::{info, warn};
use subtle::ConstantTimeEq;

use super::events::PrivateChallengeParameters;
use super::tokens::MagicToken;
use crate::modules::config::MagicLinkConfig;
use crate::modules::utils::time::current_timestamp;

/// Constant-time string equality
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Checks a client answer against the privately held token.
///
/// Every failure is reported as `false`: a wrong answer is an expected
/// outcome, not an error.
pub struct ChallengeVerifier<'a> {
    config: &'a MagicLinkConfig,
}

impl<'a> ChallengeVerifier<'a> {
    pub fn new(config: &'a MagicLinkConfig) -> Self {
        Self { config }
    }

    pub fn verify(&self, private_params: &PrivateChallengeParameters, answer: Option<&str>) -> bool {
        match current_timestamp() {
            Ok(now) => self.verify_at(private_params, answer, now),
            Err(e) => {
                warn!("Verify step: clock unavailable, rejecting answer: {}", e);
                false
            }
        }
    }

    pub fn verify_at(
        &self,
        private_params: &PrivateChallengeParameters,
        answer: Option<&str>,
        now: i64,
    ) -> bool {
        let expected = private_params.token.as_deref().unwrap_or_default();
        let provided = answer.unwrap_or_default();

        if expected.is_empty() || provided.is_empty() {
            warn!("Verify step: expected token or answer missing");
            return false;
        }

        if !constant_time_eq(expected, provided) {
            warn!("Verify step: answer does not match issued token");
            return false;
        }

        if let Some(expires_at) = private_params.expires_at {
            if now > expires_at {
                warn!("Verify step: challenge expired at {}", expires_at);
                return false;
            }
        }

        // The signed expiry is enforced in every mode; only the MAC re-check is optional
        let token = match MagicToken::decode(provided) {
            Ok(token) => token,
            Err(e) => {
                warn!("Verify step: {}", e);
                return false;
            }
        };
        if token.is_expired(now) {
            warn!("Verify step: token expired at {}", token.expires_at);
            return false;
        }

        if self.config.strict_verification {
            if let Err(e) = token.check(self.config.secret_key(), now) {
                warn!("Verify step: {}", e);
                return false;
            }
        }

        info!("Verify step: answer accepted");
        true
    }
}
