use base64::{engine::general_purpose::URL_SAFE as base64, Engine as _};
use chrono::Duration;
use hmac::Mac;
use uuid::Uuid;

use super::error::{AuthError, Result};
use crate::modules::utils::time::current_timestamp;
use crate::HmacSha256;

const FIELD_DELIMITER: char = '|';

/// Signed magic-link credential.
///
/// The transport form is `urlsafe_b64(email|nonce|expires_at|hex_signature)`,
/// where the signature is HMAC-SHA256 over `email|nonce|expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicToken {
    pub email: String,
    pub nonce: String,
    pub expires_at: i64,
    pub signature: String,
}

impl MagicToken {
    fn signed_fields(email: &str, nonce: &str, expires_at: i64) -> String {
        format!(
            "{}{d}{}{d}{}",
            email,
            nonce,
            expires_at,
            d = FIELD_DELIMITER
        )
    }

    /// The plaintext portion covered by the signature
    pub fn payload(&self) -> String {
        Self::signed_fields(&self.email, &self.nonce, self.expires_at)
    }

    /// Encode into the URL-safe form embedded in the magic link
    pub fn encode(&self) -> String {
        let raw = format!("{}{}{}", self.payload(), FIELD_DELIMITER, self.signature);
        base64.encode(raw.as_bytes())
    }

    /// Parse the transport form back into its fields.
    ///
    /// Fields are split from the right, so the email keeps any delimiter it
    /// happens to contain and the recomputed payload matches what was signed.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = base64
            .decode(encoded.trim().as_bytes())
            .map_err(|e| AuthError::Malformed(format!("Invalid base64: {}", e)))?;
        let raw = String::from_utf8(bytes)
            .map_err(|_| AuthError::Malformed("Token is not valid UTF-8".to_string()))?;

        let mut parts = raw.rsplitn(4, FIELD_DELIMITER);
        let (signature, expires_at, nonce, email) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(s), Some(x), Some(n), Some(e)) if !e.is_empty() && !n.is_empty() => {
                    (s, x, n, e)
                }
                _ => return Err(AuthError::Malformed("Expected four fields".to_string())),
            };

        let expires_at = expires_at
            .parse::<i64>()
            .map_err(|e| AuthError::Malformed(format!("Invalid expiry: {}", e)))?;

        Ok(Self {
            email: email.to_string(),
            nonce: nonce.to_string(),
            expires_at,
            signature: signature.to_string(),
        })
    }

    /// Recompute the MAC and compare it in constant time
    pub fn verify_signature(&self, secret_key: &[u8]) -> bool {
        let Ok(expected) = hex::decode(&self.signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret_key) else {
            return false;
        };
        mac.update(self.payload().as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Signature and expiry together
    pub fn check(&self, secret_key: &[u8], now: i64) -> Result<()> {
        if !self.verify_signature(secret_key) || self.is_expired(now) {
            return Err(AuthError::SignatureOrExpiryInvalid);
        }
        Ok(())
    }
}

/// Hex HMAC-SHA256 of `payload` under `secret_key`
pub fn sign(secret_key: &[u8], payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret_key)
        .map_err(|e| AuthError::Config(format!("Invalid signing key: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Mint a fresh token for `email`, returning its encoded form and expiry.
pub fn mint(email: &str, secret_key: &[u8], ttl: Duration) -> Result<(String, i64)> {
    let now = current_timestamp().map_err(|e| AuthError::Clock(e.to_string()))?;
    let token = mint_at(email, secret_key, ttl, now)?;
    Ok((token.encode(), token.expires_at))
}

/// Same as [`mint`] with an explicit clock reading.
///
/// A zero or negative `ttl` still yields a well-formed token that is already
/// expired.
pub fn mint_at(email: &str, secret_key: &[u8], ttl: Duration, now: i64) -> Result<MagicToken> {
    let nonce = Uuid::new_v4().to_string();
    let expires_at = now.saturating_add(ttl.num_seconds());
    let signature = sign(
        secret_key,
        &MagicToken::signed_fields(email, &nonce, expires_at),
    )?;

    Ok(MagicToken {
        email: email.to_string(),
        nonce,
        expires_at,
        signature,
    })
}
