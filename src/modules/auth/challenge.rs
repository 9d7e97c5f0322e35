use super::error::{AuthError, Result};
use super::events::{CreateChallengeResponse, PrivateChallengeParameters, PublicChallengeParameters};
use super::tokens;
use crate::modules::config::MagicLinkConfig;
use crate::modules::email::{magic_link_notification, Notifier};
use crate::modules::utils::io::{is_valid_email, mask_email};
use crate::modules::utils::logging::log_auth_event;
use crate::modules::utils::time::format_timestamp;
use crate::CHALLENGE_METADATA;

/// Result of a successful create step
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    pub public_params: PublicChallengeParameters,
    pub private_params: PrivateChallengeParameters,
    pub metadata: String,
    pub magic_link: String,
}

impl From<IssuedChallenge> for CreateChallengeResponse {
    fn from(issued: IssuedChallenge) -> Self {
        Self {
            public_params: issued.public_params,
            private_params: issued.private_params,
            metadata: issued.metadata,
        }
    }
}

/// `{base_url}?token={token}`, or `&token=` when the base already has a query
pub fn build_magic_link(base_url: &str, encoded_token: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}token={}", base_url, separator, encoded_token)
}

/// Mints a token, emails the link and emits the challenge parameters
pub struct ChallengeIssuer<'a> {
    config: &'a MagicLinkConfig,
    notifier: &'a dyn Notifier,
}

impl<'a> ChallengeIssuer<'a> {
    pub fn new(config: &'a MagicLinkConfig, notifier: &'a dyn Notifier) -> Self {
        Self { config, notifier }
    }

    pub fn issue(&self, email: Option<&str>) -> Result<IssuedChallenge> {
        let email = email
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(AuthError::MissingInput("email"))?;

        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail(mask_email(email)));
        }

        let (token, expires_at) =
            tokens::mint(email, self.config.secret_key(), self.config.ttl())?;
        let magic_link = build_magic_link(&self.config.base_url, &token);

        let notification = magic_link_notification(email, &magic_link, self.config.timeout_mins);
        if let Err(e) = self.notifier.deliver(&notification) {
            log_auth_event("create_challenge", email, false, Some(e.as_str()));
            return Err(AuthError::DeliveryFailure(e));
        }

        log_auth_event(
            "create_challenge",
            email,
            true,
            Some(format!("magic link sent, expires {}", format_timestamp(expires_at)).as_str()),
        );

        let public_params = if self.config.legacy_public_token {
            PublicChallengeParameters {
                email: email.to_string(),
                token: Some(token.clone()),
            }
        } else {
            PublicChallengeParameters {
                email: mask_email(email),
                token: None,
            }
        };

        Ok(IssuedChallenge {
            public_params,
            private_params: PrivateChallengeParameters {
                token: Some(token),
                expires_at: Some(expires_at),
            },
            metadata: CHALLENGE_METADATA.to_string(),
            magic_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::tokens::MagicToken;
    use crate::modules::email::Notification;
    use std::cell::RefCell;

    const SECRET: &str = "Zq3v8Lr1Xw6Nt4Hy9Pb2Mc7Kd5Gf0Js1";

    #[derive(Default)]
    struct MockNotifier {
        sent: RefCell<Vec<Notification>>,
        fail: bool,
    }

    impl Notifier for MockNotifier {
        fn deliver(&self, notification: &Notification) -> std::result::Result<(), String> {
            if self.fail {
                return Err("SMTP relay unavailable".to_string());
            }
            self.sent.borrow_mut().push(notification.clone());
            Ok(())
        }
    }

    fn config() -> MagicLinkConfig {
        MagicLinkConfig::new("noreply@example.com", "https://host.example.com", SECRET).unwrap()
    }

    #[test]
    fn test_issue_sends_link_and_keeps_token_private() {
        let config = config();
        let notifier = MockNotifier::default();
        let issued = ChallengeIssuer::new(&config, &notifier)
            .issue(Some("alice@example.com"))
            .unwrap();

        let token = issued.private_params.token.clone().unwrap();
        assert_eq!(
            issued.magic_link,
            format!("https://host.example.com?token={}", token)
        );
        assert_eq!(issued.metadata, "MAGIC_LINK_SENT");

        // Public side only gets the masked address
        assert_eq!(issued.public_params.email, "a***@example.com");
        assert!(issued.public_params.token.is_none());

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "alice@example.com");
        assert!(sent[0].text_body.contains(&issued.magic_link));

        let decoded = MagicToken::decode(&token).unwrap();
        assert_eq!(decoded.email, "alice@example.com");
        assert_eq!(Some(decoded.expires_at), issued.private_params.expires_at);
        assert!(decoded.verify_signature(SECRET.as_bytes()));
    }

    #[test]
    fn test_legacy_public_params_include_token() {
        let config = config().with_legacy_public_token(true);
        let notifier = MockNotifier::default();
        let issued = ChallengeIssuer::new(&config, &notifier)
            .issue(Some("alice@example.com"))
            .unwrap();

        assert_eq!(issued.public_params.email, "alice@example.com");
        assert_eq!(issued.public_params.token, issued.private_params.token);
    }

    #[test]
    fn test_missing_email_fails_fast() {
        let config = config();
        let notifier = MockNotifier::default();
        let issuer = ChallengeIssuer::new(&config, &notifier);

        assert!(matches!(issuer.issue(None), Err(AuthError::MissingInput("email"))));
        assert!(matches!(issuer.issue(Some("  ")), Err(AuthError::MissingInput("email"))));
        assert!(matches!(
            issuer.issue(Some("not-an-email")),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(notifier.sent.borrow().is_empty());
    }

    #[test]
    fn test_delivery_failure_propagates() {
        let config = config();
        let notifier = MockNotifier {
            fail: true,
            ..Default::default()
        };
        let result = ChallengeIssuer::new(&config, &notifier).issue(Some("alice@example.com"));
        match result {
            Err(AuthError::DeliveryFailure(msg)) => assert!(msg.contains("unavailable")),
            other => panic!("expected delivery failure, got {:?}", other),
        }
    }

    #[test]
    fn test_magic_link_separator() {
        assert_eq!(build_magic_link("https://h.io", "t"), "https://h.io?token=t");
        assert_eq!(
            build_magic_link("https://h.io/login?lang=en", "t"),
            "https://h.io/login?lang=en&token=t"
        );
    }
}
