//! In-process stand-in for the identity provider's session.
//!
//! Drives define -> create -> verify -> define for a single sign-in, holding
//! the private challenge parameters between steps the way the provider
//! would. Useful for local runs and for exercising the whole handshake.

use super::challenge::{ChallengeIssuer, IssuedChallenge};
use super::error::{AuthError, Result};
use super::events::PrivateChallengeParameters;
use super::session::{AuthState, ChallengeAttempt, ChallengeOrchestrator};
use super::verification::ChallengeVerifier;
use crate::modules::config::MagicLinkConfig;
use crate::modules::email::Notifier;

#[derive(Debug)]
pub enum FlowStep {
    /// A link was sent; the client must answer with the token
    Challenge(IssuedChallenge),
    Authenticated,
}

pub struct ChallengeSession<'a> {
    orchestrator: ChallengeOrchestrator,
    issuer: ChallengeIssuer<'a>,
    verifier: ChallengeVerifier<'a>,
    attempt: ChallengeAttempt,
    state: AuthState,
    pending: Option<PrivateChallengeParameters>,
}

impl<'a> ChallengeSession<'a> {
    pub fn new(config: &'a MagicLinkConfig, notifier: &'a dyn Notifier, user_exists: bool) -> Self {
        Self {
            orchestrator: ChallengeOrchestrator::from_config(config),
            issuer: ChallengeIssuer::new(config, notifier),
            verifier: ChallengeVerifier::new(config),
            attempt: ChallengeAttempt::new(user_exists),
            state: AuthState::Start,
            pending: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn attempt(&self) -> &ChallengeAttempt {
        &self.attempt
    }

    /// Run the define step and, if it asks for one, issue a challenge to `email`
    pub fn advance(&mut self, email: Option<&str>) -> Result<FlowStep> {
        let decision = self.orchestrator.decide(&self.attempt);

        match decision.state {
            AuthState::Rejected => {
                self.state = AuthState::Rejected;
                self.pending = None;
                if self.attempt.user_exists {
                    Err(AuthError::RetriesExhausted(self.attempt.failed_attempts()))
                } else {
                    Err(AuthError::UpstreamRejection)
                }
            }
            AuthState::Authenticated => {
                self.state = AuthState::Authenticated;
                self.pending = None;
                Ok(FlowStep::Authenticated)
            }
            AuthState::Start | AuthState::ChallengeIssued => {
                // State only moves once the link is actually out
                let issued = self.issuer.issue(email)?;
                self.pending = Some(issued.private_params.clone());
                self.state = AuthState::ChallengeIssued;
                Ok(FlowStep::Challenge(issued))
            }
        }
    }

    /// Verify `answer` against the outstanding challenge and record the result.
    /// The private parameters are consumed, so an answer is checked at most once.
    pub fn respond(&mut self, answer: &str) -> Result<bool> {
        let private = self.pending.take().ok_or(AuthError::MissingInput("session"))?;

        self.attempt.current_answer = Some(answer.to_string());
        let correct = self.verifier.verify(&private, Some(answer));
        self.attempt.record_result(correct);
        Ok(correct)
    }
}
