use log::debug;

use super::events::{DefineChallengeRequest, DefineChallengeResponse};
use crate::modules::config::MagicLinkConfig;
use crate::CHALLENGE_NAME;

/// Where an authentication attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Start,
    ChallengeIssued,
    Authenticated,
    Rejected,
}

/// One step of the handshake as seen by the provider's session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeAttempt {
    pub user_exists: bool,
    /// `challengeResult` of each history entry, chronological and append-only
    pub prior_results: Vec<bool>,
    pub current_answer: Option<String>,
}

impl ChallengeAttempt {
    pub fn new(user_exists: bool) -> Self {
        Self {
            user_exists,
            prior_results: Vec::new(),
            current_answer: None,
        }
    }

    /// Append the outcome of the latest verification
    pub fn record_result(&mut self, correct: bool) {
        self.prior_results.push(correct);
    }

    pub fn last_result(&self) -> Option<bool> {
        self.prior_results.last().copied()
    }

    pub fn failed_attempts(&self) -> usize {
        self.prior_results.iter().filter(|r| !**r).count()
    }
}

impl From<DefineChallengeRequest> for ChallengeAttempt {
    fn from(request: DefineChallengeRequest) -> Self {
        Self {
            user_exists: request.user_exists,
            prior_results: request
                .history
                .into_iter()
                .map(|entry| entry.challenge_result)
                .collect(),
            current_answer: None,
        }
    }
}

/// Outcome of the define step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDecision {
    pub state: AuthState,
    pub issue_tokens: bool,
    pub fail_authentication: bool,
    pub challenge_name: Option<&'static str>,
}

impl ChallengeDecision {
    fn rejected() -> Self {
        Self {
            state: AuthState::Rejected,
            issue_tokens: false,
            fail_authentication: true,
            challenge_name: None,
        }
    }

    fn authenticated() -> Self {
        Self {
            state: AuthState::Authenticated,
            issue_tokens: true,
            fail_authentication: false,
            challenge_name: None,
        }
    }

    fn challenge() -> Self {
        Self {
            state: AuthState::ChallengeIssued,
            issue_tokens: false,
            fail_authentication: false,
            challenge_name: Some(CHALLENGE_NAME),
        }
    }
}

impl From<ChallengeDecision> for DefineChallengeResponse {
    fn from(decision: ChallengeDecision) -> Self {
        Self {
            issue_tokens: decision.issue_tokens,
            fail_authentication: decision.fail_authentication,
            challenge_name: decision.challenge_name.map(str::to_string),
        }
    }
}

/// Decides what happens next given the attempt history.
///
/// Only the most recent result counts towards success. Earlier failures
/// only matter when `max_attempts` is set, in which case reaching that many
/// failed answers rejects the attempt.
#[derive(Debug, Clone, Default)]
pub struct ChallengeOrchestrator {
    max_attempts: Option<u32>,
}

impl ChallengeOrchestrator {
    pub fn new(max_attempts: Option<u32>) -> Self {
        Self { max_attempts }
    }

    pub fn from_config(config: &MagicLinkConfig) -> Self {
        Self::new(config.max_attempts)
    }

    pub fn decide(&self, attempt: &ChallengeAttempt) -> ChallengeDecision {
        let decision = if !attempt.user_exists {
            ChallengeDecision::rejected()
        } else if attempt.last_result() == Some(true) {
            ChallengeDecision::authenticated()
        } else if self.retries_exhausted(attempt) {
            ChallengeDecision::rejected()
        } else {
            ChallengeDecision::challenge()
        };

        debug!(
            "Define step: history_len={}, state={:?}",
            attempt.prior_results.len(),
            decision.state
        );
        decision
    }

    fn retries_exhausted(&self, attempt: &ChallengeAttempt) -> bool {
        match self.max_attempts {
            Some(max) => attempt.failed_attempts() >= max as usize,
            None => false,
        }
    }
}
