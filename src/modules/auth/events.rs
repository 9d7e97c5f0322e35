//! Wire shapes exchanged with the identity provider's custom-challenge triggers.

use serde::{Deserialize, Serialize};

/// One entry of the provider's session history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResultEntry {
    pub challenge_result: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineChallengeRequest {
    pub user_exists: bool,
    #[serde(default)]
    pub history: Vec<ChallengeResultEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DefineChallengeResponse {
    pub issue_tokens: bool,
    pub fail_authentication: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Parameters relayed to the client over an untrusted channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicChallengeParameters {
    pub email: String,
    // Only populated in legacy mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Parameters the provider keeps server-side and hands back to the verifier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrivateChallengeParameters {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "expiration_time")]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeResponse {
    pub public_params: PublicChallengeParameters,
    pub private_params: PrivateChallengeParameters,
    pub metadata: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyChallengeRequest {
    #[serde(default)]
    pub private_params: PrivateChallengeParameters,
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyChallengeResponse {
    pub answer_correct: bool,
}
