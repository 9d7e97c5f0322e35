pub mod challenge;
pub mod error;
pub mod events;
pub mod flow;
pub mod session;
pub mod tokens;
pub mod verification;

// Re-export the main types and functions
pub use challenge::{build_magic_link, ChallengeIssuer, IssuedChallenge};
pub use error::{AuthError, Result};
pub use events::{
    CreateChallengeRequest, CreateChallengeResponse, DefineChallengeRequest,
    DefineChallengeResponse, PrivateChallengeParameters, PublicChallengeParameters,
    VerifyChallengeRequest, VerifyChallengeResponse,
};
pub use flow::{ChallengeSession, FlowStep};
pub use session::{AuthState, ChallengeAttempt, ChallengeDecision, ChallengeOrchestrator};
pub use tokens::{mint, MagicToken};
pub use verification::{constant_time_eq, ChallengeVerifier};
