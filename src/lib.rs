// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{auth, config, email, security, utils};

// Re-export commonly used types
pub use modules::auth::challenge::{ChallengeIssuer, IssuedChallenge};
pub use modules::auth::error::AuthError;
pub use modules::auth::session::{AuthState, ChallengeAttempt, ChallengeDecision, ChallengeOrchestrator};
pub use modules::auth::tokens::MagicToken;
pub use modules::auth::verification::ChallengeVerifier;
pub use modules::config::MagicLinkConfig;
pub use modules::email::{Notification, Notifier};

// Constants
pub const CHALLENGE_NAME: &str = "CUSTOM_CHALLENGE";
pub const CHALLENGE_METADATA: &str = "MAGIC_LINK_SENT";
pub const DEFAULT_TIMEOUT_MINS: u32 = 15;
pub const MIN_SECRET_KEY_LEN: usize = 32;
pub const KEYRING_SERVICE: &str = "magic-link-auth";
pub const LOG_FILE: &str = "magic-link.log";

// Type aliases
pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;
