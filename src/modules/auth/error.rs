use thiserror::Error;

/// Failures raised while running a challenge step
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("failed to deliver magic link: {0}")]
    DeliveryFailure(String),

    #[error("token signature or expiry is invalid")]
    SignatureOrExpiryInvalid,

    #[error("user not found")]
    UpstreamRejection,

    #[error("too many failed answers ({0})")]
    RetriesExhausted(usize),

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("system clock error: {0}")]
    Clock(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
