use serde::{Deserialize, Serialize};

/// Structure to hold SMTP credentials with metadata
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpCredentials {
    // The account used for SMTP authentication
    pub username: String,
    // The password or app-specific password for SMTP
    pub password: String,
    // SMTP server hostname (e.g., smtp.gmail.com)
    pub host: String,
    // SMTP server port (typically 587 for TLS)
    pub port: u16,
    // When these credentials were last updated
    pub last_updated: i64,
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("last_updated", &self.last_updated)
            .finish_non_exhaustive()
    }
}
