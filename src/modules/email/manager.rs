use std::io;

use keyring::Entry;

use super::smtp::SmtpCredentials;
use crate::modules::security::keyring::{keyring_entry, SecretStore};
use crate::modules::utils::time::current_timestamp;

const SMTP_ENTRY: &str = "smtp-credentials";

/// Structure to manage SMTP credentials kept in the system keyring
pub struct SecureEmailManager<S = Entry> {
    store: S,
}

impl SecureEmailManager<Entry> {
    pub fn new() -> Result<Self, String> {
        keyring_entry(SMTP_ENTRY)
            .map(Self::with_store)
            .map_err(|e| format!("Failed to open keyring entry: {}", e))
    }
}

impl<S: SecretStore> SecureEmailManager<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    // Store new SMTP credentials
    pub fn store_credentials(
        &self,
        username: &str,
        password: &str,
        host: &str,
        port: u16,
    ) -> Result<(), String> {
        let credentials = SmtpCredentials {
            username: username.to_string(),
            password: password.to_string(),
            host: host.to_string(),
            port,
            last_updated: current_timestamp().map_err(|e| format!("Clock error: {}", e))?,
        };

        let creds_json = serde_json::to_string(&credentials)
            .map_err(|e| format!("Failed to serialize credentials: {}", e))?;

        self.store
            .set_secret(&creds_json)
            .map_err(|e| format!("Failed to store credentials: {}", e))
    }

    // Retrieve stored SMTP credentials
    pub fn get_credentials(&self) -> Result<SmtpCredentials, String> {
        let creds_json = self
            .store
            .get_secret()
            .map_err(|e: io::Error| format!("Failed to retrieve credentials: {}", e))?;

        serde_json::from_str(&creds_json).map_err(|e| format!("Failed to parse credentials: {}", e))
    }

    pub fn delete_credentials(&self) -> Result<(), String> {
        self.store
            .delete_secret()
            .map_err(|e| format!("Failed to delete credentials: {}", e))
    }
}
