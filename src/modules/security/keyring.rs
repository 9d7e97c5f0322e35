use std::io;

use keyring::Entry;
use rand::RngCore;

use crate::KEYRING_SERVICE;

const SIGNING_KEY_ENTRY: &str = "signing-key";
const SIGNING_KEY_LEN: usize = 32;

/// Minimal view of a secure string slot, so callers can be tested without the
/// platform keyring
pub trait SecretStore {
    fn set_secret(&self, value: &str) -> io::Result<()>;
    fn get_secret(&self) -> io::Result<String>;
    fn delete_secret(&self) -> io::Result<()>;
}

fn keyring_error(e: keyring::Error) -> io::Error {
    match e {
        keyring::Error::NoEntry => io::Error::new(io::ErrorKind::NotFound, e.to_string()),
        other => io::Error::new(io::ErrorKind::Other, other.to_string()),
    }
}

impl SecretStore for Entry {
    fn set_secret(&self, value: &str) -> io::Result<()> {
        self.set_password(value).map_err(keyring_error)
    }

    fn get_secret(&self) -> io::Result<String> {
        self.get_password().map_err(keyring_error)
    }

    fn delete_secret(&self) -> io::Result<()> {
        self.delete_password().map_err(keyring_error)
    }
}

/// Open the keyring slot `entry` under this application's service name
pub fn keyring_entry(entry: &str) -> io::Result<Entry> {
    Entry::new(KEYRING_SERVICE, entry).map_err(keyring_error)
}

/// HMAC signing key held in the system's secure storage
pub struct SecureSigningKey<S = Entry> {
    store: S,
}

impl SecureSigningKey<Entry> {
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_store(keyring_entry(SIGNING_KEY_ENTRY)?))
    }
}

impl<S: SecretStore> SecureSigningKey<S> {
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    /// Store a key, hex-encoded so it fits in a string slot
    pub fn store_key(&self, key: &[u8]) -> io::Result<()> {
        self.store.set_secret(&hex::encode(key))
    }

    pub fn get_key(&self) -> io::Result<Vec<u8>> {
        let encoded = self.store.get_secret()?;
        hex::decode(encoded.trim())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Generate and store a random key unless one exists.
    /// Returns true when a new key was written.
    pub fn initialize_if_needed(&self) -> io::Result<bool> {
        if self.get_key().is_ok() {
            return Ok(false);
        }

        let mut new_key = vec![0u8; SIGNING_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut new_key);
        self.store_key(&new_key)?;

        log::info!("New signing key generated and stored in system keyring");
        Ok(true)
    }

    pub fn delete_key(&self) -> io::Result<()> {
        self.store.delete_secret()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    // In-memory stand-in for the platform keyring
    #[derive(Default)]
    pub(crate) struct MockKeyring {
        data: RefCell<Option<String>>,
    }

    impl SecretStore for MockKeyring {
        fn set_secret(&self, value: &str) -> io::Result<()> {
            *self.data.borrow_mut() = Some(value.to_string());
            Ok(())
        }

        fn get_secret(&self) -> io::Result<String> {
            self.data
                .borrow()
                .clone()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No secret set"))
        }

        fn delete_secret(&self) -> io::Result<()> {
            *self.data.borrow_mut() = None;
            Ok(())
        }
    }

    #[test]
    fn test_secure_signing_key() {
        let signing_key = SecureSigningKey::with_store(MockKeyring::default());

        // Initially, there should be no key
        assert!(signing_key.get_key().is_err());

        // Initialize should create a key
        assert!(signing_key.initialize_if_needed().unwrap());
        let key = signing_key.get_key().unwrap();
        assert_eq!(key.len(), 32);
        assert!(crate::modules::config::validate_secret(&key).is_ok());

        // A second initialize keeps the existing key
        assert!(!signing_key.initialize_if_needed().unwrap());
        assert_eq!(signing_key.get_key().unwrap(), key);

        // Store a new key
        let new_key: Vec<u8> = (0..32).collect();
        signing_key.store_key(&new_key).unwrap();
        assert_eq!(signing_key.get_key().unwrap(), new_key);

        signing_key.delete_key().unwrap();
        assert!(signing_key.get_key().is_err());
    }

    #[test]
    fn test_corrupt_key_is_reported() {
        let store = MockKeyring::default();
        store.set_secret("not hex").unwrap();
        let signing_key = SecureSigningKey::with_store(store);
        assert_eq!(
            signing_key.get_key().unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
    }
}
