pub mod keyring;

pub use self::keyring::{keyring_entry, SecretStore, SecureSigningKey};
