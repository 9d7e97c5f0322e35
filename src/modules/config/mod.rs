pub mod settings;

pub use settings::{validate_secret, MagicLinkConfig};
