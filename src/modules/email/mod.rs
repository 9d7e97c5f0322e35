pub mod manager;
pub mod notifier;
mod setup;
mod smtp;
mod templates;

pub use manager::SecureEmailManager;
pub use notifier::{ConsoleNotifier, Notification, Notifier, SmtpNotifier};
pub use setup::{setup_smtp_credentials, test_email_configuration};
pub use smtp::SmtpCredentials;
pub use templates::{magic_link_notification, send_email, MAGIC_LINK_SUBJECT};
