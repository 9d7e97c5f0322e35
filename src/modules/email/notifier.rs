use log::info;

use super::manager::SecureEmailManager;
use super::smtp::SmtpCredentials;
use super::templates::send_email;
use crate::modules::utils::io::mask_email;

/// A message ready for the delivery channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Outbound delivery channel for magic links.
///
/// Delivery is synchronous; an `Err` means the message was not sent.
pub trait Notifier {
    fn deliver(&self, notification: &Notification) -> Result<(), String>;
}

/// Delivers over SMTP using credentials from the system keyring
pub struct SmtpNotifier {
    sender: String,
    credentials: SmtpCredentials,
}

impl SmtpNotifier {
    pub fn new(sender: impl Into<String>, credentials: SmtpCredentials) -> Self {
        Self {
            sender: sender.into(),
            credentials,
        }
    }

    pub fn from_keyring(sender: &str) -> Result<Self, String> {
        let credentials = SecureEmailManager::new()?.get_credentials()?;
        Ok(Self::new(sender, credentials))
    }
}

impl Notifier for SmtpNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), String> {
        send_email(&self.sender, &self.credentials, notification)?;
        info!(
            "Email sent to {} via {}",
            mask_email(&notification.recipient),
            self.credentials.host
        );
        Ok(())
    }
}

/// Writes the message to stderr instead of sending it
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), String> {
        info!(
            "Dry run: not sending email to {}",
            mask_email(&notification.recipient)
        );
        eprintln!(
            "To: {}\nSubject: {}\n\n{}",
            notification.recipient, notification.subject, notification.text_body
        );
        Ok(())
    }
}
