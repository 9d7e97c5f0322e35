use super::manager::SecureEmailManager;
use super::notifier::{Notification, Notifier, SmtpNotifier};
use crate::modules::auth::challenge::build_magic_link;
use crate::modules::config::MagicLinkConfig;
use crate::modules::utils::io::{is_valid_email, read_password};

/// Store SMTP credentials in the keyring, prompting for the password
pub fn setup_smtp_credentials(host: &str, port: u16, username: &str) -> Result<(), String> {
    let host = host.trim();
    if host.is_empty() || !host.contains('.') || host.contains(' ') {
        return Err("Invalid SMTP server format. Please enter a valid domain.".to_string());
    }
    if port == 0 {
        return Err("Invalid port number. Please enter a number between 1 and 65535.".to_string());
    }
    if username.trim().is_empty() {
        return Err("SMTP username cannot be empty.".to_string());
    }

    println!("Enter SMTP password or app-specific password:");
    let password = read_password().map_err(|e| format!("Failed to read password: {}", e))?;
    if password.trim().is_empty() {
        return Err("Password cannot be empty.".to_string());
    }

    SecureEmailManager::new()?.store_credentials(username.trim(), &password, host, port)?;

    println!("SMTP configuration saved securely.");
    println!("Run 'test-email' to verify your configuration.");
    Ok(())
}

/// Send a sample message through the configured SMTP account
pub fn test_email_configuration(config: &MagicLinkConfig, recipient: &str) -> Result<(), String> {
    if !is_valid_email(recipient) {
        return Err(format!("Invalid recipient address: {}", recipient));
    }

    let notifier = SmtpNotifier::from_keyring(&config.sender_address)?;
    let sample_link = build_magic_link(&config.base_url, "test-token");

    let notification = Notification {
        recipient: recipient.to_string(),
        subject: "Magic link - email configuration test".to_string(),
        html_body: format!(
            "<html><body><p>This is a test email. Links will look like:</p><p>{}</p></body></html>",
            sample_link
        ),
        text_body: format!(
            "This is a test email. Links will look like: {}",
            sample_link
        ),
    };

    notifier.deliver(&notification)?;
    println!("Test email sent successfully to: {}", recipient);
    Ok(())
}
