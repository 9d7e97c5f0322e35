use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::PoolConfig;
use lettre::{Message, SmtpTransport, Transport};

use super::notifier::Notification;
use super::smtp::SmtpCredentials;
use crate::modules::utils::time::format_duration;

pub const MAGIC_LINK_SUBJECT: &str = "Your one-time sign-in link";

/// Compose the sign-in message carrying `magic_link`
pub fn magic_link_notification(recipient: &str, magic_link: &str, timeout_mins: u32) -> Notification {
    let validity = format_duration(u64::from(timeout_mins) * 60);

    let html_body = format!(
        "<html>\n\
        <body>\n\
        <p>Your one-time sign-in link (valid for {validity}):</p>\n\
        <a href=\"{link}\">{link}</a>\n\
        <p>If you did not request this link, you can ignore this email.</p>\n\
        </body>\n\
        </html>\n",
        validity = validity,
        link = magic_link
    );

    let text_body = format!(
        "Your one-time sign-in link (valid for {}): {}\n\n\
        If you did not request this link, you can ignore this email.",
        validity, magic_link
    );

    Notification {
        recipient: recipient.to_string(),
        subject: MAGIC_LINK_SUBJECT.to_string(),
        html_body,
        text_body,
    }
}

/// Send a notification over SMTP as a plain/HTML alternative message
pub fn send_email(
    sender: &str,
    creds: &SmtpCredentials,
    notification: &Notification,
) -> Result<(), String> {
    let email = Message::builder()
        .from(
            sender
                .parse()
                .map_err(|e| format!("Invalid from address: {}", e))?,
        )
        .to(notification
            .recipient
            .parse()
            .map_err(|e| format!("Invalid to address: {}", e))?)
        .subject(notification.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            notification.text_body.clone(),
            notification.html_body.clone(),
        ))
        .map_err(|e| format!("Failed to create email: {}", e))?;

    let tls_parameters = TlsParameters::builder(creds.host.clone())
        .build()
        .map_err(|e| format!("Failed to build TLS parameters: {}", e))?;

    let mailer = SmtpTransport::relay(&creds.host)
        .map_err(|e| format!("Failed to create SMTP transport: {}", e))?
        .credentials(Credentials::new(
            creds.username.clone(),
            creds.password.clone(),
        ))
        .port(creds.port)
        .tls(Tls::Required(tls_parameters))
        .pool_config(PoolConfig::new().max_size(1))
        .timeout(Some(std::time::Duration::from_secs(10)))
        .build();

    mailer
        .send(&email)
        .map(|_| ())
        .map_err(|e| format!("Failed to send email: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_link_notification() {
        let link = "https://app.example.com/login?token=abc123==";
        let notification = magic_link_notification("a@b.com", link, 15);

        assert_eq!(notification.recipient, "a@b.com");
        assert_eq!(notification.subject, "Your one-time sign-in link");
        assert!(notification
            .text_body
            .starts_with("Your one-time sign-in link (valid for 15 minutes): "));
        assert!(notification.text_body.contains(link));
        assert!(notification
            .html_body
            .contains(&format!("<a href=\"{}\">{}</a>", link, link)));
    }

    #[test]
    fn test_validity_window_wording() {
        let notification = magic_link_notification("a@b.com", "https://x.io?token=t", 60);
        assert!(notification.text_body.contains("valid for 1 hour"));
    }
}
