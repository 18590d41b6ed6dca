use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpSettings;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid mail address or message: {0}")]
    InvalidMessage(String),

    #[error("Mail dispatch failed: {0}")]
    Transport(String),
}

/// An outbound mail message
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Seam for outbound mail delivery, so tests can capture messages instead of
/// talking to an SMTP relay.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// SMTP-backed mail sender
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Build an SMTP mailer from settings, using STARTTLS on the submission
    /// port.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from_address: settings.from_address.clone(),
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| MailError::InvalidMessage(format!("from address: {}", e)))?,
            )
            .to(mail
                .to
                .parse()
                .map_err(|e| MailError::InvalidMessage(format!("to address: {}", e)))?)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html)
            .map_err(|e| MailError::InvalidMessage(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// HTML body for the one-time login code email
pub fn otp_email_html(code: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Your one-time login code</title>
</head>
<body>
    <div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
        <h1 style="color: #333;">Your one-time login code</h1>
        <p>Hello,</p>
        <p>Your one-time login code is:</p>
        <h2 style="color: #4CAF50; font-size: 24px;">{code}</h2>
        <p>This code expires in {ttl_minutes} minutes. Do not share it with anyone.</p>
        <p>If you did not request this code, please ignore this email.</p>
        <p>Thank you!</p>
    </div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_email_contains_code_and_ttl() {
        let html = otp_email_html("042137", 10);
        assert!(html.contains("042137"));
        assert!(html.contains("10 minutes"));
    }
}
