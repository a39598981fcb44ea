//! SMTP Confirmation Mailer
//!
//! Sends confirmation emails over SMTP with lettre. The transport is
//! blocking, so sends run on the blocking thread pool.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::Arc;

use crate::domain::repository::ConfirmationMailer;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// SMTP mailer configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    /// From header, e.g. `Contacts <no-reply@example.com>`
    pub from: String,
}

/// SMTP-backed confirmation mailer
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<SmtpTransport>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> AuthResult<Self> {
        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| AuthError::Internal(format!("SMTP transport setup failed: {}", e)))?
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self {
            transport: Arc::new(transport),
            from: config.from,
        })
    }

    fn build_message(&self, email: &Email, name: &str, link: &str) -> AuthResult<Message> {
        let body = format!(
            "Hi {},\n\
            \n\
            Please confirm your email address by following this link:\n\
            \n\
            {}\n\
            \n\
            The link expires in 7 days. If you did not create an account,\n\
            you can ignore this message.",
            name, link
        );

        Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AuthError::Internal(format!("Invalid from address: {}", e)))?,
            )
            .to(email
                .as_str()
                .parse()
                .map_err(|e| AuthError::Internal(format!("Invalid to address: {}", e)))?)
            .subject("Confirm your email address")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AuthError::Internal(format!("Failed to build email: {}", e)))
    }
}

impl ConfirmationMailer for SmtpMailer {
    async fn send_confirmation(&self, email: &Email, name: &str, link: &str) -> AuthResult<()> {
        let message = self.build_message(email, name, link)?;
        let transport = Arc::clone(&self.transport);

        // lettre's SmtpTransport is synchronous
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AuthError::Internal(format!("Mail task panicked: {}", e)))?
            .map_err(|e| AuthError::Internal(format!("SMTP send failed: {}", e)))?;

        tracing::debug!(email = %email, "Confirmation email sent");

        Ok(())
    }
}
