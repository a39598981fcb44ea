//! Request Confirmation Email Use Case
//!
//! Re-sends the email-confirmation message for an unconfirmed account.

use std::sync::Arc;

use platform::token::{TokenCodec, TokenPurpose};

use crate::application::config::AuthConfig;
use crate::domain::repository::{ConfirmationMailer, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Request email outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestEmailOutcome {
    /// A fresh confirmation email is on its way
    Sent,
    /// The account was already confirmed, nothing to send
    AlreadyConfirmed,
}

/// Request confirmation email use case
pub struct RequestEmailUseCase<U, M>
where
    U: UserRepository,
    M: ConfirmationMailer,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, M> RequestEmailUseCase<U, M>
where
    U: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        mailer: Arc<M>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            mailer,
            codec,
            config,
        }
    }

    pub async fn execute(&self, email: String) -> AuthResult<RequestEmailOutcome> {
        let email = Email::new(email).map_err(|_| AuthError::UserNotFound)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.confirmed {
            return Ok(RequestEmailOutcome::AlreadyConfirmed);
        }

        let token = self.codec.issue(
            user.email.as_str(),
            TokenPurpose::EmailVerification,
            self.config.verification_ttl(),
        )?;
        let link = self.config.confirmation_link(&token);

        let mailer = Arc::clone(&self.mailer);
        let name = user.name.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_confirmation(&email, &name, &link).await {
                tracing::warn!(email = %email, error = %e, "Confirmation email failed");
            }
        });

        tracing::info!(user_id = %user.user_id, "Confirmation email requested");

        Ok(RequestEmailOutcome::Sent)
    }
}
