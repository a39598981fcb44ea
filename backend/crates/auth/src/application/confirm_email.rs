//! Confirm Email Use Case
//!
//! Consumes an email-verification token and marks the account
//! confirmed. Idempotent: confirming twice reports `AlreadyConfirmed`.

use std::sync::Arc;

use platform::token::{TokenCodec, TokenPurpose};

use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Confirm email outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The account transitioned to confirmed
    Confirmed,
    /// The account was confirmed before this call
    AlreadyConfirmed,
}

/// Confirm email use case
pub struct ConfirmEmailUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    codec: Arc<TokenCodec>,
}

impl<U> ConfirmEmailUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, codec: Arc<TokenCodec>) -> Self {
        Self { user_repo, codec }
    }

    /// Any token problem, including an unknown subject, collapses into
    /// a single verification error so the link reveals nothing about
    /// which accounts exist.
    pub async fn execute(&self, token: &str) -> AuthResult<ConfirmOutcome> {
        let claims = self
            .codec
            .verify(token, TokenPurpose::EmailVerification)
            .map_err(|_| AuthError::VerificationError)?;

        let email = Email::from_db(claims.sub);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::VerificationError)?;

        if user.confirmed {
            return Ok(ConfirmOutcome::AlreadyConfirmed);
        }

        self.user_repo.set_confirmed(&user.user_id).await?;

        tracing::info!(user_id = %user.user_id, "Email confirmed");

        Ok(ConfirmOutcome::Confirmed)
    }
}
