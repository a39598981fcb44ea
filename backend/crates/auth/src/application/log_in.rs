//! Log In Use Case
//!
//! Verifies credentials and issues an access/refresh token pair.

use std::sync::Arc;

use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::application::session::{issue_pair, TokenPair};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Log in input
pub struct LogInInput {
    pub email: String,
    pub password: String,
}

/// Log in use case
pub struct LogInUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U> LogInUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            codec,
            config,
        }
    }

    /// Checks run in a fixed order: account exists, account confirmed,
    /// password matches. Each failure maps to a distinct error.
    pub async fn execute(&self, input: LogInInput) -> AuthResult<TokenPair> {
        let email = Email::new(input.email).map_err(|_| AuthError::UserNotFound)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.confirmed {
            return Err(AuthError::AccountNotConfirmed);
        }

        let raw_password =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;
        if !user.password_hash.verify(&raw_password, self.config.pepper()) {
            tracing::warn!(email = %user.email, "Password verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        // Issue the pair, then store the refresh token so the next
        // refresh can check it against the presented one.
        let pair = issue_pair(&self.codec, &self.config, user.email.as_str())?;
        self.user_repo
            .set_refresh_token(&user.user_id, Some(&pair.refresh_token))
            .await?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(pair)
    }
}
