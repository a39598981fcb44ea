//! Refresh Session Use Case
//!
//! Rotates a refresh token: the presented token must exactly match the
//! stored one, and a successful rotation replaces it. Presenting an
//! older (already rotated) token is treated as reuse and revokes the
//! stored token entirely.

use std::sync::Arc;

use platform::token::{TokenCodec, TokenPurpose};

use crate::application::config::AuthConfig;
use crate::application::session::{issue_pair, TokenPair};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Refresh session use case
pub struct RefreshSessionUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U> RefreshSessionUseCase<U>
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

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.codec.verify(refresh_token, TokenPurpose::Refresh)?;

        let email = Email::from_db(claims.sub);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.refresh_token_matches(refresh_token) {
            // Reuse of a rotated or revoked token. Clear the stored one
            // so the holder of the current token is logged out too.
            self.user_repo
                .set_refresh_token(&user.user_id, None)
                .await?;
            tracing::warn!(user_id = %user.user_id, "Refresh token reuse detected");
            return Err(AuthError::RefreshTokenRevoked);
        }

        let pair = issue_pair(&self.codec, &self.config, user.email.as_str())?;
        let rotated = self
            .user_repo
            .rotate_refresh_token(&user.user_id, refresh_token, &pair.refresh_token)
            .await?;
        if !rotated {
            // A concurrent rotation won between our read and the swap.
            // The stored token is already the winner's, so leave it.
            tracing::warn!(user_id = %user.user_id, "Refresh token rotated concurrently");
            return Err(AuthError::RefreshTokenRevoked);
        }

        tracing::debug!(user_id = %user.user_id, "Session refreshed");

        Ok(pair)
    }
}
