//! Log Out Use Case
//!
//! Clears the stored refresh token. Idempotent: logging out with no
//! active session succeeds. Outstanding access tokens keep working
//! until they expire.

use std::sync::Arc;

use platform::token::{TokenCodec, TokenPurpose};

use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Log out use case
pub struct LogOutUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    codec: Arc<TokenCodec>,
}

impl<U> LogOutUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, codec: Arc<TokenCodec>) -> Self {
        Self { user_repo, codec }
    }

    pub async fn execute(&self, access_token: &str) -> AuthResult<()> {
        let claims = self.codec.verify(access_token, TokenPurpose::Access)?;

        let email = Email::from_db(claims.sub);
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.user_repo
            .set_refresh_token(&user.user_id, None)
            .await?;

        tracing::info!(user_id = %user.user_id, "User logged out");

        Ok(())
    }
}
