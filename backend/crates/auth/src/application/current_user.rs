//! Current User Use Case
//!
//! Resolves an access token to the user it belongs to.

use std::sync::Arc;

use platform::token::{TokenCodec, TokenPurpose};

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Current user use case
pub struct CurrentUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    codec: Arc<TokenCodec>,
}

impl<U> CurrentUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, codec: Arc<TokenCodec>) -> Self {
        Self { user_repo, codec }
    }

    pub async fn execute(&self, access_token: &str) -> AuthResult<User> {
        let claims = self.codec.verify(access_token, TokenPurpose::Access)?;

        let email = Email::from_db(claims.sub);
        self.user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}
