//! Sign Up Use Case
//!
//! Creates a new, unconfirmed user account and sends the
//! email-confirmation message in the background.

use std::sync::Arc;

use platform::gravatar::gravatar_url;
use platform::token::{TokenCodec, TokenPurpose};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::{ConfirmationMailer, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<U, M>
where
    U: UserRepository,
    M: ConfirmationMailer,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, M> SignUpUseCase<U, M>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<User> {
        // Validate email
        let email = Email::new(input.email)?;

        // Reject duplicate accounts
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        // Validate and hash password
        let raw_password = RawPassword::new(input.password)?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        // Create unconfirmed user with a Gravatar avatar
        let avatar = gravatar_url(email.as_str());
        let user = User::new(input.name, email, password_hash, Some(avatar));

        self.user_repo.create(&user).await?;

        // Confirmation email is fire-and-forget: signup succeeds even
        // if delivery fails, and the user can re-request it later.
        let token = self.codec.issue(
            user.email.as_str(),
            TokenPurpose::EmailVerification,
            self.config.verification_ttl(),
        )?;
        let link = self.config.confirmation_link(&token);
        self.send_in_background(user.email.clone(), user.name.clone(), link);

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "User signed up"
        );

        Ok(user)
    }

    fn send_in_background(&self, email: Email, name: String, link: String) {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            if let Err(e) = mailer.send_confirmation(&email, &name, &link).await {
                tracing::warn!(email = %email, error = %e, "Confirmation email failed");
            }
        });
    }
}
