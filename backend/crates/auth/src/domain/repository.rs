//! Repository Traits
//!
//! Interfaces for data persistence and outbound mail. Implementations
//! live in the infrastructure layer.

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Replace the stored refresh token (`None` clears it)
    async fn set_refresh_token(&self, user_id: &UserId, token: Option<&str>) -> AuthResult<()>;

    /// Atomically swap `old` for `new`, returning false when the stored
    /// token no longer equals `old`. Concurrent rotations of the same
    /// token admit at most one winner.
    async fn rotate_refresh_token(
        &self,
        user_id: &UserId,
        old: &str,
        new: &str,
    ) -> AuthResult<bool>;

    /// Mark the user's email as confirmed
    async fn set_confirmed(&self, user_id: &UserId) -> AuthResult<()>;
}

/// Outbound confirmation mail trait
#[trait_variant::make(ConfirmationMailer: Send)]
pub trait LocalConfirmationMailer {
    /// Send the email-confirmation message carrying the given link
    async fn send_confirmation(&self, email: &Email, name: &str, link: &str) -> AuthResult<()>;
}
