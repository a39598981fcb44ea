//! In-Memory Implementations
//!
//! HashMap-backed user repository and a mailer that records instead of
//! sending. Used in tests and local development without Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::{ConfirmationMailer, UserRepository};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// In-memory user repository
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.users
            .write()
            .await
            .insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn set_refresh_token(&self, user_id: &UserId, token: Option<&str>) -> AuthResult<()> {
        if let Some(user) = self.users.write().await.get_mut(user_id.as_uuid()) {
            user.set_refresh_token(token.map(str::to_string));
        }
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        user_id: &UserId,
        old: &str,
        new: &str,
    ) -> AuthResult<bool> {
        // Compare and swap under a single write lock
        let mut users = self.users.write().await;
        match users.get_mut(user_id.as_uuid()) {
            Some(user) if user.refresh_token.as_deref() == Some(old) => {
                user.set_refresh_token(Some(new.to_string()));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_confirmed(&self, user_id: &UserId) -> AuthResult<()> {
        if let Some(user) = self.users.write().await.get_mut(user_id.as_uuid()) {
            user.confirm();
        }
        Ok(())
    }
}

/// A recorded outbound confirmation email
#[derive(Debug, Clone)]
pub struct RecordedMail {
    pub email: String,
    pub name: String,
    pub link: String,
}

/// Mailer that records messages instead of sending them
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<RecordedMail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<RecordedMail> {
        self.sent.lock().await.clone()
    }
}

impl ConfirmationMailer for RecordingMailer {
    async fn send_confirmation(&self, email: &Email, name: &str, link: &str) -> AuthResult<()> {
        self.sent.lock().await.push(RecordedMail {
            email: email.to_string(),
            name: name.to_string(),
            link: link.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::{RawPassword, UserPassword};

    fn sample_user(email: &str) -> User {
        let raw = RawPassword::new("secret123".to_string()).unwrap();
        let hash = UserPassword::from_raw(&raw, None).unwrap();
        User::new("Ada".to_string(), Email::new(email).unwrap(), hash, None)
    }

    #[tokio::test]
    async fn test_find_by_id_and_email() {
        let repo = InMemoryUserRepository::new();
        let user = sample_user("ada@example.com");
        repo.create(&user).await.unwrap();

        let by_id = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert_eq!(by_id.email, user.email);

        let by_email = repo
            .find_by_email(&Email::new("ada@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.user_id, user.user_id);

        assert!(repo.find_by_id(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_token_and_confirmed_updates() {
        let repo = InMemoryUserRepository::new();
        let user = sample_user("ada@example.com");
        repo.create(&user).await.unwrap();

        repo.set_refresh_token(&user.user_id, Some("r1"))
            .await
            .unwrap();
        let stored = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("r1"));

        repo.set_refresh_token(&user.user_id, None).await.unwrap();
        let stored = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());

        assert!(!stored.confirmed);
        repo.set_confirmed(&user.user_id).await.unwrap();
        let stored = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert!(stored.confirmed);
    }

    #[tokio::test]
    async fn test_rotate_refresh_token_admits_one_winner() {
        let repo = InMemoryUserRepository::new();
        let user = sample_user("ada@example.com");
        repo.create(&user).await.unwrap();
        repo.set_refresh_token(&user.user_id, Some("r1"))
            .await
            .unwrap();

        // First rotation wins
        assert!(repo
            .rotate_refresh_token(&user.user_id, "r1", "r2")
            .await
            .unwrap());
        let stored = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("r2"));

        // A second rotation with the stale value loses and leaves the
        // stored token untouched
        assert!(!repo
            .rotate_refresh_token(&user.user_id, "r1", "r3")
            .await
            .unwrap());
        let stored = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("r2"));

        // Unknown user never rotates
        assert!(!repo
            .rotate_refresh_token(&UserId::new(), "r2", "r3")
            .await
            .unwrap());
    }
}
