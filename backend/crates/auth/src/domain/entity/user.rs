//! User Entity
//!
//! The stored user record: profile data, credential hash and the
//! session bookkeeping this core owns (`refresh_token`, `confirmed`).

use chrono::{DateTime, Utc};

use crate::domain::value_object::{email::Email, user_id::UserId, user_password::UserPassword};

/// User entity
///
/// `refresh_token` is `None` or the exact most recently issued refresh
/// token; `confirmed` transitions false to true exactly once.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Display name
    pub name: String,
    /// Email (unique, lowercased; also the token subject)
    pub email: Email,
    /// Hashed password
    pub password_hash: UserPassword,
    /// Gravatar-derived avatar URL, set at signup
    pub avatar_url: Option<String>,
    /// Most recently issued refresh token, if any
    pub refresh_token: Option<String>,
    /// Whether the email address has been confirmed
    pub confirmed: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unconfirmed user with no active session.
    pub fn new(
        name: String,
        email: Email,
        password_hash: UserPassword,
        avatar_url: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            name,
            email,
            password_hash,
            avatar_url,
            refresh_token: None,
            confirmed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Exact-value comparison against the stored refresh token.
    pub fn refresh_token_matches(&self, presented: &str) -> bool {
        self.refresh_token.as_deref() == Some(presented)
    }

    /// Replace the stored refresh token, invalidating any prior one.
    pub fn set_refresh_token(&mut self, token: Option<String>) {
        self.refresh_token = token;
        self.updated_at = Utc::now();
    }

    /// Mark the email as confirmed. Never reverts.
    pub fn confirm(&mut self) {
        if !self.confirmed {
            self.confirmed = true;
            self.updated_at = Utc::now();
        }
    }
}
