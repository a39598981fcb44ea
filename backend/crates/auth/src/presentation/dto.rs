//! API DTOs (Data Transfer Objects)
//!
//! Wire format follows the OAuth2 bearer-token convention
//! (`access_token`, `token_type`), so fields stay snake_case.

use serde::{Deserialize, Serialize};

use crate::application::session::TokenPair;
use crate::domain::entity::user::User;

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Public view of a user account
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub confirmed: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id.to_string(),
            name: user.name,
            email: user.email.to_string(),
            avatar_url: user.avatar_url,
            confirmed: user.confirmed,
        }
    }
}

// ============================================================================
// Log In / Refresh
// ============================================================================

/// Log in request
#[derive(Debug, Clone, Deserialize)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

/// Access/refresh token pair response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
        }
    }
}

// ============================================================================
// Email Confirmation
// ============================================================================

/// Request a new confirmation email
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEmailBody {
    pub email: String,
}

/// Simple message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
