//! Session Tokens
//!
//! The access/refresh token pair returned by login and refresh.

use platform::token::{TokenCodec, TokenPurpose};

use crate::application::config::AuthConfig;
use crate::error::AuthResult;

/// Access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived access token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// Always "bearer"
    pub token_type: &'static str,
}

/// Issue a fresh access/refresh pair for the given subject.
///
/// Both tokens carry the subject; only the scope and TTL differ.
pub fn issue_pair(codec: &TokenCodec, config: &AuthConfig, subject: &str) -> AuthResult<TokenPair> {
    let access_token = codec.issue(subject, TokenPurpose::Access, config.access_ttl())?;
    let refresh_token = codec.issue(subject, TokenPurpose::Refresh, config.refresh_ttl())?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "bearer",
    })
}
