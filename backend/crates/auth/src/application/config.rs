//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC signing secret for access/refresh/verification tokens
    pub token_secret: Vec<u8>,
    /// Access token TTL (60 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token TTL (1 week)
    pub refresh_token_ttl: Duration,
    /// Email-verification token TTL (1 week)
    pub verification_token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Public base URL used to build confirmation links
    pub public_base_url: String,
}

impl AuthConfig {
    /// Create config with the given token secret and default TTLs.
    ///
    /// There is deliberately no `Default`: every construction path has
    /// to supply key material, so a predictable all-zero secret cannot
    /// end up signing tokens by accident.
    pub fn with_secret(token_secret: Vec<u8>) -> Self {
        Self {
            token_secret,
            access_token_ttl: Duration::from_secs(60 * 60), // 60 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            verification_token_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            password_pepper: None,
            public_base_url: "http://localhost:8000".to_string(),
        }
    }

    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self::with_secret(secret)
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Access token TTL as a chrono duration
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_ttl.as_secs() as i64)
    }

    /// Refresh token TTL as a chrono duration
    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.refresh_token_ttl.as_secs() as i64)
    }

    /// Verification token TTL as a chrono duration
    pub fn verification_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.verification_token_ttl.as_secs() as i64)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Confirmation link for an email-verification token
    pub fn confirmation_link(&self, token: &str) -> String {
        format!(
            "{}/api/auth/confirmed_email/{}",
            self.public_base_url.trim_end_matches('/'),
            token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_secret_is_not_predictable() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();

        assert_eq!(a.token_secret.len(), 32);
        assert_ne!(a.token_secret, vec![0u8; 32]);
        assert_ne!(a.token_secret, b.token_secret);
    }

    #[test]
    fn test_confirmation_link_trims_trailing_slash() {
        let mut config = AuthConfig::with_secret(b"s".to_vec());
        config.public_base_url = "https://app.example.com/".to_string();

        assert_eq!(
            config.confirmation_link("tok"),
            "https://app.example.com/api/auth/confirmed_email/tok"
        );
    }
}
