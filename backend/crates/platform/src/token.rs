//! Signed Bearer Token Codec
//!
//! Issues and verifies compact, self-describing bearer tokens (JWT,
//! HS256). Every token carries a subject, a purpose and an expiry; a
//! token is only accepted when its embedded purpose matches the
//! operation it is presented for.
//!
//! The signing secret is process-wide and loaded once at startup.
//! Rotating it invalidates all outstanding tokens; there is no
//! key-rotation grace period.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The intended use embedded in a token, checked to prevent cross-use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenPurpose {
    /// Short-lived token authorizing API calls
    #[serde(rename = "access")]
    Access,
    /// Long-lived token exchanged for a new pair, single-use under rotation
    #[serde(rename = "refresh")]
    Refresh,
    /// Long-lived token proving control of an email address
    #[serde(rename = "email-verification")]
    EmailVerification,
}

impl TokenPurpose {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
            TokenPurpose::EmailVerification => "email-verification",
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token verification failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Malformed structure or signature mismatch
    #[error("Token is malformed or its signature does not verify")]
    Invalid,

    /// `now > exp`
    #[error("Token has expired")]
    Expired,

    /// Embedded purpose differs from the expected one
    #[error("Token was issued for {actual}, expected {expected}")]
    PurposeMismatch {
        expected: TokenPurpose,
        actual: TokenPurpose,
    },

    /// Signing failed (key material problem)
    #[error("Token signing failed")]
    Signing,
}

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (the user's email)
    pub sub: String,
    /// Purpose this token was issued for
    pub scope: TokenPurpose,
    /// Issued-at, Unix seconds
    pub iat: i64,
    /// Expiry, Unix seconds
    pub exp: i64,
    /// Unique token id. `iat` has one-second resolution, so without it
    /// two tokens issued back to back would be byte-identical.
    pub jti: String,
}

/// HS256 token codec. Pure computation, safe to share across tasks.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec around a process-wide secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: a token issued already expired must never verify
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a signed token for `subject` with the given purpose and TTL.
    ///
    /// A non-positive TTL produces an already-expired token; useful in
    /// tests, never done by the application.
    pub fn issue(
        &self,
        subject: &str,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: subject.to_owned(),
            scope: purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| TokenError::Signing)
    }

    /// Verify a token and check its embedded purpose.
    ///
    /// Fails `Invalid` on structural/signature problems, `Expired` when
    /// past `exp`, and `PurposeMismatch` when the scope differs from
    /// `expected`.
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;

        let claims = data.claims;
        if claims.scope != expected {
            return Err(TokenError::PurposeMismatch {
                expected,
                actual: claims.scope,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test_token_secret")
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let codec = codec();
        let token = codec
            .issue("a@x.com", TokenPurpose::Access, Duration::minutes(60))
            .unwrap();

        let claims = codec.verify(&token, TokenPurpose::Access).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.scope, TokenPurpose::Access);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_issued_tokens_are_unique() {
        let codec = codec();
        let first = codec
            .issue("a@x.com", TokenPurpose::Refresh, Duration::days(7))
            .unwrap();
        let second = codec
            .issue("a@x.com", TokenPurpose::Refresh, Duration::days(7))
            .unwrap();

        // Same subject, purpose and TTL within the same second must
        // still produce distinct tokens
        assert_ne!(first, second);

        let first = codec.verify(&first, TokenPurpose::Refresh).unwrap();
        let second = codec.verify(&second, TokenPurpose::Refresh).unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let token = codec
            .issue("a@x.com", TokenPurpose::Access, Duration::seconds(-1))
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenPurpose::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_purpose_isolation() {
        let codec = codec();
        let token = codec
            .issue("a@x.com", TokenPurpose::Refresh, Duration::days(7))
            .unwrap();

        let err = codec.verify(&token, TokenPurpose::Access).unwrap_err();
        assert_eq!(
            err,
            TokenError::PurposeMismatch {
                expected: TokenPurpose::Access,
                actual: TokenPurpose::Refresh,
            }
        );

        // The right purpose still verifies
        assert!(codec.verify(&token, TokenPurpose::Refresh).is_ok());
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let codec = codec();
        let token = codec
            .issue("a@x.com", TokenPurpose::Access, Duration::minutes(5))
            .unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert_eq!(
            codec.verify(&tampered, TokenPurpose::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = codec()
            .issue("a@x.com", TokenPurpose::Access, Duration::minutes(5))
            .unwrap();

        let other = TokenCodec::new(b"another_secret");
        assert_eq!(
            other.verify(&token, TokenPurpose::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(
            codec().verify("not.a.token", TokenPurpose::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_purpose_wire_names() {
        assert_eq!(
            serde_json::to_string(&TokenPurpose::EmailVerification).unwrap(),
            "\"email-verification\""
        );
        assert_eq!(
            serde_json::to_string(&TokenPurpose::Access).unwrap(),
            "\"access\""
        );
        assert_eq!(
            serde_json::to_string(&TokenPurpose::Refresh).unwrap(),
            "\"refresh\""
        );
    }
}
