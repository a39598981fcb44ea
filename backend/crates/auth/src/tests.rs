//! Use-case tests against the in-memory repository.

use std::sync::Arc;
use std::time::Duration;

use platform::token::{TokenCodec, TokenPurpose};

use crate::application::{
    AuthConfig, ConfirmEmailUseCase, ConfirmOutcome, CurrentUserUseCase, LogInInput, LogInUseCase,
    LogOutUseCase, RefreshSessionUseCase, RequestEmailOutcome, RequestEmailUseCase, SignUpInput,
    SignUpUseCase, TokenPair,
};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::AuthError;
use crate::infra::memory::{InMemoryUserRepository, RecordingMailer};

struct TestAuth {
    repo: Arc<InMemoryUserRepository>,
    mailer: Arc<RecordingMailer>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl TestAuth {
    fn new() -> Self {
        let config = AuthConfig::with_secret(b"test_token_secret".to_vec());

        Self {
            repo: Arc::new(InMemoryUserRepository::new()),
            mailer: Arc::new(RecordingMailer::new()),
            codec: Arc::new(TokenCodec::new(&config.token_secret)),
            config: Arc::new(config),
        }
    }

    fn sign_up(&self) -> SignUpUseCase<InMemoryUserRepository, RecordingMailer> {
        SignUpUseCase::new(
            self.repo.clone(),
            self.mailer.clone(),
            self.codec.clone(),
            self.config.clone(),
        )
    }

    fn log_in(&self) -> LogInUseCase<InMemoryUserRepository> {
        LogInUseCase::new(self.repo.clone(), self.codec.clone(), self.config.clone())
    }

    fn refresh(&self) -> RefreshSessionUseCase<InMemoryUserRepository> {
        RefreshSessionUseCase::new(self.repo.clone(), self.codec.clone(), self.config.clone())
    }

    fn current_user(&self) -> CurrentUserUseCase<InMemoryUserRepository> {
        CurrentUserUseCase::new(self.repo.clone(), self.codec.clone())
    }

    fn log_out(&self) -> LogOutUseCase<InMemoryUserRepository> {
        LogOutUseCase::new(self.repo.clone(), self.codec.clone())
    }

    fn confirm_email(&self) -> ConfirmEmailUseCase<InMemoryUserRepository> {
        ConfirmEmailUseCase::new(self.repo.clone(), self.codec.clone())
    }

    fn request_email(&self) -> RequestEmailUseCase<InMemoryUserRepository, RecordingMailer> {
        RequestEmailUseCase::new(
            self.repo.clone(),
            self.mailer.clone(),
            self.codec.clone(),
            self.config.clone(),
        )
    }

    async fn register(&self, email: &str, password: &str) {
        self.sign_up()
            .execute(SignUpInput {
                name: "Ada".to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap();
    }

    async fn register_confirmed(&self, email: &str, password: &str) {
        self.register(email, password).await;
        let user = self
            .repo
            .find_by_email(&Email::new(email).unwrap())
            .await
            .unwrap()
            .unwrap();
        self.repo.set_confirmed(&user.user_id).await.unwrap();
    }

    /// Delivery is fire-and-forget, so poll until the spawned send runs.
    async fn wait_for_mail(&self, count: usize) -> Vec<crate::infra::memory::RecordedMail> {
        for _ in 0..200 {
            let sent = self.mailer.sent().await;
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("Expected {} confirmation emails", count);
    }

    async fn login_pair(&self, email: &str, password: &str) -> TokenPair {
        self.log_in()
            .execute(LogInInput {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
            .unwrap()
    }
}

/// Token from a recorded confirmation link (last path segment).
fn link_token(link: &str) -> &str {
    link.rsplit('/').next().unwrap()
}

// ============================================================================
// Sign Up
// ============================================================================

#[tokio::test]
async fn test_signup_creates_unconfirmed_user_with_avatar() {
    let auth = TestAuth::new();

    let user = auth
        .sign_up()
        .execute(SignUpInput {
            name: "Ada".to_string(),
            email: "Ada@Example.COM".to_string(),
            password: "secret123".to_string(),
        })
        .await
        .unwrap();

    assert!(!user.confirmed);
    assert!(user.refresh_token.is_none());
    assert_eq!(user.email.as_str(), "ada@example.com");
    assert!(
        user.avatar_url
            .as_deref()
            .unwrap()
            .starts_with("https://www.gravatar.com/avatar/")
    );
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let auth = TestAuth::new();
    auth.register("ada@example.com", "secret123").await;

    let err = auth
        .sign_up()
        .execute(SignUpInput {
            name: "Someone Else".to_string(),
            // Same address after normalization
            email: "ADA@example.com".to_string(),
            password: "different9".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::EmailTaken));
}

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let auth = TestAuth::new();

    let bad_email = auth
        .sign_up()
        .execute(SignUpInput {
            name: "Ada".to_string(),
            email: "not-an-email".to_string(),
            password: "secret123".to_string(),
        })
        .await;
    assert!(bad_email.is_err());

    let bad_password = auth
        .sign_up()
        .execute(SignUpInput {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
        })
        .await;
    assert!(bad_password.is_err());
}

#[tokio::test]
async fn test_signup_sends_confirmation_email() {
    let auth = TestAuth::new();
    auth.register("ada@example.com", "secret123").await;

    let sent = auth.wait_for_mail(1).await;
    assert_eq!(sent[0].email, "ada@example.com");
    assert_eq!(sent[0].name, "Ada");
    assert!(sent[0].link.contains("/confirmed_email/"));
}

// ============================================================================
// Confirmation Flow
// ============================================================================

#[tokio::test]
async fn test_full_confirmation_flow() {
    let auth = TestAuth::new();
    auth.register("ada@example.com", "secret123").await;

    // Login before confirming fails
    let err = auth
        .log_in()
        .execute(LogInInput {
            email: "ada@example.com".to_string(),
            password: "secret123".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AccountNotConfirmed));

    // Confirm through the emailed link
    let sent = auth.wait_for_mail(1).await;
    let outcome = auth
        .confirm_email()
        .execute(link_token(&sent[0].link))
        .await
        .unwrap();
    assert_eq!(outcome, ConfirmOutcome::Confirmed);

    // Now login succeeds with a verifiable pair
    let pair = auth.login_pair("ada@example.com", "secret123").await;
    assert_eq!(pair.token_type, "bearer");

    let claims = auth
        .codec
        .verify(&pair.access_token, TokenPurpose::Access)
        .unwrap();
    assert_eq!(claims.sub, "ada@example.com");
}

#[tokio::test]
async fn test_confirm_is_idempotent() {
    let auth = TestAuth::new();
    auth.register("ada@example.com", "secret123").await;

    let sent = auth.wait_for_mail(1).await;
    let token = link_token(&sent[0].link);

    assert_eq!(
        auth.confirm_email().execute(token).await.unwrap(),
        ConfirmOutcome::Confirmed
    );
    assert_eq!(
        auth.confirm_email().execute(token).await.unwrap(),
        ConfirmOutcome::AlreadyConfirmed
    );
}

#[tokio::test]
async fn test_confirm_rejects_bad_tokens() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    // Garbage token
    let err = auth.confirm_email().execute("garbage").await.unwrap_err();
    assert!(matches!(err, AuthError::VerificationError));

    // Wrong purpose: an access token must not confirm an account
    let pair = auth.login_pair("ada@example.com", "secret123").await;
    let err = auth
        .confirm_email()
        .execute(&pair.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::VerificationError));

    // Valid verification token for an account that does not exist
    let orphan = auth
        .codec
        .issue(
            "ghost@example.com",
            TokenPurpose::EmailVerification,
            auth.config.verification_ttl(),
        )
        .unwrap();
    let err = auth.confirm_email().execute(&orphan).await.unwrap_err();
    assert!(matches!(err, AuthError::VerificationError));
}

#[tokio::test]
async fn test_request_email() {
    let auth = TestAuth::new();

    // Unknown account
    let err = auth
        .request_email()
        .execute("nobody@example.com".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));

    // Unconfirmed account gets a fresh email
    auth.register("ada@example.com", "secret123").await;
    let outcome = auth
        .request_email()
        .execute("ada@example.com".to_string())
        .await
        .unwrap();
    assert_eq!(outcome, RequestEmailOutcome::Sent);
    let sent = auth.wait_for_mail(2).await;
    assert!(sent.iter().all(|m| m.email == "ada@example.com"));

    // Confirmed account is a no-op, not an error
    let token = link_token(&sent[0].link).to_string();
    auth.confirm_email().execute(&token).await.unwrap();
    let outcome = auth
        .request_email()
        .execute("ada@example.com".to_string())
        .await
        .unwrap();
    assert_eq!(outcome, RequestEmailOutcome::AlreadyConfirmed);
}

// ============================================================================
// Log In
// ============================================================================

#[tokio::test]
async fn test_login_unknown_email_is_not_found() {
    let auth = TestAuth::new();

    let err = auth
        .log_in()
        .execute(LogInInput {
            email: "nobody@example.com".to_string(),
            password: "secret123".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    let err = auth
        .log_in()
        .execute(LogInInput {
            email: "ada@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .unwrap_err();

    // Wrong password on an existing account is never "not found"
    assert!(matches!(err, AuthError::InvalidCredentials));
}

// ============================================================================
// Refresh Rotation
// ============================================================================

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    let first = auth.login_pair("ada@example.com", "secret123").await;
    let second = auth.refresh().execute(&first.refresh_token).await.unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    assert!(
        auth.codec
            .verify(&second.refresh_token, TokenPurpose::Refresh)
            .is_ok()
    );
}

#[tokio::test]
async fn test_refresh_reuse_revokes_session() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    let first = auth.login_pair("ada@example.com", "secret123").await;
    let second = auth.refresh().execute(&first.refresh_token).await.unwrap();

    // Replaying the rotated-out token is reuse
    let err = auth
        .refresh()
        .execute(&first.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenRevoked));

    // Reuse revoked the current token as well
    let err = auth
        .refresh()
        .execute(&second.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenRevoked));
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    let pair = auth.login_pair("ada@example.com", "secret123").await;
    let err = auth.refresh().execute(&pair.access_token).await.unwrap_err();

    assert!(matches!(err, AuthError::TokenPurposeMismatch));
}

#[tokio::test]
async fn test_login_invalidates_previous_refresh_token() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    let first = auth.login_pair("ada@example.com", "secret123").await;
    let second = auth.login_pair("ada@example.com", "secret123").await;

    let err = auth
        .refresh()
        .execute(&first.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenRevoked));

    assert!(auth.refresh().execute(&second.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_concurrent_refresh_admits_one_winner() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    let pair = auth.login_pair("ada@example.com", "secret123").await;

    // Two clients race the same refresh token; exactly one rotation
    // may land
    let refresh_a = auth.refresh();
    let refresh_b = auth.refresh();
    let (a, b) = tokio::join!(
        refresh_a.execute(&pair.refresh_token),
        refresh_b.execute(&pair.refresh_token),
    );

    let loser = match (a, b) {
        (Ok(_), Err(err)) | (Err(err), Ok(_)) => err,
        (Ok(_), Ok(_)) => panic!("Both refreshes succeeded"),
        (Err(_), Err(_)) => panic!("Both refreshes failed"),
    };
    assert!(matches!(loser, AuthError::RefreshTokenRevoked));
}

// ============================================================================
// Current User / Log Out
// ============================================================================

#[tokio::test]
async fn test_current_user() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    let pair = auth.login_pair("ada@example.com", "secret123").await;
    let user = auth
        .current_user()
        .execute(&pair.access_token)
        .await
        .unwrap();
    assert_eq!(user.email.as_str(), "ada@example.com");

    // A refresh token must not authorize API calls
    let err = auth
        .current_user()
        .execute(&pair.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenPurposeMismatch));
}

#[tokio::test]
async fn test_logout_is_idempotent_and_keeps_access_valid() {
    let auth = TestAuth::new();
    auth.register_confirmed("ada@example.com", "secret123").await;

    let pair = auth.login_pair("ada@example.com", "secret123").await;

    auth.log_out().execute(&pair.access_token).await.unwrap();
    // Logging out again with no active session still succeeds
    auth.log_out().execute(&pair.access_token).await.unwrap();

    // The refresh token is gone
    let err = auth
        .refresh()
        .execute(&pair.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshTokenRevoked));

    // The outstanding access token keeps working until expiry
    assert!(auth.current_user().execute(&pair.access_token).await.is_ok());
}
