//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::application::{
    ConfirmEmailUseCase, ConfirmOutcome, CurrentUserUseCase, LogInInput, LogInUseCase,
    LogOutUseCase, RefreshSessionUseCase, RequestEmailOutcome, RequestEmailUseCase, SignUpInput,
    SignUpUseCase,
};
use crate::domain::repository::{ConfirmationMailer, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    LogInRequest, MessageResponse, RequestEmailBody, SignUpRequest, TokenResponse, UserResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

impl<R, M> Clone for AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            mailer: Arc::clone(&self.mailer),
            codec: Arc::clone(&self.codec),
            config: Arc::clone(&self.config),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let input = SignUpInput {
        name: req.name,
        email: req.email,
        password: req.password,
    };

    let user = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

// ============================================================================
// Log In
// ============================================================================

/// POST /api/auth/login
pub async fn log_in<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<LogInRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    let use_case = LogInUseCase::new(state.repo.clone(), state.codec.clone(), state.config.clone());

    let input = LogInInput {
        email: req.email,
        password: req.password,
    };

    let pair = use_case.execute(input).await?;

    Ok(Json(TokenResponse::from(pair)))
}

// ============================================================================
// Refresh
// ============================================================================

/// GET /api/auth/refresh_token
///
/// Takes the refresh token as a bearer credential.
pub async fn refresh_token<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    let token = extract_bearer(&headers).ok_or(AuthError::TokenInvalid)?;

    let use_case =
        RefreshSessionUseCase::new(state.repo.clone(), state.codec.clone(), state.config.clone());

    let pair = use_case.execute(&token).await?;

    Ok(Json(TokenResponse::from(pair)))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/auth/me
pub async fn me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    let token = extract_bearer(&headers).ok_or(AuthError::TokenInvalid)?;

    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.codec.clone());

    let user = use_case.execute(&token).await?;

    Ok(Json(UserResponse::from(user)))
}

// ============================================================================
// Log Out
// ============================================================================

/// POST /api/auth/logout
pub async fn log_out<R, M>(
    State(state): State<AuthAppState<R, M>>,
    headers: HeaderMap,
) -> AuthResult<StatusCode>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    let token = extract_bearer(&headers).ok_or(AuthError::TokenInvalid)?;

    let use_case = LogOutUseCase::new(state.repo.clone(), state.codec.clone());

    use_case.execute(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Email Confirmation
// ============================================================================

/// GET /api/auth/confirmed_email/{token}
pub async fn confirmed_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(token): Path<String>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    let use_case = ConfirmEmailUseCase::new(state.repo.clone(), state.codec.clone());

    let message = match use_case.execute(&token).await? {
        ConfirmOutcome::Confirmed => "Account confirmed",
        ConfirmOutcome::AlreadyConfirmed => "Account already confirmed",
    };

    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/auth/request_email
pub async fn request_email<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<RequestEmailBody>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    let use_case = RequestEmailUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let message = match use_case.execute(req.email).await? {
        RequestEmailOutcome::Sent => "Confirmation email sent",
        RequestEmailOutcome::AlreadyConfirmed => "Account already confirmed",
    };

    Ok(Json(MessageResponse::new(message)))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Pull the bearer credential out of the Authorization header.
pub(crate) fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?;

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_bearer_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert!(extract_bearer(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert!(extract_bearer(&headers).is_none());
    }
}
