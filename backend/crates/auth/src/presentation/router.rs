//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::domain::repository::{ConfirmationMailer, UserRepository};
use crate::infra::postgres::PgUserRepository;
use crate::infra::smtp::SmtpMailer;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router backed by PostgreSQL and SMTP
pub fn auth_router(repo: PgUserRepository, mailer: SmtpMailer, config: AuthConfig) -> Router {
    auth_router_generic(repo, mailer, config)
}

/// Create a generic Auth router for any repository and mailer
pub fn auth_router_generic<R, M>(repo: R, mailer: M, config: AuthConfig) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: ConfirmationMailer + Send + Sync + 'static,
{
    let codec = Arc::new(TokenCodec::new(&config.token_secret));

    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        codec,
        config: Arc::new(config),
    };

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, M>))
        .route("/login", post(handlers::log_in::<R, M>))
        .route("/refresh_token", get(handlers::refresh_token::<R, M>))
        .route("/logout", post(handlers::log_out::<R, M>))
        .route("/me", get(handlers::me::<R, M>))
        .route("/confirmed_email/{token}", get(handlers::confirmed_email::<R, M>))
        .route("/request_email", post(handlers::request_email::<R, M>))
        .with_state(state)
}
