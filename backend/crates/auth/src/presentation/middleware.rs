//! Auth Middleware
//!
//! Middleware for requiring a valid access token on protected routes.
//! The auth routes themselves verify tokens in their use cases; this
//! layer is for resource routers (contacts, etc.) mounted next to them.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::token::{TokenClaims, TokenCodec, TokenPurpose};

use crate::error::AuthError;
use crate::presentation::handlers::extract_bearer;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub codec: Arc<TokenCodec>,
}

/// Middleware that requires a valid bearer access token.
///
/// Use with `axum::middleware::from_fn_with_state`. The verified
/// claims are stored in request extensions for downstream handlers.
pub async fn require_access_token(
    State(state): State<AuthMiddlewareState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token =
        extract_bearer(req.headers()).ok_or_else(|| AuthError::TokenInvalid.into_response())?;

    let claims = state
        .codec
        .verify(&token, TokenPurpose::Access)
        .map_err(|e| AuthError::from(e).into_response())?;

    req.extensions_mut().insert(AccessClaims(claims));

    Ok(next.run(req).await)
}

/// Verified access-token claims stored in request extensions
#[derive(Clone)]
pub struct AccessClaims(pub TokenClaims);

impl AccessClaims {
    /// Token subject (the account email)
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Extension, Router, middleware::from_fn_with_state};
    use tower::ServiceExt;

    async fn whoami(Extension(claims): Extension<AccessClaims>) -> String {
        claims.subject().to_string()
    }

    fn protected_app(codec: Arc<TokenCodec>) -> Router {
        let state = AuthMiddlewareState { codec };
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(from_fn_with_state(state, require_access_token))
    }

    fn request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_access_token_passes() {
        let codec = Arc::new(TokenCodec::new(b"mw_secret"));
        let token = codec
            .issue("a@x.com", TokenPurpose::Access, chrono::Duration::minutes(5))
            .unwrap();

        let res = protected_app(codec)
            .oneshot(request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"a@x.com");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let codec = Arc::new(TokenCodec::new(b"mw_secret"));
        let res = protected_app(codec).oneshot(request(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_token_is_rejected() {
        let codec = Arc::new(TokenCodec::new(b"mw_secret"));
        let token = codec
            .issue("a@x.com", TokenPurpose::Refresh, chrono::Duration::days(7))
            .unwrap();

        let res = protected_app(codec)
            .oneshot(request(Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
