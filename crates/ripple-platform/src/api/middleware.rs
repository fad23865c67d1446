//! API Middleware
//!
//! Token-verification boundary for the feed routes. A missing
//! credential is rejected with 401, a malformed or expired token with
//! 403. No per-operation authorization happens here or downstream;
//! any authenticated caller may act on any post.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::api::common::ApiError;
use crate::service::{extract_bearer_token, AuthService};

/// Shared state for the token-verification boundary
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
}

/// Caller identity decoded from a valid access token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
}

/// Extractor for authenticated requests
pub struct Authenticated(pub AuthContext);

fn reject(status: StatusCode, error: &str, message: &str) -> Response {
    let body = ApiError {
        error: error.to_string(),
        message: message.to_string(),
        details: None,
    };
    (status, Json(body)).into_response()
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                reject(
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Authorization header required",
                )
            })?;

        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Token missing"))?;

        let app_state = parts.extensions.get::<AppState>().ok_or_else(|| {
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "AppState not found",
            )
        })?;

        let claims = app_state
            .auth_service
            .validate_access_token(token)
            .map_err(|_| reject(StatusCode::FORBIDDEN, "FORBIDDEN", "Invalid token"))?;

        Ok(Authenticated(AuthContext {
            user_id: claims.sub,
            email: claims.email,
        }))
    }
}
