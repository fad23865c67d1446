//! Auth API Endpoints
//!
//! Account registration, login, token refresh, federated login, and
//! profile updates.
//! - POST /register - Create a local account
//! - POST /login - Password-based login
//! - POST /refresh - Exchange a refresh token for a new access token
//! - POST /logout - Client-side logout acknowledgement
//! - POST /google - Federated login with a Google ID token
//! - PUT  /update-profile/:userId - Partial profile update (multipart)

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::common::{field_bytes, field_text, next_field, ApiResult, MessageResponse};
use crate::domain::{AuthProvider, User};
use crate::error::PlatformError;
use crate::repository::UserRepository;
use crate::service::{AuthService, BlobStore, IdentityVerifier, PasswordService};

/// Auth service state
#[derive(Clone)]
pub struct AuthState {
    pub user_repo: Arc<UserRepository>,
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub blob_store: Arc<dyn BlobStore>,
}

/// Registration request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// Federated login request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederatedLoginRequest {
    #[serde(default)]
    pub token: String,
}

/// Account payload returned by the API. Never carries the password
/// hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub profile_image: Option<String>,
    pub auth_provider: AuthProvider,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_hex(),
            email: u.email,
            username: u.username,
            profile_image: u.profile_image,
            auth_provider: u.auth_provider,
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

/// Session payload: the account plus its token pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh responses carry a new access token only; the refresh token
/// is not rotated.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub user: UserResponse,
}

fn issue_session(state: &AuthState, user: User) -> Result<SessionResponse, PlatformError> {
    let access_token = state.auth_service.generate_access_token(&user)?;
    let refresh_token = state.auth_service.generate_refresh_token(&user)?;
    Ok(SessionResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

/// Register a new local account
///
/// The username is deliberately not checked for uniqueness here; only
/// profile updates enforce that.
pub async fn register(
    State(state): State<AuthState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), PlatformError> {
    if req.email.is_empty() || req.username.is_empty() || req.password.is_empty() {
        return Err(PlatformError::validation("All fields are required"));
    }

    if state.user_repo.find_by_email(&req.email).await?.is_some() {
        return Err(PlatformError::duplicate("User", "email", &req.email));
    }

    let password_hash = state.password_service.hash_password(&req.password)?;
    let user = User::new_local(&req.email, &req.username, password_hash);
    state.user_repo.insert(&user).await?;

    info!(user_id = %user.id, "registered account");

    let session = issue_session(&state, user)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Login with email and password
///
/// An unknown email, a federated account without a password, and a
/// wrong password all produce the same error shape.
pub async fn login(
    State(state): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    let user = state
        .user_repo
        .find_by_email(&req.email)
        .await?
        .ok_or(PlatformError::InvalidCredentials)?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or(PlatformError::InvalidCredentials)?;

    let valid = state
        .password_service
        .verify_password(&req.password, hash)
        .unwrap_or(false);
    if !valid {
        return Err(PlatformError::InvalidCredentials);
    }

    Ok(Json(issue_session(&state, user)?))
}

/// Exchange a refresh token for a new access token
pub async fn refresh(
    State(state): State<AuthState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<RefreshResponse> {
    if req.refresh_token.is_empty() {
        return Err(PlatformError::invalid_token("Refresh token required"));
    }

    let claims = state.auth_service.validate_refresh_token(&req.refresh_token)?;
    let user_id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| PlatformError::invalid_token("Invalid refresh token"))?;

    let user = state
        .user_repo
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| PlatformError::invalid_token("Invalid refresh token"))?;

    let access_token = state.auth_service.generate_access_token(&user)?;
    Ok(Json(RefreshResponse { access_token }))
}

/// Logout
///
/// Stateless: nothing is revoked server-side, so issued tokens stay
/// valid until natural expiry. The client drops its copies.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}

/// Login with a federated identity assertion, creating the local
/// account on first sight
pub async fn federated_login(
    State(state): State<AuthState>,
    Json(req): Json<FederatedLoginRequest>,
) -> ApiResult<SessionResponse> {
    if req.token.is_empty() {
        return Err(PlatformError::validation("Token is required"));
    }

    let identity = state.identity_verifier.verify(&req.token).await?;
    let email = identity
        .email
        .ok_or_else(|| PlatformError::invalid_assertion("Email not found in token"))?;

    let user = match state.user_repo.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            let username = identity
                .name
                .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());
            let user = User::new_google(&email, username);
            state.user_repo.insert(&user).await?;
            info!(user_id = %user.id, "created federated account");
            user
        }
    };

    Ok(Json(issue_session(&state, user)?))
}

/// Update profile fields; only the provided fields are applied
pub async fn update_profile(
    State(state): State<AuthState>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<ProfileUpdateResponse> {
    let mut username: Option<String> = None;
    let mut email: Option<String> = None;
    let mut profile_image: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        match field.name() {
            Some("username") => username = Some(field_text(field).await?),
            Some("email") => email = Some(field_text(field).await?),
            Some("profileImage") => {
                let (name, bytes) = field_bytes(field).await?;
                profile_image = Some(state.blob_store.store(&name, bytes).await?);
            }
            _ => {}
        }
    }

    let id = ObjectId::parse_str(&user_id).map_err(|_| PlatformError::validation("Invalid user ID"))?;

    // Reject a username already held by a different account.
    if let Some(requested) = username.as_deref().filter(|u| !u.is_empty()) {
        if let Some(existing) = state.user_repo.find_by_username(requested).await? {
            if existing.id != id {
                return Err(PlatformError::duplicate("User", "username", requested));
            }
        }
    }

    let mut user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| PlatformError::not_found("User", &user_id))?;

    if let Some(username) = username.filter(|u| !u.is_empty()) {
        user.username = username;
    }
    if let Some(email) = email.filter(|e| !e.is_empty()) {
        user.email = email;
    }
    if let Some(image) = profile_image {
        user.profile_image = Some(image);
    }
    user.touch();

    state.user_repo.update(&user).await?;

    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        user: user.into(),
    }))
}

/// Create the auth router
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/google", post(federated_login))
        .route("/update-profile/:user_id", put(update_profile))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"email":"test@example.com","username":"tester","password":"secret"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.email, "test@example.com");
        assert_eq!(req.username, "tester");
        assert_eq!(req.password, "secret");
    }

    #[test]
    fn test_missing_fields_deserialize_to_empty() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        assert!(req.email.is_empty());
        assert!(req.username.is_empty());
        assert!(req.password.is_empty());
    }

    #[test]
    fn test_refresh_request_uses_camel_case() {
        let json = r#"{"refreshToken":"abc"}"#;
        let req: RefreshRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.refresh_token, "abc");
    }

    #[test]
    fn test_session_response_serialization() {
        let user = User::new_local("test@example.com", "tester", "hash");
        let response = SessionResponse {
            user: user.into(),
            access_token: "acc".to_string(),
            refresh_token: "ref".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("refreshToken"));
        assert!(json.contains("authProvider"));
        assert!(!json.contains("password"));
    }
}
