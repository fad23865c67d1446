//! Token Issuance and Validation
//!
//! Stateless JWT session layer: short-lived access tokens carry the
//! account id and email, long-lived refresh tokens carry the id only.
//! Access and refresh tokens are signed under separate secrets, and
//! nothing is stored server-side; validity is purely signature plus
//! expiry. That also means logout cannot invalidate an issued token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::User;
use crate::error::{PlatformError, Result};

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: i64,
}

impl AuthConfig {
    /// Defaults: 15 minute access tokens, 7 day refresh tokens.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 7 * 24 * 60 * 60,
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Account id (hex ObjectId)
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Account id (hex ObjectId)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct AuthService {
    config: AuthConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let access_encoding = EncodingKey::from_secret(config.access_secret.as_bytes());
        let access_decoding = DecodingKey::from_secret(config.access_secret.as_bytes());
        let refresh_encoding = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        let refresh_decoding = DecodingKey::from_secret(config.refresh_secret.as_bytes());
        Self {
            config,
            access_encoding,
            access_decoding,
            refresh_encoding,
            refresh_decoding,
        }
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user.id.to_hex(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.access_ttl_secs)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| PlatformError::internal(format!("failed to sign access token: {e}")))
    }

    pub fn generate_refresh_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = RefreshTokenClaims {
            sub: user.id.to_hex(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.refresh_ttl_secs)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| PlatformError::internal(format!("failed to sign refresh token: {e}")))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let data = decode::<AccessTokenClaims>(token, &self.access_decoding, &Validation::default())
            .map_err(map_token_error)?;
        Ok(data.claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims> {
        let data = decode::<RefreshTokenClaims>(token, &self.refresh_decoding, &Validation::default())
            .map_err(map_token_error)?;
        Ok(data.claims)
    }
}

fn map_token_error(err: jsonwebtoken::errors::Error) -> PlatformError {
    match err.kind() {
        ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
        _ => PlatformError::invalid_token(err.to_string()),
    }
}

/// Pull the token out of an `Authorization: Bearer ...` header value.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Some(token)
        }
        _ => None,
    }
}
