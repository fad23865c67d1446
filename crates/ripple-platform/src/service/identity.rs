//! Federated Identity Bridge
//!
//! Verifies a third-party identity assertion (a Google ID token) and
//! reduces it to the claims the account layer needs. The network
//! verifier sits behind a trait so the login flow can be exercised
//! with a local implementation.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{PlatformError, Result};

/// Claims extracted from a verified identity assertion
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Provider-scoped subject identifier
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify an identity assertion, returning its claims.
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity>;
}

const TOKENINFO_ENDPOINT: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Response shape of the Google tokeninfo endpoint
#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: String,
    #[serde(default)]
    aud: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// Verifies Google ID tokens against the tokeninfo endpoint.
pub struct GoogleTokenVerifier {
    http: reqwest::Client,
    endpoint: String,
    /// Expected `aud` claim; unchecked when not configured
    audience: Option<String>,
}

impl GoogleTokenVerifier {
    pub fn new(audience: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: TOKENINFO_ENDPOINT.to_string(),
            audience,
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenVerifier {
    async fn verify(&self, assertion: &str) -> Result<VerifiedIdentity> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", assertion)])
            .send()
            .await
            .map_err(|e| PlatformError::invalid_assertion(format!("verification request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(PlatformError::invalid_assertion("Invalid token"));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| PlatformError::invalid_assertion(format!("malformed verification response: {e}")))?;

        if let Some(expected) = &self.audience {
            if info.aud.as_deref() != Some(expected.as_str()) {
                return Err(PlatformError::invalid_assertion("Token audience mismatch"));
            }
        }

        debug!(subject = %info.sub, "verified federated identity");

        Ok(VerifiedIdentity {
            subject: info.sub,
            email: info.email,
            name: info.name,
            picture: info.picture,
        })
    }
}
