//! User Account Entity

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How an account authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    /// Email + password credentials held locally
    Local,
    /// Google-verified federated identity, no local password
    Google,
}

impl Default for AuthProvider {
    fn default() -> Self {
        Self::Local
    }
}

/// User account record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Unique login identifier
    pub email: String,

    /// Display name. Not checked for uniqueness at registration,
    /// only when changed through a profile update.
    pub username: String,

    /// Argon2 hash. Absent for federated accounts.
    #[serde(default, rename = "password", skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,

    #[serde(default)]
    pub auth_provider: AuthProvider,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new_local(
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            email: email.into(),
            username: username.into(),
            password_hash: Some(password_hash.into()),
            profile_image: None,
            auth_provider: AuthProvider::Local,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_google(email: impl Into<String>, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            email: email.into(),
            username: username.into(),
            password_hash: None,
            profile_image: None,
            auth_provider: AuthProvider::Google,
            created_at: now,
            updated_at: now,
        }
    }

    /// Federated accounts carry no local credential.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
