//! Service Layer
//!
//! Token issuance, password hashing, and the external collaborator
//! seams (identity verification, blob storage).

pub mod auth;
pub mod blob;
pub mod identity;
pub mod password;

pub use auth::{extract_bearer_token, AccessTokenClaims, AuthConfig, AuthService, RefreshTokenClaims};
pub use blob::{BlobStore, DiskBlobStore};
pub use identity::{GoogleTokenVerifier, IdentityVerifier, VerifiedIdentity};
pub use password::PasswordService;
