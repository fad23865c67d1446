//! Platform Test Suite
//!
//! Tests for the domain model, token lifecycle, password hashing,
//! error mapping, and API payload shapes.

use bson::oid::ObjectId;

use ripple_platform::domain::{AuthProvider, Comment, Post, User};
use ripple_platform::error::PlatformError;
use ripple_platform::service::{AuthConfig, AuthService, BlobStore, DiskBlobStore, PasswordService};

// Unit tests for domain models
mod domain_tests {
    use super::*;

    #[test]
    fn test_local_user_creation() {
        let user = User::new_local("test@example.com", "tester", "hash");
        assert_eq!(user.auth_provider, AuthProvider::Local);
        assert!(user.has_password());
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_federated_user_has_no_password() {
        let user = User::new_google("g@example.com", "gina");
        assert_eq!(user.auth_provider, AuthProvider::Google);
        assert!(!user.has_password());
        assert!(user.profile_image.is_none());
    }

    #[test]
    fn test_user_ids_are_unique() {
        let a = User::new_local("a@example.com", "a", "hash");
        let b = User::new_local("b@example.com", "b", "hash");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_new_post_starts_empty() {
        let post = Post::new(ObjectId::new(), "alice", None, "hello", None);
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
    }

    #[test]
    fn test_toggle_like_is_an_involution() {
        let mut post = Post::new(ObjectId::new(), "alice", None, "hello", None);
        let other = ObjectId::new();
        post.toggle_like(other);
        let before = post.likes.clone();

        let user = ObjectId::new();
        assert!(post.toggle_like(user));
        assert!(!post.toggle_like(user));
        assert_eq!(post.likes, before);
    }

    #[test]
    fn test_toggle_like_commutes_for_distinct_users() {
        let u1 = ObjectId::new();
        let u2 = ObjectId::new();
        let owner = ObjectId::new();

        let mut a = Post::new(owner, "alice", None, "hello", None);
        a.toggle_like(u1);
        a.toggle_like(u2);

        let mut b = Post::new(owner, "alice", None, "hello", None);
        b.toggle_like(u2);
        b.toggle_like(u1);

        let set_a: std::collections::HashSet<_> = a.likes.iter().copied().collect();
        let set_b: std::collections::HashSet<_> = b.likes.iter().copied().collect();
        assert_eq!(set_a, set_b);
        assert_eq!(set_a.len(), 2);
    }

    #[test]
    fn test_comment_append_preserves_prior_comments() {
        let mut post = Post::new(ObjectId::new(), "alice", None, "hello", None);
        let user = ObjectId::new();

        for text in ["first", "second", "third"] {
            let len_before = post.comments.len();
            post.add_comment(Comment::new(user, "bob", None, text));
            assert_eq!(post.comments.len(), len_before + 1);
        }

        let texts: Vec<_> = post.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }
}

// Token lifecycle tests
mod token_tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new("access-secret", "refresh-secret"))
    }

    fn user() -> User {
        User::new_local("test@example.com", "tester", "hash")
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let svc = service();
        let user = user();

        let token = svc.generate_refresh_token(&user).unwrap();
        let claims = svc.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_hex());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let svc = service();
        let mut token = svc.generate_refresh_token(&user()).unwrap();
        token.push('x');

        assert!(matches!(
            svc.validate_refresh_token(&token),
            Err(PlatformError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let svc = service();
        let other = AuthService::new(AuthConfig::new("other-access", "other-refresh"));

        let token = svc.generate_refresh_token(&user()).unwrap();
        assert!(other.validate_refresh_token(&token).is_err());
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let svc = service();
        let access = svc.generate_access_token(&user()).unwrap();
        assert!(svc.validate_refresh_token(&access).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut config = AuthConfig::new("access-secret", "refresh-secret");
        config.refresh_ttl_secs = -3600;
        let svc = AuthService::new(config);

        let token = svc.generate_refresh_token(&user()).unwrap();
        assert!(matches!(
            svc.validate_refresh_token(&token),
            Err(PlatformError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(service().validate_access_token("not-a-token").is_err());
        assert!(service().validate_refresh_token("").is_err());
    }
}

// Password hashing tests
mod password_tests {
    use super::*;

    #[test]
    fn test_verify_is_strict() {
        let svc = PasswordService::new();
        let hash = svc.hash_password("Pw123").unwrap();

        assert!(svc.verify_password("Pw123", &hash).unwrap());
        assert!(!svc.verify_password("pw123", &hash).unwrap());
        assert!(!svc.verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let svc = PasswordService::new();
        let hash = svc.hash_password("Pw123").unwrap();
        assert!(!hash.contains("Pw123"));
        assert!(hash.starts_with("$argon2"));
    }
}

// Error mapping tests
mod error_tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PlatformError::not_found("Post", "abc").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PlatformError::duplicate("User", "email", "a@x.com").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PlatformError::validation("Missing required fields").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PlatformError::InvalidCredentials.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PlatformError::invalid_assertion("Invalid token").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PlatformError::unauthorized("Authorization header required").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PlatformError::invalid_token("bad signature").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(PlatformError::TokenExpired.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            PlatformError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_wrong_password_and_unknown_email_share_one_shape() {
        // Both paths in the login flow return this exact variant, so a
        // caller cannot distinguish a present account from an absent one.
        let a = PlatformError::InvalidCredentials;
        let b = PlatformError::InvalidCredentials;
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.status(), b.status());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = PlatformError::not_found("Post", "abc123");
        assert!(err.to_string().contains("Post"));
        assert!(err.to_string().contains("abc123"));

        let err = PlatformError::duplicate("User", "email", "test@example.com");
        assert!(err.to_string().contains("email"));
        assert!(err.to_string().contains("test@example.com"));
    }
}

// API payload shape tests
mod dto_tests {
    use super::*;
    use ripple_platform::api::auth::UserResponse;
    use ripple_platform::api::posts::PostResponse;

    #[test]
    fn test_user_response_has_no_password() {
        let user = User::new_local("test@example.com", "tester", "super-secret-hash");
        let response: UserResponse = user.into();
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"email\""));
        assert!(json.contains("profileImage"));
        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_auth_provider_wire_values() {
        assert_eq!(serde_json::to_string(&AuthProvider::Local).unwrap(), "\"local\"");
        assert_eq!(serde_json::to_string(&AuthProvider::Google).unwrap(), "\"google\"");
    }

    #[test]
    fn test_post_response_uses_hex_ids() {
        let owner = ObjectId::new();
        let post = Post::new(owner, "alice", None, "hello", None);
        let id = post.id;

        let response: PostResponse = post.into();
        assert_eq!(response.id, id.to_hex());
        assert_eq!(response.user, owner.to_hex());
        assert!(response.likes.is_empty());
    }
}

// Blob store tests
mod blob_tests {
    use super::*;

    #[tokio::test]
    async fn test_disk_blob_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskBlobStore::new(dir.path(), "/uploads");

        let url = store
            .store("photo.PNG", bytes::Bytes::from_static(b"image-bytes"))
            .await
            .unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let file_name = url.rsplit('/').next().unwrap();
        let data = tokio::fs::read(dir.path().join(file_name)).await.unwrap();
        assert_eq!(data, b"image-bytes");
    }

    #[tokio::test]
    async fn test_disk_blob_store_drops_suspicious_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskBlobStore::new(dir.path(), "/uploads");

        let url = store
            .store("../../etc/passwd", bytes::Bytes::from_static(b"x"))
            .await
            .unwrap();
        let file_name = url.rsplit('/').next().unwrap();
        assert!(!file_name.contains(".."));
        assert!(dir.path().join(file_name).exists());
    }
}

// Federated identity bridge contract tests
mod identity_tests {
    use super::*;
    use ripple_platform::service::{IdentityVerifier, VerifiedIdentity};
    use std::sync::Arc;

    struct StaticVerifier;

    #[async_trait::async_trait]
    impl IdentityVerifier for StaticVerifier {
        async fn verify(&self, assertion: &str) -> ripple_platform::error::Result<VerifiedIdentity> {
            match assertion {
                "good" => Ok(VerifiedIdentity {
                    subject: "sub-1".to_string(),
                    email: Some("g@example.com".to_string()),
                    name: Some("Gina".to_string()),
                    picture: None,
                }),
                "no-email" => Ok(VerifiedIdentity {
                    subject: "sub-2".to_string(),
                    email: None,
                    name: None,
                    picture: None,
                }),
                _ => Err(PlatformError::invalid_assertion("Invalid token")),
            }
        }
    }

    #[tokio::test]
    async fn test_verifier_contract() {
        let verifier: Arc<dyn IdentityVerifier> = Arc::new(StaticVerifier);

        let identity = verifier.verify("good").await.unwrap();
        assert_eq!(identity.email.as_deref(), Some("g@example.com"));

        let identity = verifier.verify("no-email").await.unwrap();
        assert!(identity.email.is_none());

        assert!(matches!(
            verifier.verify("bad").await,
            Err(PlatformError::InvalidAssertion { .. })
        ));
    }
}
