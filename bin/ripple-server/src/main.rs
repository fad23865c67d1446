//! Ripple Server
//!
//! Wires the platform crate to its runtime: configuration, MongoDB,
//! routers, static uploads, and the HTTP listener.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{Extension, Router};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ripple_platform::api::{
    assistant_router, auth_router, posts_router, AppState, AssistantState, AuthState, PostsState,
};
use ripple_platform::repository::{ensure_indexes, PostRepository, UserRepository};
use ripple_platform::service::{
    AuthConfig, AuthService, BlobStore, DiskBlobStore, GoogleTokenVerifier, IdentityVerifier,
    PasswordService,
};

/// Ripple social feed server
#[derive(Parser, Debug)]
#[command(name = "ripple-server")]
#[command(about = "Ripple - REST API for the social feed backend")]
struct Args {
    /// HTTP port
    #[arg(long, env = "RIPPLE_PORT", default_value = "5000")]
    port: u16,

    /// MongoDB connection string
    #[arg(long, env = "RIPPLE_MONGO_URI", default_value = "mongodb://localhost:27017")]
    mongo_uri: String,

    /// MongoDB database name
    #[arg(long, env = "RIPPLE_MONGO_DB", default_value = "ripple")]
    mongo_db: String,

    /// Access token signing secret
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: String,

    /// Refresh token signing secret
    #[arg(long, env = "JWT_REFRESH_SECRET")]
    jwt_refresh_secret: String,

    /// Directory for uploaded images
    #[arg(long, env = "RIPPLE_UPLOADS_DIR", default_value = "uploads")]
    uploads_dir: PathBuf,

    /// Expected audience for Google ID tokens (unchecked when unset)
    #[arg(long, env = "RIPPLE_GOOGLE_AUDIENCE")]
    google_audience: Option<String>,

    /// API key for the recipe assistant relay (route disabled when unset)
    #[arg(long, env = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let client = mongodb::Client::with_uri_str(&args.mongo_uri).await?;
    let db = client.database(&args.mongo_db);
    ensure_indexes(&db).await?;
    info!(db = %args.mongo_db, "connected to MongoDB");

    let user_repo = Arc::new(UserRepository::new(&db));
    let post_repo = Arc::new(PostRepository::new(&db));

    let auth_service = Arc::new(AuthService::new(AuthConfig::new(
        args.jwt_secret.clone(),
        args.jwt_refresh_secret.clone(),
    )));
    let password_service = Arc::new(PasswordService::new());
    let identity_verifier: Arc<dyn IdentityVerifier> =
        Arc::new(GoogleTokenVerifier::new(args.google_audience.clone()));
    let blob_store: Arc<dyn BlobStore> =
        Arc::new(DiskBlobStore::new(args.uploads_dir.clone(), "/uploads"));

    let auth_state = AuthState {
        user_repo,
        auth_service: auth_service.clone(),
        password_service,
        identity_verifier,
        blob_store: blob_store.clone(),
    };
    let posts_state = PostsState {
        post_repo,
        blob_store,
    };

    let mut api = Router::new()
        .nest("/api/auth", auth_router(auth_state))
        .nest("/api/posts", posts_router(posts_state));

    if let Some(api_key) = args.openai_api_key {
        api = api.nest("/api", assistant_router(AssistantState::new(api_key)));
    }

    let app = api
        .nest_service("/uploads", ServeDir::new(&args.uploads_dir))
        .layer(Extension(AppState { auth_service }))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    info!(port = args.port, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutting down");
}
