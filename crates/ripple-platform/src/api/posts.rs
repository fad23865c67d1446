//! Posts API Endpoints
//!
//! Feed interaction surface:
//! - POST   /                  - Create a post (multipart)
//! - PUT    /like/:postId      - Toggle a like
//! - POST   /comment/:postId   - Append a comment
//! - GET    /                  - List all posts, newest first
//! - GET    /user/:userId      - List posts by owner
//! - PUT    /:postId           - Update content/image (multipart)
//! - DELETE /:postId           - Delete a post
//!
//! Every route requires a valid access token; none of them checks
//! ownership beyond that.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::api::common::{field_bytes, field_text, next_field, ApiResult, MessageResponse};
use crate::api::middleware::Authenticated;
use crate::domain::{Comment, Post};
use crate::error::PlatformError;
use crate::repository::PostRepository;
use crate::service::BlobStore;

/// Posts service state
#[derive(Clone)]
pub struct PostsState {
    pub post_repo: Arc<PostRepository>,
    pub blob_store: Arc<dyn BlobStore>,
}

/// Toggle-like request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    #[serde(default)]
    pub user_id: String,
}

/// Comment request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// Comment payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub user: String,
    pub username: String,
    pub avatar: Option<String>,
    pub text: String,
    pub created_at: String,
}

impl From<&Comment> for CommentResponse {
    fn from(c: &Comment) -> Self {
        Self {
            user: c.user.to_hex(),
            username: c.username.clone(),
            avatar: c.avatar.clone(),
            text: c.text.clone(),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Post payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user: String,
    pub username: String,
    pub avatar: Option<String>,
    pub content: String,
    pub image: Option<String>,
    pub likes: Vec<String>,
    pub comments: Vec<CommentResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(p: Post) -> Self {
        Self {
            id: p.id.to_hex(),
            user: p.user.to_hex(),
            username: p.username,
            avatar: p.avatar,
            content: p.content,
            image: p.image,
            likes: p.likes.iter().map(|id| id.to_hex()).collect(),
            comments: p.comments.iter().map(Into::into).collect(),
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

fn parse_post_id(raw: &str) -> Result<ObjectId, PlatformError> {
    ObjectId::parse_str(raw).map_err(|_| PlatformError::validation("Invalid post ID"))
}

fn parse_user_id(raw: &str) -> Result<ObjectId, PlatformError> {
    ObjectId::parse_str(raw).map_err(|_| PlatformError::validation("Invalid user ID"))
}

/// Create a post (multipart: content, userId, username, avatar?, image?)
pub async fn create_post(
    State(state): State<PostsState>,
    Authenticated(_ctx): Authenticated,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PostResponse>), PlatformError> {
    let mut content = String::new();
    let mut user_id = String::new();
    let mut username = String::new();
    let mut avatar: Option<String> = None;
    let mut image: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        match field.name() {
            Some("content") => content = field_text(field).await?,
            Some("userId") => user_id = field_text(field).await?,
            Some("username") => username = field_text(field).await?,
            Some("avatar") => avatar = Some(field_text(field).await?).filter(|a| !a.is_empty()),
            Some("image") => {
                let (name, bytes) = field_bytes(field).await?;
                image = Some(state.blob_store.store(&name, bytes).await?);
            }
            _ => {}
        }
    }

    debug!(user_id = %user_id, "received post request");

    if content.is_empty() || user_id.is_empty() || username.is_empty() {
        return Err(PlatformError::validation("Missing required fields"));
    }
    let owner = parse_user_id(&user_id)?;

    let post = Post::new(owner, username, avatar, content, image);
    state.post_repo.insert(&post).await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// Like or unlike a post: a single toggle, not separate endpoints
pub async fn toggle_like(
    State(state): State<PostsState>,
    Authenticated(_ctx): Authenticated,
    Path(post_id): Path<String>,
    Json(req): Json<ToggleLikeRequest>,
) -> ApiResult<PostResponse> {
    if req.user_id.is_empty() {
        return Err(PlatformError::validation("User ID is required"));
    }
    let user = parse_user_id(&req.user_id)?;
    let post = parse_post_id(&post_id)?;

    let updated = state
        .post_repo
        .toggle_like(post, user)
        .await?
        .ok_or_else(|| PlatformError::not_found("Post", &post_id))?;

    Ok(Json(updated.into()))
}

/// Append a comment
pub async fn add_comment(
    State(state): State<PostsState>,
    Authenticated(_ctx): Authenticated,
    Path(post_id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<PostResponse> {
    if req.user_id.is_empty() || req.username.is_empty() || req.text.is_empty() {
        return Err(PlatformError::validation("Missing required fields"));
    }
    let user = parse_user_id(&req.user_id)?;
    let post = parse_post_id(&post_id)?;

    let comment = Comment::new(
        user,
        req.username,
        req.avatar.filter(|a| !a.is_empty()),
        req.text,
    );
    let updated = state
        .post_repo
        .push_comment(post, &comment)
        .await?
        .ok_or_else(|| PlatformError::not_found("Post", &post_id))?;

    Ok(Json(updated.into()))
}

/// All posts, newest first
pub async fn list_posts(
    State(state): State<PostsState>,
    Authenticated(_ctx): Authenticated,
) -> ApiResult<Vec<PostResponse>> {
    let posts = state.post_repo.find_all().await?;
    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// Posts owned by one user, newest first
pub async fn list_user_posts(
    State(state): State<PostsState>,
    Authenticated(_ctx): Authenticated,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<PostResponse>> {
    let owner = parse_user_id(&user_id)?;
    let posts = state.post_repo.find_by_user(owner).await?;
    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

/// Replace the content, optionally replacing the image
pub async fn update_post(
    State(state): State<PostsState>,
    Authenticated(_ctx): Authenticated,
    Path(post_id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<PostResponse> {
    let mut content = String::new();
    let mut image: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        match field.name() {
            Some("content") => content = field_text(field).await?,
            Some("image") => {
                let (name, bytes) = field_bytes(field).await?;
                image = Some(state.blob_store.store(&name, bytes).await?);
            }
            _ => {}
        }
    }

    if content.is_empty() {
        return Err(PlatformError::validation("Content is required"));
    }
    let id = parse_post_id(&post_id)?;

    let updated = state
        .post_repo
        .update_content(id, &content, image.as_deref())
        .await?
        .ok_or_else(|| PlatformError::not_found("Post", &post_id))?;

    Ok(Json(updated.into()))
}

/// Delete a post permanently
pub async fn delete_post(
    State(state): State<PostsState>,
    Authenticated(_ctx): Authenticated,
    Path(post_id): Path<String>,
) -> ApiResult<MessageResponse> {
    let id = parse_post_id(&post_id)?;
    if !state.post_repo.delete(id).await? {
        return Err(PlatformError::not_found("Post", &post_id));
    }
    Ok(Json(MessageResponse::new("Post deleted")))
}

/// Create the posts router
pub fn posts_router(state: PostsState) -> Router {
    Router::new()
        .route("/", post(create_post).get(list_posts))
        .route("/like/:post_id", put(toggle_like))
        .route("/comment/:post_id", post(add_comment))
        .route("/user/:user_id", get(list_user_posts))
        .route("/:post_id", put(update_post).delete(delete_post))
        .with_state(state)
}
