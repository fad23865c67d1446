//! API Layer
//!
//! REST endpoints: auth, posts, and the assistant relay.

pub mod assistant;
pub mod auth;
pub mod common;
pub mod middleware;
pub mod posts;

pub use common::{ApiError, ApiResult, MessageResponse};
pub use middleware::{AppState, AuthContext, Authenticated};

pub use assistant::{assistant_router, AssistantState};
pub use auth::{auth_router, AuthState};
pub use posts::{posts_router, PostsState};
