//! Domain Models
//!
//! Core entities for accounts and the feed. All entities use BSON
//! ObjectIds for `_id` and are stored as camelCase documents.

pub mod post;
pub mod user;

pub use post::*;
pub use user::*;
