//! Repository Layer
//!
//! MongoDB repositories for all domain entities.

pub mod indexes;
pub mod post;
pub mod user;

pub use indexes::ensure_indexes;
pub use post::PostRepository;
pub use user::UserRepository;
