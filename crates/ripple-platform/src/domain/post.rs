//! Post and Comment Entities

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment embedded in a post. Append-only: there is no edit or
/// delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Commenting user
    pub user: ObjectId,

    /// Commenter snapshot captured at write time
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    pub text: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        user: ObjectId,
        username: impl Into<String>,
        avatar: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user,
            username: username.into(),
            avatar,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Feed post with its like-set and comment thread
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Owning user
    pub user: ObjectId,

    /// Author snapshot captured at creation. Synced only through the
    /// explicit batch propagation hook, never automatically.
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Liker set: insertion-ordered, never holds the same id twice
    #[serde(default)]
    pub likes: Vec<ObjectId>,

    #[serde(default)]
    pub comments: Vec<Comment>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        user: ObjectId,
        username: impl Into<String>,
        avatar: Option<String>,
        content: impl Into<String>,
        image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            user,
            username: username.into(),
            avatar,
            content: content.into(),
            image,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Flip `user_id`'s membership in the like-set. Returns true when
    /// the user ends up liking the post.
    ///
    /// This is the in-memory model of the transition; the repository
    /// applies the same transition as a single guarded store update.
    pub fn toggle_like(&mut self, user_id: ObjectId) -> bool {
        self.updated_at = Utc::now();
        if let Some(idx) = self.likes.iter().position(|u| *u == user_id) {
            self.likes.remove(idx);
            false
        } else {
            self.likes.push(user_id);
            true
        }
    }

    pub fn liked_by(&self, user_id: &ObjectId) -> bool {
        self.likes.contains(user_id)
    }

    /// Append a comment to the thread.
    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_like_flips_membership() {
        let mut post = Post::new(ObjectId::new(), "alice", None, "hello", None);
        let user = ObjectId::new();

        assert!(post.toggle_like(user));
        assert!(post.liked_by(&user));
        assert!(!post.toggle_like(user));
        assert!(!post.liked_by(&user));
    }

    #[test]
    fn test_like_set_never_duplicates() {
        let mut post = Post::new(ObjectId::new(), "alice", None, "hello", None);
        let user = ObjectId::new();

        post.toggle_like(user);
        post.toggle_like(user);
        post.toggle_like(user);

        assert_eq!(post.likes.iter().filter(|u| **u == user).count(), 1);
    }

    #[test]
    fn test_comments_are_append_only_and_ordered() {
        let mut post = Post::new(ObjectId::new(), "alice", None, "hello", None);
        let user = ObjectId::new();

        post.add_comment(Comment::new(user, "bob", None, "first"));
        post.add_comment(Comment::new(user, "bob", None, "second"));

        assert_eq!(post.comments.len(), 2);
        assert_eq!(post.comments[0].text, "first");
        assert_eq!(post.comments[1].text, "second");
    }
}
