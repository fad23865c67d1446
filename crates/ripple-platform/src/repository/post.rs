//! Post Repository
//!
//! Every mutation is a single atomic update operation, never a
//! fetch-mutate-replace cycle, so concurrent writers against the same
//! post cannot lose each other's changes.

use bson::oid::ObjectId;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Collection, Database,
};

use crate::domain::{Comment, Post};
use crate::error::Result;

pub struct PostRepository {
    collection: Collection<Post>,
}

impl PostRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("posts"),
        }
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    pub async fn insert(&self, post: &Post) -> Result<()> {
        self.collection.insert_one(post).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<Post>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// All posts, newest first.
    pub async fn find_all(&self) -> Result<Vec<Post>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Posts owned by `user_id`, newest first.
    pub async fn find_by_user(&self, user_id: ObjectId) -> Result<Vec<Post>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "user": user_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Flip `user_id`'s membership in the post's like-set.
    ///
    /// Two guarded updates instead of a read-modify-write: the first
    /// adds the id only while it is absent, the second removes it only
    /// while present. Whichever guard matches applies atomically, so a
    /// concurrent toggle from the same user falls through to the other
    /// branch instead of overwriting it. Returns `None` when the post
    /// does not exist.
    pub async fn toggle_like(&self, post_id: ObjectId, user_id: ObjectId) -> Result<Option<Post>> {
        let now = bson::DateTime::from_chrono(Utc::now());

        let liked = self
            .collection
            .find_one_and_update(
                doc! { "_id": post_id, "likes": { "$ne": user_id } },
                doc! { "$addToSet": { "likes": user_id }, "$set": { "updatedAt": now } },
            )
            .with_options(Self::return_updated())
            .await?;
        if liked.is_some() {
            return Ok(liked);
        }

        let unliked = self
            .collection
            .find_one_and_update(
                doc! { "_id": post_id, "likes": user_id },
                doc! { "$pull": { "likes": user_id }, "$set": { "updatedAt": now } },
            )
            .with_options(Self::return_updated())
            .await?;
        Ok(unliked)
    }

    /// Append a comment atomically. Returns `None` when the post does
    /// not exist.
    pub async fn push_comment(&self, post_id: ObjectId, comment: &Comment) -> Result<Option<Post>> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": post_id },
                doc! {
                    "$push": { "comments": bson::to_bson(comment)? },
                    "$set": { "updatedAt": now },
                },
            )
            .with_options(Self::return_updated())
            .await?;
        Ok(updated)
    }

    /// Replace the content; replace the image reference only when a
    /// new one is supplied.
    pub async fn update_content(
        &self,
        post_id: ObjectId,
        content: &str,
        image: Option<&str>,
    ) -> Result<Option<Post>> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let mut set = doc! { "content": content, "updatedAt": now };
        if let Some(image) = image {
            set.insert("image", image);
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": post_id }, doc! { "$set": set })
            .with_options(Self::return_updated())
            .await?;
        Ok(updated)
    }

    pub async fn delete(&self, post_id: ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": post_id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Batch hook: rewrite the denormalized author snapshot on every
    /// post owned by `user_id`. Triggered by an external collaborator
    /// after a profile change, never automatically by the core.
    pub async fn refresh_author_snapshot(
        &self,
        user_id: ObjectId,
        username: &str,
        avatar: Option<&str>,
    ) -> Result<u64> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let mut set = doc! { "username": username, "updatedAt": now };
        if let Some(avatar) = avatar {
            set.insert("avatar", avatar);
        }

        let result = self
            .collection
            .update_many(doc! { "user": user_id }, doc! { "$set": set })
            .await?;
        Ok(result.modified_count)
    }
}
