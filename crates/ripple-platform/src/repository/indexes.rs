//! Collection Index Bootstrap
//!
//! Email uniqueness is enforced by the store itself; the service
//! layer's duplicate check only produces the friendlier error first.

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};

use crate::domain::{Post, User};
use crate::error::Result;

pub async fn ensure_indexes(db: &Database) -> Result<()> {
    let users = db.collection::<User>("users");
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        )
        .await?;

    let posts = db.collection::<Post>("posts");
    posts
        .create_index(IndexModel::builder().keys(doc! { "user": 1 }).build())
        .await?;
    posts
        .create_index(IndexModel::builder().keys(doc! { "createdAt": -1 }).build())
        .await?;

    Ok(())
}
