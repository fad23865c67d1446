//! Blob Storage
//!
//! Uploaded images live behind a store-and-get-a-URL capability; the
//! core only persists the returned reference string. The default
//! implementation writes to a local uploads directory that the binary
//! serves statically.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::error::{PlatformError, Result};

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes`, returning the public URL reference.
    async fn store(&self, original_name: &str, bytes: Bytes) -> Result<String>;
}

/// Writes blobs under a local directory, naming them with a fresh
/// uuid plus the original extension, and returns
/// `{public_prefix}/{file}`.
pub struct DiskBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl DiskBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn store(&self, original_name: &str, bytes: Bytes) -> Result<String> {
        // Only the extension of the client-supplied name survives, and
        // only when it is plain ASCII alphanumeric.
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();
        let file_name = format!("{}{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.root).await.map_err(write_error)?;
        tokio::fs::write(self.root.join(&file_name), &bytes)
            .await
            .map_err(write_error)?;

        Ok(format!(
            "{}/{}",
            self.public_prefix.trim_end_matches('/'),
            file_name
        ))
    }
}

fn write_error(err: std::io::Error) -> PlatformError {
    PlatformError::internal(format!("blob write failed: {err}"))
}
