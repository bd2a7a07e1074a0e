//! Local filesystem backend. Blobs live under the uploads directory and are
//! served back by the static `/uploads` route.

use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use axum::body::Bytes;
use tokio::fs;
use tracing::debug;

use super::{BlobStore, object_key};

pub struct DiskBlobStore {
    root: PathBuf,
}

impl DiskBlobStore {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Translate a public `/uploads/...` URL back to the on-disk key.
    fn key_from_url(url: &str) -> Result<&str> {
        let key = url
            .strip_prefix("/uploads/")
            .ok_or_else(|| anyhow!("not a local upload url: {url}"))?;
        if key.is_empty() || key.split('/').any(|segment| segment.is_empty() || segment == "..") {
            return Err(anyhow!("malformed upload url: {url}"));
        }
        Ok(key)
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn store(&self, bytes: Bytes, content_type: &str, key_hint: &str) -> Result<String> {
        let key = object_key(key_hint, content_type)?;
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!("stored {} bytes at {}", bytes.len(), path.display());

        Ok(format!("/uploads/{key}"))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let key = Self::key_from_url(url)?;
        match fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("failed to delete {url}")),
        }
    }
}
