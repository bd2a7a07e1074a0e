//! Pluggable storage for uploaded images.
//!
//! Handlers talk to [`BlobStore`] only; whether bytes land on the local disk
//! or a remote object service is decided once at startup. Stored blobs are
//! addressed by the URL `store` returns, which is also the handle `delete`
//! takes back.

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Bytes;
use uuid::Uuid;

mod disk;
mod remote;

pub use disk::DiskBlobStore;
pub use remote::RemoteBlobStore;

/// Upload cap enforced before bytes reach a backend.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: &[(&str, &str)] = &[("image/jpeg", "jpg"), ("image/png", "png")];

/// File extension for an accepted image content type, `None` for anything
/// else.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under a fresh key below `key_hint` and return the URL
    /// the blob is served from.
    async fn store(&self, bytes: Bytes, content_type: &str, key_hint: &str) -> Result<String>;

    /// Remove a previously stored blob. Deleting a blob that is already gone
    /// is not an error.
    async fn delete(&self, url: &str) -> Result<()>;
}

fn object_key(key_hint: &str, content_type: &str) -> Result<String> {
    let ext = extension_for(content_type)
        .ok_or_else(|| anyhow::anyhow!("unsupported content type: {content_type}"))?;
    Ok(format!("{key_hint}/{}.{ext}", Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_cover_accepted_image_types() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/gif"), None);
        assert_eq!(extension_for("application/pdf"), None);
    }

    #[test]
    fn object_keys_are_unique_per_call() {
        let first = object_key("event-banners", "image/png").unwrap();
        let second = object_key("event-banners", "image/png").unwrap();
        assert!(first.starts_with("event-banners/"));
        assert!(first.ends_with(".png"));
        assert_ne!(first, second);
    }

    #[test]
    fn object_key_rejects_unknown_content_type() {
        assert!(object_key("event-banners", "text/html").is_err());
    }
}
