//! Product image storage on the local filesystem.
//!
//! Images are written below the uploads directory, which the storefront
//! serves at `/uploads`.

use std::path::{Component, Path, PathBuf};

use ecommers_core::store::{ObjectStore, ObjectStoreError};

/// [`ObjectStore`] writing to a directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Resolve `key` below the root, refusing anything that could escape it.
    fn path_for(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        let relative = Path::new(key);
        let plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(ObjectStoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ObjectStoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(key, content_type, size = bytes.len(), "Stored object");
        Ok(format!("{}/{key}", self.public_base_url))
    }
}
