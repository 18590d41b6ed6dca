use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Invalid blob key: {0}")]
    InvalidKey(String),

    #[error("Blob write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Seam for blob storage. Implementations persist the bytes under the given
/// key and return a publicly reachable URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, BlobError>;
}

/// Filesystem-backed blob store serving files from a static directory
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    // Keys are caller-assembled; refuse anything that could escape the root.
    fn validate_key(key: &str) -> Result<&Path, BlobError> {
        let path = Path::new(key);
        let safe = !key.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, BlobError> {
        let relative = Self::validate_key(key)?;
        let destination = self.root.join(relative);

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&destination, bytes).await?;

        Ok(format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            key
        ))
    }
}
