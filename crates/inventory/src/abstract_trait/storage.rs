use async_trait::async_trait;
use shared::{errors::ServiceError, utils::DecodedFile};
use std::sync::Arc;

pub type DynFileStorage = Arc<dyn FileStorageTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorageTrait {
    /// Stores `file` under `prefix` and returns its path relative to the media
    /// root. Existing files are never overwritten.
    async fn save(&self, prefix: &str, file: &DecodedFile) -> Result<String, ServiceError>;

    /// Removes a file previously returned by `save`. Missing files are fine.
    async fn remove(&self, path: &str) -> Result<(), ServiceError>;
}
