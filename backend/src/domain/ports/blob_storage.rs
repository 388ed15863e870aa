//! Driven port for physical file content.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::StoragePath;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blob storage adapters.
    pub enum BlobStorageError {
        /// Reading or writing the backing store failed.
        Io { path: String, message: String } => "blob storage I/O failed for {path}: {message}",
        /// The adapter refused the path.
        InvalidPath { path: String } => "blob storage rejected path {path}",
    }
}

/// Byte storage addressed by [`StoragePath`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write a complete payload, creating parent directories as needed.
    async fn put(&self, path: &StoragePath, content: Bytes) -> Result<(), BlobStorageError>;

    /// Remove a payload. Removing a missing blob is an error.
    async fn remove(&self, path: &StoragePath) -> Result<(), BlobStorageError>;
}
