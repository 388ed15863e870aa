//! Driving port for the file service.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::domain::{
    EntityId, Error, FileFilter, FilePatch, FileRecord, Persisted, WithWarnings,
};

/// Result of registering file metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRegistration {
    pub file: Persisted<FileRecord>,
    /// `true` when an active file with the same checksum was returned instead
    /// of creating a new record.
    pub deduplicated: bool,
}

/// One uploaded payload awaiting storage.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadItem {
    pub filename: String,
    pub mime_type: String,
    /// Raw purpose value; parsed per item so one bad value does not fail the
    /// batch.
    pub purpose: String,
    pub content: Bytes,
}

/// A multi-file upload sharing one uploader.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadBatch {
    pub uploader_id: EntityId,
    pub restaurant_id: Option<EntityId>,
    pub is_public: bool,
    pub items: Vec<UploadItem>,
}

/// Per-batch outcome. Items succeed or fail independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadReport {
    pub uploaded: Vec<Persisted<FileRecord>>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl UploadReport {
    /// A batch succeeds when at least one item was stored or deduplicated.
    #[must_use]
    pub fn any_succeeded(&self) -> bool {
        !self.uploaded.is_empty()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileLibrary: Send + Sync {
    /// Register metadata for content stored out of band.
    async fn register_file(
        &self,
        meta: Option<Value>,
        file: FileRecord,
    ) -> Result<FileRegistration, Error>;

    /// Store a batch of payloads. Batch-level failures (such as an invalid
    /// uploader) are returned as `Err`; item failures land in the report.
    async fn upload_files(&self, batch: UploadBatch) -> Result<UploadReport, Error>;

    async fn list_files(&self, filter: FileFilter) -> Result<Vec<Persisted<FileRecord>>, Error>;

    async fn update_file(&self, id: EntityId, patch: FilePatch)
    -> Result<Persisted<FileRecord>, Error>;

    /// Remove metadata first, then the blob. A failed blob removal is a
    /// warning: the metadata deletion is kept.
    async fn delete_file(&self, id: EntityId) -> Result<WithWarnings<()>, Error>;
}
