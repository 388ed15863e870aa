//! File service: metadata registration, content-addressed uploads and
//! deletion.
//!
//! Upload items are independent. An item that fails is reported in the batch
//! errors while its siblings continue; menu-image forwarding failures become
//! warnings because the file is already stored and recorded.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BlobStorage, EntityRepository, FileLibrary, FileRegistration, MenuImagePipeline,
    MenuImageSubmission, UploadBatch, UploadItem, UploadReport,
};
use crate::domain::reference::ReferenceValidator;
use crate::domain::service_support;
use crate::domain::{
    Checksum, EntityId, EntityKind, Error, FileFilter, FilePatch, FilePurpose, FileRecord,
    ImageDimensions, Persisted, RecordFilter, StoragePath, WithWarnings, is_image_mime,
    validate_file,
};

/// Implements [`FileLibrary`] over metadata and blob storage.
#[derive(Clone)]
pub struct FileLibraryService {
    files: Arc<dyn EntityRepository<FileRecord>>,
    blobs: Arc<dyn BlobStorage>,
    references: ReferenceValidator,
    pipeline: Arc<dyn MenuImagePipeline>,
}

impl FileLibraryService {
    pub fn new(
        files: Arc<dyn EntityRepository<FileRecord>>,
        blobs: Arc<dyn BlobStorage>,
        references: ReferenceValidator,
        pipeline: Arc<dyn MenuImagePipeline>,
    ) -> Self {
        Self {
            files,
            blobs,
            references,
            pipeline,
        }
    }

    /// Active file already holding `checksum`, if any.
    async fn find_duplicate(
        &self,
        checksum: &Checksum,
    ) -> Result<Option<Persisted<FileRecord>>, Error> {
        let filter = FileFilter::by_checksum(checksum.clone());
        let matches = service_support::list(self.files.as_ref(), &filter).await?;
        Ok(matches.into_iter().next())
    }

    /// Store one item. The error is the reason the item was skipped.
    async fn store_item(
        &self,
        batch: &UploadBatch,
        item: &UploadItem,
        warnings: &mut Vec<String>,
    ) -> Result<Persisted<FileRecord>, String> {
        let purpose = item
            .purpose
            .parse::<FilePurpose>()
            .map_err(|error| error.to_string())?;
        if item.content.is_empty() {
            return Err("file is empty".to_owned());
        }
        if purpose.is_forwarded() && batch.restaurant_id.is_none() {
            return Err("restaurant_id is required for menu images".to_owned());
        }

        let checksum = Checksum::of(&item.content);
        if let Some(existing) = self
            .find_duplicate(&checksum)
            .await
            .map_err(|error| error.message().to_owned())?
        {
            debug!(file_id = %existing.id(), %checksum, "upload deduplicated");
            return Ok(existing);
        }

        let storage_path = StoragePath::allocate(purpose, &item.filename);
        self.blobs
            .put(&storage_path, item.content.clone())
            .await
            .map_err(|error| format!("failed to store file: {error}"))?;

        let dimensions = if is_image_mime(&item.mime_type) {
            ImageDimensions::detect(&item.content)
        } else {
            None
        };
        let record = FileRecord {
            uploader_id: batch.uploader_id,
            storage_path: storage_path.clone(),
            filename: item.filename.clone(),
            mime_type: item.mime_type.clone(),
            size_bytes: i64::try_from(item.content.len()).unwrap_or(i64::MAX),
            checksum,
            purpose,
            is_public: batch.is_public,
            dimensions,
        };
        let stored = match self.record_upload(record).await {
            Ok(stored) => stored,
            Err(error) => {
                self.discard_blob(&storage_path).await;
                return Err(format!("failed to record file: {}", error.message()));
            }
        };
        info!(file_id = %stored.id(), path = %storage_path, %purpose, "file stored");

        if let Some(restaurant_id) = batch.restaurant_id.filter(|_| purpose.is_forwarded()) {
            self.forward_menu_image(&stored, restaurant_id, item, warnings)
                .await;
        }
        Ok(stored)
    }

    async fn record_upload(&self, record: FileRecord) -> Result<Persisted<FileRecord>, Error> {
        validate_file(&record)?;
        service_support::create(self.files.as_ref(), None, record).await
    }

    /// Remove a blob whose metadata could not be written.
    async fn discard_blob(&self, path: &StoragePath) {
        if let Err(error) = self.blobs.remove(path).await {
            warn!(%path, error = %error, "orphaned upload left in storage");
        }
    }

    async fn forward_menu_image(
        &self,
        stored: &Persisted<FileRecord>,
        restaurant_id: EntityId,
        item: &UploadItem,
        warnings: &mut Vec<String>,
    ) {
        let submission = MenuImageSubmission {
            restaurant_id,
            filename: item.filename.clone(),
            mime_type: item.mime_type.clone(),
            content: item.content.clone(),
        };
        if let Err(error) = self.pipeline.submit_menu_image(&submission).await {
            warn!(
                file_id = %stored.id(),
                %restaurant_id,
                error_kind = error.variant_name(),
                error = %error,
                "menu image forwarding failed"
            );
            warnings.push(format!(
                "{}: uploaded, but failed to forward the menu image for processing: {error}",
                item.filename
            ));
        }
    }
}

#[async_trait]
impl FileLibrary for FileLibraryService {
    async fn register_file(
        &self,
        meta: Option<Value>,
        file: FileRecord,
    ) -> Result<FileRegistration, Error> {
        validate_file(&file)?;
        self.references
            .require("uploader_id", EntityKind::User, &file.uploader_id)
            .await?;
        if let Some(existing) = self.find_duplicate(&file.checksum).await? {
            return Ok(FileRegistration {
                file: existing,
                deduplicated: true,
            });
        }
        let holders = service_support::list(
            self.files.as_ref(),
            &FileFilter::by_storage_path(file.storage_path.clone()),
        )
        .await?;
        if let Some(holder) = holders.first() {
            return Err(Error::invalid_request(format!(
                "storage_path {} is already held by file {}",
                file.storage_path,
                holder.id()
            ))
            .with_details(json!({
                "field": "storage_path",
                "file_id": holder.id(),
            })));
        }
        let created = service_support::create(self.files.as_ref(), meta, file).await?;
        Ok(FileRegistration {
            file: created,
            deduplicated: false,
        })
    }

    async fn upload_files(&self, batch: UploadBatch) -> Result<UploadReport, Error> {
        self.references
            .require("uploader_id", EntityKind::User, &batch.uploader_id)
            .await?;

        let mut report = UploadReport::default();
        for item in &batch.items {
            match self.store_item(&batch, item, &mut report.warnings).await {
                Ok(stored) => report.uploaded.push(stored),
                Err(reason) => {
                    let message = format!("{}: {reason}", item.filename);
                    warn!(uploader_id = %batch.uploader_id, %message, "upload item failed");
                    report.errors.push(message);
                }
            }
        }
        Ok(report)
    }

    async fn list_files(&self, filter: FileFilter) -> Result<Vec<Persisted<FileRecord>>, Error> {
        service_support::list(self.files.as_ref(), &filter).await
    }

    async fn update_file(
        &self,
        id: EntityId,
        patch: FilePatch,
    ) -> Result<Persisted<FileRecord>, Error> {
        let current = service_support::fetch_active(self.files.as_ref(), id).await?;
        let next = patch.apply(current.data.clone());
        validate_file(&next)?;
        let record = service_support::revise(current, next, patch.meta);
        service_support::update(self.files.as_ref(), &record).await
    }

    async fn delete_file(&self, id: EntityId) -> Result<WithWarnings<()>, Error> {
        service_support::delete(self.files.as_ref(), id).await?;
        let filter = FileFilter::by_id(id).including_deleted();
        let deleted = service_support::list(self.files.as_ref(), &filter).await?;

        let mut outcome = WithWarnings::new(());
        let Some(record) = deleted.first() else {
            return Ok(outcome);
        };
        if let Err(error) = self.blobs.remove(&record.storage_path).await {
            warn!(
                file_id = %id,
                path = %record.storage_path,
                error = %error,
                "blob removal failed"
            );
            outcome.warn(format!(
                "File metadata deleted, but failed to delete physical file: {error}"
            ));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "file_service_tests.rs"]
mod tests;
