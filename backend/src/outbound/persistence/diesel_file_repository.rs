//! PostgreSQL-backed file metadata repository.
//!
//! Unlike the other tables, `files` records deletion in a nullable
//! `deleted_at` column, so the active filter is `deleted_at IS NULL`.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::{EntityRepository, RepositoryError};
use crate::domain::{EntityId, FileFilter, FileRecord, Persisted};

use super::diesel_support::{map_diesel_error, next_stamp};
use super::models::{FileChanges, FileRow, NewFileRow};
use super::pool::DbPool;
use super::schema::files;

#[derive(Clone)]
pub struct DieselFileRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselFileRepository {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl EntityRepository<FileRecord> for DieselFileRepository {
    async fn create(
        &self,
        meta: Option<Value>,
        data: FileRecord,
    ) -> Result<Persisted<FileRecord>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let row = NewFileRow {
            id: Uuid::new_v4(),
            changes: FileChanges::new(meta, &data),
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(files::table)
            .values(&row)
            .returning(FileRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .try_into()
    }

    async fn get(
        &self,
        filter: &FileFilter,
    ) -> Result<Vec<Persisted<FileRecord>>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let mut query = files::table.select(FileRow::as_select()).into_boxed();
        if !filter.scope.include_deleted {
            query = query.filter(files::deleted_at.is_null());
        }
        if let Some(id) = filter.scope.id {
            query = query.filter(files::id.eq(*id.as_uuid()));
        }
        if let Some(uploader_id) = filter.uploader_id {
            query = query.filter(files::uploader_id.eq(*uploader_id.as_uuid()));
        }
        if let Some(purpose) = filter.purpose {
            query = query.filter(files::purpose.eq(purpose.as_str()));
        }
        if let Some(checksum) = filter.checksum.as_ref() {
            query = query.filter(files::checksum.eq(checksum.as_str().to_owned()));
        }
        if let Some(storage_path) = filter.storage_path.as_ref() {
            query = query.filter(files::storage_path.eq(storage_path.as_str().to_owned()));
        }
        if let Some(mime_type) = filter.mime_type.clone() {
            query = query.filter(files::mime_type.eq(mime_type));
        }
        if let Some(is_public) = filter.is_public {
            query = query.filter(files::is_public.eq(is_public));
        }
        query
            .order((files::created_at.asc(), files::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(Persisted::try_from)
            .collect()
    }

    async fn update(
        &self,
        record: &Persisted<FileRecord>,
    ) -> Result<Persisted<FileRecord>, RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let changes = FileChanges::new(record.header.meta.clone(), &record.data);
        diesel::update(
            files::table
                .filter(files::id.eq(*record.id().as_uuid()))
                .filter(files::deleted_at.is_null()),
        )
        .set((&changes, files::updated_at.eq(next_stamp!(now))))
        .returning(FileRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?
        .ok_or_else(|| RepositoryError::not_found(record.id()))?
        .try_into()
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await?;
        let now = self.clock.utc();
        let affected = diesel::update(
            files::table
                .filter(files::id.eq(*id.as_uuid()))
                .filter(files::deleted_at.is_null()),
        )
        .set((
            files::deleted_at.eq(next_stamp!(now).nullable()),
            files::updated_at.eq(next_stamp!(now)),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(RepositoryError::not_found(*id));
        }
        Ok(())
    }
}
