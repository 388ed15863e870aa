//! In-process repository adapter.
//!
//! Applies the same filter, ordering and soft-delete semantics as the Diesel
//! adapters by delegating matching to the domain filter types. Used by the
//! test suites and by behaviour scenarios that run a service without
//! Postgres.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;

use crate::domain::ports::{EntityRepository, RepositoryError};
use crate::domain::{
    DeletionState, EntityData, EntityId, Persisted, RecordFilter, RecordHeader,
    next_update_timestamp,
};

/// Repository storing records in insertion order.
pub struct InMemoryRepository<T> {
    records: Mutex<Vec<Persisted<T>>>,
    clock: Arc<dyn Clock>,
}

impl<T> InMemoryRepository<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Persisted<T>>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::connection("in-memory store poisoned"))
    }
}

impl<T: Clone> InMemoryRepository<T> {
    /// Every stored record, deleted ones included.
    pub fn snapshot(&self) -> Vec<Persisted<T>> {
        self.lock().map(|records| records.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl<T: EntityData> EntityRepository<T> for InMemoryRepository<T> {
    async fn create(&self, meta: Option<Value>, data: T) -> Result<Persisted<T>, RepositoryError> {
        let record = Persisted {
            header: RecordHeader::created(EntityId::random(), meta, self.clock.utc()),
            data,
        };
        self.lock()?.push(record.clone());
        Ok(record)
    }

    async fn get(&self, filter: &T::Filter) -> Result<Vec<Persisted<T>>, RepositoryError> {
        let records = self.lock()?;
        Ok(records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn update(&self, record: &Persisted<T>) -> Result<Persisted<T>, RepositoryError> {
        let now = self.clock.utc();
        let mut records = self.lock()?;
        let stored = records
            .iter_mut()
            .find(|stored| stored.id() == record.id() && stored.is_active())
            .ok_or_else(|| RepositoryError::not_found(record.id()))?;
        stored.data = record.data.clone();
        stored.header.meta.clone_from(&record.header.meta);
        stored.header.updated_at = next_update_timestamp(stored.header.updated_at, now);
        Ok(stored.clone())
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        let now = self.clock.utc();
        let mut records = self.lock()?;
        let stored = records
            .iter_mut()
            .find(|stored| stored.id() == *id && stored.is_active())
            .ok_or_else(|| RepositoryError::not_found(*id))?;
        let at = next_update_timestamp(stored.header.updated_at, now);
        stored.data.retire();
        stored.header.updated_at = at;
        stored.header.deletion = DeletionState::Deleted { at };
        Ok(())
    }
}
