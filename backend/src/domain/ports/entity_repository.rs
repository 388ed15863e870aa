//! Driven port for entity persistence.
//!
//! One adapter exists per entity type. Adapters assign identifiers and
//! timestamps, translate the table's soft-delete column into
//! [`DeletionState`](crate::domain::DeletionState), and return records ordered
//! by insertion (`created_at`, then `id`).

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{EntityData, EntityId, Persisted};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by entity repository adapters.
    pub enum RepositoryError {
        /// Store connection could not be established.
        Connection { message: String } => "repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "repository query failed: {message}",
        /// A schema constraint rejected the write.
        Constraint { message: String } => "repository constraint violated: {message}",
        /// An id-targeted mutation matched no active row.
        NotFound { id: EntityId } => "no active record with id {id}",
    }
}

/// Parameterised CRUD over one entity table.
#[async_trait]
pub trait EntityRepository<T: EntityData>: Send + Sync {
    /// Insert a new active record. The store assigns the id and timestamps.
    async fn create(&self, meta: Option<Value>, data: T) -> Result<Persisted<T>, RepositoryError>;

    /// Records matching the filter. Deleted records are excluded unless the
    /// filter explicitly bypasses the active-only default.
    async fn get(&self, filter: &T::Filter) -> Result<Vec<Persisted<T>>, RepositoryError>;

    /// Overwrite every mutable column of an active record. `header.meta` is
    /// written; other header fields are store-owned.
    async fn update(&self, record: &Persisted<T>) -> Result<Persisted<T>, RepositoryError>;

    /// Soft-delete an active record.
    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError>;
}
