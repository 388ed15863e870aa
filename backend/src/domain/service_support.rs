//! Helpers shared by the driving-port services.

use serde_json::Value;

use super::ports::{EntityRepository, RepositoryError};
use super::{EntityData, EntityId, EntityKind, Error, Persisted, RecordFilter};

/// Map repository failures onto the domain error taxonomy.
pub(crate) fn map_repository_error(kind: EntityKind, error: RepositoryError) -> Error {
    match error {
        RepositoryError::Connection { message } => Error::service_unavailable(format!(
            "{} repository unavailable: {message}",
            kind.label()
        )),
        RepositoryError::Query { message } | RepositoryError::Constraint { message } => {
            Error::internal(format!("{} repository error: {message}", kind.label()))
        }
        RepositoryError::NotFound { id } => not_found(kind, &id),
    }
}

pub(crate) fn not_found(kind: EntityKind, id: &EntityId) -> Error {
    Error::not_found(format!("{} {id} not found", kind.label()))
}

/// Load one active record by id, or fail with `not_found`.
pub(crate) async fn fetch_active<T: EntityData>(
    repo: &dyn EntityRepository<T>,
    id: EntityId,
) -> Result<Persisted<T>, Error> {
    repo.get(&T::Filter::by_id(id))
        .await
        .map_err(|err| map_repository_error(T::KIND, err))?
        .into_iter()
        .next()
        .ok_or_else(|| not_found(T::KIND, &id))
}

pub(crate) async fn list<T: EntityData>(
    repo: &dyn EntityRepository<T>,
    filter: &T::Filter,
) -> Result<Vec<Persisted<T>>, Error> {
    repo.get(filter)
        .await
        .map_err(|err| map_repository_error(T::KIND, err))
}

pub(crate) async fn create<T: EntityData>(
    repo: &dyn EntityRepository<T>,
    meta: Option<Value>,
    data: T,
) -> Result<Persisted<T>, Error> {
    repo.create(meta, data)
        .await
        .map_err(|err| map_repository_error(T::KIND, err))
}

pub(crate) async fn update<T: EntityData>(
    repo: &dyn EntityRepository<T>,
    record: &Persisted<T>,
) -> Result<Persisted<T>, Error> {
    repo.update(record)
        .await
        .map_err(|err| map_repository_error(T::KIND, err))
}

pub(crate) async fn delete<T: EntityData>(
    repo: &dyn EntityRepository<T>,
    id: EntityId,
) -> Result<(), Error> {
    repo.delete(&id)
        .await
        .map_err(|err| map_repository_error(T::KIND, err))
}

/// Replace the record's data and, when supplied, its metadata.
pub(crate) fn revise<T>(mut record: Persisted<T>, data: T, meta: Option<Value>) -> Persisted<T> {
    record.data = data;
    if meta.is_some() {
        record.header.meta = meta;
    }
    record
}

/// Changed value of an optional reference, if the patch moves it.
pub(crate) fn changed<'a>(
    proposed: Option<&'a EntityId>,
    current: Option<&EntityId>,
) -> Option<&'a EntityId> {
    proposed.filter(|id| Some(*id) != current)
}

/// Ids present in `proposed` but not in `current`, in proposed order.
pub(crate) fn added(proposed: &[EntityId], current: &[EntityId]) -> Vec<EntityId> {
    proposed
        .iter()
        .filter(|id| !current.contains(id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(RepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(RepositoryError::constraint("unique"), ErrorCode::InternalError)]
    #[case(RepositoryError::not_found(EntityId::random()), ErrorCode::NotFound)]
    fn repository_errors_map_to_taxonomy(
        #[case] error: RepositoryError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(
            map_repository_error(EntityKind::MenuItem, error).code(),
            expected
        );
    }

    #[rstest]
    fn changed_ignores_unchanged_references() {
        let id = EntityId::random();
        assert_eq!(changed(Some(&id), Some(&id)), None);
        assert_eq!(changed(Some(&id), None), Some(&id));
        assert_eq!(changed(None, Some(&id)), None);
    }

    #[rstest]
    fn added_lists_only_new_ids() {
        let (kept, fresh) = (EntityId::random(), EntityId::random());
        assert_eq!(added(&[kept, fresh], &[kept]), vec![fresh]);
        assert!(added(&[], &[kept]).is_empty());
    }
}
