//! Reference checks answered by the calling service's own repositories.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    EntityRepository, ReferenceCheckError, ReferenceChecker, RepositoryError,
};
use crate::domain::{EntityData, EntityId, EntityKind, RecordFilter};

/// Checks references to `T` through a repository instead of HTTP.
pub struct RepositoryReferenceChecker<T: EntityData> {
    repository: Arc<dyn EntityRepository<T>>,
}

impl<T: EntityData> RepositoryReferenceChecker<T> {
    pub fn new(repository: Arc<dyn EntityRepository<T>>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<T: EntityData> ReferenceChecker for RepositoryReferenceChecker<T> {
    async fn check_reference(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<bool, ReferenceCheckError> {
        if kind != T::KIND {
            return Err(ReferenceCheckError::transport(format!(
                "{} repository cannot resolve {kind} references",
                T::KIND
            )));
        }
        let matches = self
            .repository
            .get(&T::Filter::by_id(*id))
            .await
            .map_err(map_repository_error)?;
        Ok(matches.iter().any(|record| record.is_active()))
    }
}

fn map_repository_error(error: RepositoryError) -> ReferenceCheckError {
    match error {
        RepositoryError::Connection { message } => ReferenceCheckError::transport(message),
        other => ReferenceCheckError::status(500_u16, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthProvider, PersonDetails, User, UserAddress};
    use crate::outbound::memory::InMemoryRepository;
    use mockable::DefaultClock;
    use std::collections::BTreeSet;

    fn user() -> User {
        User {
            person: PersonDetails {
                name: "A".to_owned(),
                email: Some("a@x.com".to_owned()),
                phone: None,
                auth_provider: AuthProvider::Google,
            },
            preferences: BTreeSet::new(),
            dietary_restrictions: BTreeSet::new(),
            default_address_id: None,
        }
    }

    #[tokio::test]
    async fn active_records_pass_and_deleted_records_fail() {
        let repo = Arc::new(InMemoryRepository::<User>::new(Arc::new(DefaultClock)));
        let kept = repo.create(None, user()).await.expect("create");
        let gone = repo.create(None, user()).await.expect("create");
        repo.delete(&gone.id()).await.expect("delete");

        let checker = RepositoryReferenceChecker::<User>::new(repo);
        assert!(checker.check_reference(EntityKind::User, &kept.id()).await.expect("check"));
        assert!(!checker.check_reference(EntityKind::User, &gone.id()).await.expect("check"));
        assert!(
            !checker
                .check_reference(EntityKind::User, &EntityId::random())
                .await
                .expect("check")
        );
    }

    #[tokio::test]
    async fn mismatched_kind_is_rejected() {
        let repo = Arc::new(InMemoryRepository::<UserAddress>::new(Arc::new(DefaultClock)));
        let checker = RepositoryReferenceChecker::<UserAddress>::new(repo);
        let error = checker
            .check_reference(EntityKind::User, &EntityId::random())
            .await
            .expect_err("wrong kind");
        assert!(matches!(error, ReferenceCheckError::Transport { .. }));
    }
}
