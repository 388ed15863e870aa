//! Per-kind routing between local and remote reference checkers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{ReferenceCheckError, ReferenceChecker};
use crate::domain::{EntityId, EntityKind};

/// Sends each reference kind to the checker registered for it, falling back
/// to a default (normally the HTTP checker) for unregistered kinds.
pub struct RoutedReferenceChecker {
    routes: HashMap<EntityKind, Arc<dyn ReferenceChecker>>,
    fallback: Arc<dyn ReferenceChecker>,
}

impl RoutedReferenceChecker {
    pub fn new(fallback: Arc<dyn ReferenceChecker>) -> Self {
        Self {
            routes: HashMap::new(),
            fallback,
        }
    }

    #[must_use]
    pub fn route(mut self, kind: EntityKind, checker: Arc<dyn ReferenceChecker>) -> Self {
        self.routes.insert(kind, checker);
        self
    }
}

#[async_trait]
impl ReferenceChecker for RoutedReferenceChecker {
    async fn check_reference(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<bool, ReferenceCheckError> {
        self.routes
            .get(&kind)
            .unwrap_or(&self.fallback)
            .check_reference(kind, id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockReferenceChecker;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn registered_kinds_bypass_the_fallback() {
        let id = EntityId::random();
        let mut local = MockReferenceChecker::new();
        local
            .expect_check_reference()
            .with(eq(EntityKind::MenuCategory), eq(id))
            .times(1)
            .return_once(|_, _| Ok(true));
        let mut remote = MockReferenceChecker::new();
        remote
            .expect_check_reference()
            .with(eq(EntityKind::Restaurant), eq(id))
            .times(1)
            .return_once(|_, _| Ok(false));

        let router = RoutedReferenceChecker::new(Arc::new(remote))
            .route(EntityKind::MenuCategory, Arc::new(local));

        assert!(
            router
                .check_reference(EntityKind::MenuCategory, &id)
                .await
                .expect("local check")
        );
        assert!(
            !router
                .check_reference(EntityKind::Restaurant, &id)
                .await
                .expect("remote check")
        );
    }
}
