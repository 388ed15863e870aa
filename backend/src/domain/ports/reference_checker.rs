//! Driven port answering "does this foreign id name an active record?".
//!
//! Stands in for foreign-key constraints across service boundaries. Checks
//! are point-in-time: a referenced record may be deleted right after a
//! successful check.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{EntityId, EntityKind};

use super::define_port_error;

define_port_error! {
    /// Failures that prevent a reference from being checked at all.
    pub enum ReferenceCheckError {
        /// The owning service could not be reached.
        Transport { message: String } => "reference check transport failed: {message}",
        /// The owning service did not answer within the timeout.
        Timeout { message: String } => "reference check timed out: {message}",
        /// The owning service answered with a non-success status.
        Status { status: u16, message: String } =>
            "reference check returned status {status}: {message}",
        /// The response body was not the expected collection.
        Decode { message: String } => "reference check response decode failed: {message}",
    }
}

/// Port for confirming that a referenced record exists and is active.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceChecker: Send + Sync {
    /// `Ok(false)` when the record is missing or inactive.
    async fn check_reference(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<bool, ReferenceCheckError>;
}

/// Fixture checker accepting exactly the registered ids.
///
/// # Examples
/// ```
/// use food_backend::domain::{EntityId, EntityKind};
/// use food_backend::domain::ports::{ReferenceChecker, StaticReferenceChecker};
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let id = EntityId::random();
/// let checker = StaticReferenceChecker::default().with(EntityKind::User, id);
/// assert!(checker.check_reference(EntityKind::User, &id).await.expect("check"));
/// assert!(!checker.check_reference(EntityKind::Restaurant, &id).await.expect("check"));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceChecker {
    known: HashSet<(EntityKind, EntityId)>,
}

impl StaticReferenceChecker {
    #[must_use]
    pub fn with(mut self, kind: EntityKind, id: EntityId) -> Self {
        self.known.insert((kind, id));
        self
    }
}

#[async_trait]
impl ReferenceChecker for StaticReferenceChecker {
    async fn check_reference(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<bool, ReferenceCheckError> {
        Ok(self.known.contains(&(kind, *id)))
    }
}
