//! Turns reference-check answers into domain errors.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use super::ports::ReferenceChecker;
use super::{EntityId, EntityKind, Error};

/// Validates foreign identifiers embedded in incoming writes.
///
/// Each id is checked exactly once; failures are never retried.
#[derive(Clone)]
pub struct ReferenceValidator {
    checker: Arc<dyn ReferenceChecker>,
}

impl ReferenceValidator {
    pub fn new(checker: Arc<dyn ReferenceChecker>) -> Self {
        Self { checker }
    }

    /// Require `id` to name an active record of `kind`.
    ///
    /// A missing or inactive record yields
    /// [`ErrorCode::InvalidReference`](super::ErrorCode::InvalidReference)
    /// naming `field`; a failed check yields
    /// [`ErrorCode::ServiceUnavailable`](super::ErrorCode::ServiceUnavailable).
    pub async fn require(
        &self,
        field: &'static str,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<(), Error> {
        match self.checker.check_reference(kind, id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(invalid_reference(field, kind, id)),
            Err(error) => {
                warn!(
                    field,
                    kind = kind.as_str(),
                    %id,
                    error_kind = error.variant_name(),
                    "reference check failed"
                );
                Err(Error::service_unavailable(format!(
                    "could not verify {field}: {error}"
                )))
            }
        }
    }

    /// Require an optional reference when present.
    pub async fn require_optional(
        &self,
        field: &'static str,
        kind: EntityKind,
        id: Option<&EntityId>,
    ) -> Result<(), Error> {
        match id {
            Some(id) => self.require(field, kind, id).await,
            None => Ok(()),
        }
    }

    /// Require every id in order, stopping at the first failure.
    pub async fn require_all(
        &self,
        field: &'static str,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<(), Error> {
        for id in ids {
            self.require(field, kind, id).await?;
        }
        Ok(())
    }
}

/// Error for a reference that names a missing or inactive record.
pub fn invalid_reference(field: &str, kind: EntityKind, id: &EntityId) -> Error {
    Error::invalid_reference(format!(
        "{field} does not reference an active {label}",
        label = kind.label()
    ))
    .with_details(json!({
        "field": field,
        "kind": kind,
        "id": id,
        "code": "invalid_reference",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockReferenceChecker, ReferenceCheckError};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn validator(checker: MockReferenceChecker) -> ReferenceValidator {
        ReferenceValidator::new(Arc::new(checker))
    }

    #[rstest]
    #[tokio::test]
    async fn inactive_reference_names_the_field() {
        let id = EntityId::random();
        let mut checker = MockReferenceChecker::new();
        checker
            .expect_check_reference()
            .with(eq(EntityKind::Restaurant), eq(id))
            .times(1)
            .return_once(|_, _| Ok(false));

        let error = validator(checker)
            .require("restaurant_id", EntityKind::Restaurant, &id)
            .await
            .expect_err("inactive reference");

        assert_eq!(error.code(), ErrorCode::InvalidReference);
        let details = error.details().expect("details");
        assert_eq!(details["field"], "restaurant_id");
        assert_eq!(details["kind"], "restaurant");
        assert_eq!(details["id"], id.to_string());
    }

    #[rstest]
    #[case(ReferenceCheckError::timeout("5s elapsed"))]
    #[case(ReferenceCheckError::status(502_u16, "bad gateway"))]
    #[tokio::test]
    async fn check_failures_are_service_unavailable(#[case] failure: ReferenceCheckError) {
        let mut checker = MockReferenceChecker::new();
        checker
            .expect_check_reference()
            .times(1)
            .return_once(move |_, _| Err(failure));

        let error = validator(checker)
            .require("user_id", EntityKind::User, &EntityId::random())
            .await
            .expect_err("check failure");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn require_all_stops_at_first_invalid_id() {
        let ids = [EntityId::random(), EntityId::random(), EntityId::random()];
        let mut checker = MockReferenceChecker::new();
        let mut call = 0;
        checker.expect_check_reference().times(2).returning(move |_, _| {
            call += 1;
            Ok(call == 1)
        });

        let error = validator(checker)
            .require_all("image_file_ids", EntityKind::File, &ids)
            .await
            .expect_err("second id invalid");
        assert_eq!(error.code(), ErrorCode::InvalidReference);
    }

    #[rstest]
    #[tokio::test]
    async fn absent_optional_reference_is_not_checked() {
        let mut checker = MockReferenceChecker::new();
        checker.expect_check_reference().never();
        validator(checker)
            .require_optional("owner_id", EntityKind::User, None)
            .await
            .expect("nothing to check");
    }
}
