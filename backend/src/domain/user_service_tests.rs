//! Tests for the user service and its default-address maintenance.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::Value;

use super::*;
use crate::domain::ports::{ReferenceChecker, RepositoryError, StaticReferenceChecker};
use crate::domain::{AuthProvider, ErrorCode, PersonDetails, UserAddressFilter};
use crate::outbound::memory::InMemoryRepository;
use crate::outbound::reference::{RepositoryReferenceChecker, RoutedReferenceChecker};

/// Repository whose updates always fail, for exercising warning paths.
struct RejectingUpdates<T> {
    inner: Arc<InMemoryRepository<T>>,
}

#[async_trait]
impl<T: crate::domain::EntityData> EntityRepository<T> for RejectingUpdates<T> {
    async fn create(&self, meta: Option<Value>, data: T) -> Result<Persisted<T>, RepositoryError> {
        self.inner.create(meta, data).await
    }

    async fn get(&self, filter: &T::Filter) -> Result<Vec<Persisted<T>>, RepositoryError> {
        self.inner.get(filter).await
    }

    async fn update(&self, _record: &Persisted<T>) -> Result<Persisted<T>, RepositoryError> {
        Err(RepositoryError::connection("connection reset"))
    }

    async fn delete(&self, id: &EntityId) -> Result<(), RepositoryError> {
        self.inner.delete(id).await
    }
}

struct Harness {
    service: UserAccountService,
    users: Arc<InMemoryRepository<User>>,
}

fn build(
    users_for_service: Arc<dyn EntityRepository<User>>,
    users: Arc<InMemoryRepository<User>>,
) -> Harness {
    let addresses: Arc<InMemoryRepository<UserAddress>> =
        Arc::new(InMemoryRepository::new(Arc::new(DefaultClock)));
    let checker: Arc<dyn ReferenceChecker> = Arc::new(
        RoutedReferenceChecker::new(Arc::new(StaticReferenceChecker::default()))
            .route(
                EntityKind::User,
                Arc::new(RepositoryReferenceChecker::<User>::new(users.clone())),
            )
            .route(
                EntityKind::UserAddress,
                Arc::new(RepositoryReferenceChecker::<UserAddress>::new(
                    addresses.clone(),
                )),
            ),
    );
    Harness {
        service: UserAccountService::new(
            users_for_service,
            addresses,
            ReferenceValidator::new(checker),
        ),
        users,
    }
}

#[fixture]
fn harness() -> Harness {
    let users = Arc::new(InMemoryRepository::new(Arc::new(DefaultClock)));
    build(users.clone(), users)
}

fn user(name: &str) -> User {
    User {
        person: PersonDetails {
            name: name.to_owned(),
            email: Some(format!("{}@x.com", name.to_lowercase())),
            phone: None,
            auth_provider: AuthProvider::Google,
        },
        preferences: BTreeSet::new(),
        dietary_restrictions: BTreeSet::new(),
        default_address_id: None,
    }
}

fn address(user_id: EntityId, is_primary: bool) -> UserAddress {
    UserAddress {
        user_id,
        address_line1: "1 Main St".to_owned(),
        address_line2: None,
        city: "X".to_owned(),
        state: "Y".to_owned(),
        postal_code: "1".to_owned(),
        country: "Z".to_owned(),
        alias_name: None,
        location: None,
        is_primary,
    }
}

async fn stored_user(harness: &Harness, id: EntityId) -> Persisted<User> {
    harness
        .service
        .list_users(UserFilter::by_id(id))
        .await
        .expect("list users")
        .into_iter()
        .next()
        .expect("user present")
}

#[rstest]
#[tokio::test]
async fn primary_address_becomes_the_default(harness: Harness) {
    let created = harness
        .service
        .create_user(None, user("A"))
        .await
        .expect("create user");
    assert!(created.is_active());

    let outcome = harness
        .service
        .create_address(None, address(created.id(), true))
        .await
        .expect("create address");
    assert!(!outcome.has_warnings());

    let reloaded = stored_user(&harness, created.id()).await;
    assert_eq!(reloaded.default_address_id, Some(outcome.value.id()));
}

#[rstest]
#[tokio::test]
async fn secondary_address_leaves_the_default_alone(harness: Harness) {
    let owner = harness.service.create_user(None, user("A")).await.expect("user");
    harness
        .service
        .create_address(None, address(owner.id(), false))
        .await
        .expect("address");
    assert_eq!(stored_user(&harness, owner.id()).await.default_address_id, None);
}

#[rstest]
#[tokio::test]
async fn promoting_a_second_address_keeps_the_first_primary(harness: Harness) {
    let owner = harness.service.create_user(None, user("A")).await.expect("user");
    let first = harness
        .service
        .create_address(None, address(owner.id(), true))
        .await
        .expect("first");
    let second = harness
        .service
        .create_address(None, address(owner.id(), true))
        .await
        .expect("second");

    assert_eq!(
        stored_user(&harness, owner.id()).await.default_address_id,
        Some(second.value.id())
    );
    let primaries = harness
        .service
        .list_addresses(UserAddressFilter {
            user_id: Some(owner.id()),
            is_primary: Some(true),
            ..UserAddressFilter::default()
        })
        .await
        .expect("list");
    let ids: Vec<_> = primaries.iter().map(Persisted::id).collect();
    assert!(ids.contains(&first.value.id()) && ids.contains(&second.value.id()));
}

#[rstest]
#[tokio::test]
async fn flipping_an_address_to_primary_promotes_it(harness: Harness) {
    let owner = harness.service.create_user(None, user("A")).await.expect("user");
    let created = harness
        .service
        .create_address(None, address(owner.id(), false))
        .await
        .expect("address");

    let updated = harness
        .service
        .update_address(
            created.value.id(),
            UserAddressPatch {
                is_primary: Some(true),
                ..UserAddressPatch::default()
            },
        )
        .await
        .expect("update");
    assert!(updated.value.is_primary);
    assert_eq!(
        stored_user(&harness, owner.id()).await.default_address_id,
        Some(created.value.id())
    );
}

#[rstest]
#[tokio::test]
async fn deleting_the_primary_address_clears_the_default(harness: Harness) {
    let owner = harness.service.create_user(None, user("A")).await.expect("user");
    let created = harness
        .service
        .create_address(None, address(owner.id(), true))
        .await
        .expect("address");

    let outcome = harness
        .service
        .delete_address(created.value.id())
        .await
        .expect("delete");
    assert!(!outcome.has_warnings());
    assert_eq!(stored_user(&harness, owner.id()).await.default_address_id, None);

    let remaining = harness
        .service
        .list_addresses(UserAddressFilter {
            user_id: Some(owner.id()),
            ..UserAddressFilter::default()
        })
        .await
        .expect("list");
    assert!(remaining.is_empty(), "deleted addresses are hidden");
}

#[rstest]
#[tokio::test]
async fn deleting_any_primary_clears_the_default(harness: Harness) {
    let owner = harness.service.create_user(None, user("A")).await.expect("user");
    let first = harness
        .service
        .create_address(None, address(owner.id(), true))
        .await
        .expect("first");
    let second = harness
        .service
        .create_address(None, address(owner.id(), true))
        .await
        .expect("second");

    harness
        .service
        .delete_address(first.value.id())
        .await
        .expect("delete");
    assert_eq!(stored_user(&harness, owner.id()).await.default_address_id, None);
    let remaining = harness
        .service
        .list_addresses(UserAddressFilter::default())
        .await
        .expect("list");
    assert_eq!(remaining.len(), 1);
    assert!(remaining.iter().all(|address| address.id() == second.value.id()));
}

#[rstest]
#[tokio::test]
async fn address_for_unknown_user_is_an_invalid_reference(harness: Harness) {
    let error = harness
        .service
        .create_address(None, address(EntityId::random(), true))
        .await
        .expect_err("no such user");
    assert_eq!(error.code(), ErrorCode::InvalidReference);
}

#[rstest]
#[tokio::test]
async fn address_for_deleted_user_is_an_invalid_reference(harness: Harness) {
    let owner = harness.service.create_user(None, user("A")).await.expect("user");
    harness.service.delete_user(owner.id()).await.expect("delete");
    let error = harness
        .service
        .create_address(None, address(owner.id(), false))
        .await
        .expect_err("deleted user");
    assert_eq!(error.code(), ErrorCode::InvalidReference);
}

#[tokio::test]
async fn pointer_failure_is_a_warning_not_an_error() {
    let users = Arc::new(InMemoryRepository::new(Arc::new(DefaultClock)));
    let harness = build(
        Arc::new(RejectingUpdates {
            inner: users.clone(),
        }),
        users,
    );
    let owner = harness.service.create_user(None, user("A")).await.expect("user");

    let outcome = harness
        .service
        .create_address(None, address(owner.id(), true))
        .await
        .expect("address still created");
    assert_eq!(outcome.warnings.len(), 1);
    assert!(
        outcome.warnings[0]
            .starts_with("Address created, but failed to update the user's default address:")
    );
    assert_eq!(harness.users.snapshot()[0].default_address_id, None);
}

#[rstest]
#[tokio::test]
async fn default_address_must_belong_to_the_user(harness: Harness) {
    let alice = harness.service.create_user(None, user("Alice")).await.expect("alice");
    let bob = harness.service.create_user(None, user("Bob")).await.expect("bob");
    let bobs = harness
        .service
        .create_address(None, address(bob.id(), false))
        .await
        .expect("address");

    let error = harness
        .service
        .update_user(
            alice.id(),
            UserPatch {
                default_address_id: Some(bobs.value.id()),
                ..UserPatch::default()
            },
        )
        .await
        .expect_err("foreign address");
    assert_eq!(error.code(), ErrorCode::InvalidReference);
}

#[rstest]
#[tokio::test]
async fn invalid_user_is_rejected_before_writing(harness: Harness) {
    let mut nameless = user("A");
    nameless.person.name = "   ".to_owned();
    let error = harness
        .service
        .create_user(None, nameless)
        .await
        .expect_err("blank name");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(harness.users.snapshot().is_empty());
}

#[rstest]
#[tokio::test]
async fn updating_a_deleted_user_is_not_found(harness: Harness) {
    let owner = harness.service.create_user(None, user("A")).await.expect("user");
    harness.service.delete_user(owner.id()).await.expect("delete");
    let error = harness
        .service
        .update_user(owner.id(), UserPatch::default())
        .await
        .expect_err("deleted");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
