//! Tests for restaurant reference validation and soft deletion.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::DefaultClock;
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::{
    MockReferenceChecker, ReferenceCheckError, ReferenceChecker, StaticReferenceChecker,
};
use crate::domain::{AuthProvider, ErrorCode, PersonDetails, RecordFilter};
use crate::outbound::memory::InMemoryRepository;

fn service(checker: impl ReferenceChecker + 'static) -> RestaurantDirectoryService {
    RestaurantDirectoryService::new(
        Arc::new(InMemoryRepository::new(Arc::new(DefaultClock))),
        ReferenceValidator::new(Arc::new(checker)),
    )
}

#[fixture]
fn restaurant() -> Restaurant {
    Restaurant {
        person: PersonDetails {
            name: "Spice Route".to_owned(),
            email: None,
            phone: Some("+44 20 7946 0000".to_owned()),
            auth_provider: AuthProvider::Phone,
        },
        owner_id: None,
        cuisine_types: BTreeSet::from(["indian".to_owned()]),
        operating_hours: json!({"mon": "09:00-22:00"}),
        location: "12 High St".to_owned(),
        rating: 4.0,
        delivery_fee: 1.5,
        image_file_ids: Vec::new(),
    }
}

#[rstest]
#[tokio::test]
async fn owner_and_images_are_checked(mut restaurant: Restaurant) {
    let (owner, image) = (EntityId::random(), EntityId::random());
    restaurant.owner_id = Some(owner);
    restaurant.image_file_ids = vec![image];
    let checker = StaticReferenceChecker::default()
        .with(EntityKind::User, owner)
        .with(EntityKind::File, image);

    let created = service(checker)
        .create_restaurant(None, restaurant)
        .await
        .expect("created");
    assert_eq!(created.owner_id, Some(owner));
}

#[rstest]
#[tokio::test]
async fn unknown_image_is_an_invalid_reference(mut restaurant: Restaurant) {
    restaurant.image_file_ids = vec![EntityId::random()];
    let error = service(StaticReferenceChecker::default())
        .create_restaurant(None, restaurant)
        .await
        .expect_err("unknown file");
    assert_eq!(error.code(), ErrorCode::InvalidReference);
    assert_eq!(
        error.details().and_then(|details| details["field"].as_str()),
        Some("image_file_ids")
    );
}

#[rstest]
#[tokio::test]
async fn unreachable_user_service_is_unavailable(mut restaurant: Restaurant) {
    restaurant.owner_id = Some(EntityId::random());
    let mut checker = MockReferenceChecker::new();
    checker
        .expect_check_reference()
        .return_once(|_, _| Err(ReferenceCheckError::timeout("5s elapsed")));
    let error = service(checker)
        .create_restaurant(None, restaurant)
        .await
        .expect_err("timeout");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn update_checks_only_newly_added_images(mut restaurant: Restaurant) {
    let (kept, fresh) = (EntityId::random(), EntityId::random());
    restaurant.image_file_ids = vec![kept];
    let mut checker = MockReferenceChecker::new();
    checker
        .expect_check_reference()
        .with(eq(EntityKind::File), eq(kept))
        .times(1)
        .returning(|_, _| Ok(true));
    checker
        .expect_check_reference()
        .with(eq(EntityKind::File), eq(fresh))
        .times(1)
        .returning(|_, _| Ok(true));
    let service = service(checker);
    let created = service
        .create_restaurant(None, restaurant)
        .await
        .expect("created");

    let updated = service
        .update_restaurant(
            created.id(),
            RestaurantPatch {
                image_file_ids: Some(vec![kept, fresh]),
                rating: Some(4.8),
                ..RestaurantPatch::default()
            },
        )
        .await
        .expect("updated");
    assert_eq!(updated.image_file_ids, vec![kept, fresh]);
    assert!(updated.header.updated_at > created.header.updated_at);
}

#[rstest]
#[tokio::test]
async fn contactless_restaurant_is_rejected(mut restaurant: Restaurant) {
    restaurant.person.phone = None;
    let error = service(StaticReferenceChecker::default())
        .create_restaurant(None, restaurant)
        .await
        .expect_err("needs email or phone");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn deleted_restaurants_are_hidden_unless_requested(restaurant: Restaurant) {
    let service = service(StaticReferenceChecker::default());
    let created = service
        .create_restaurant(None, restaurant)
        .await
        .expect("created");
    service
        .delete_restaurant(created.id())
        .await
        .expect("deleted");

    let visible = service
        .list_restaurants(RestaurantFilter::default())
        .await
        .expect("list");
    assert!(visible.is_empty());

    let all = service
        .list_restaurants(RestaurantFilter::default().including_deleted())
        .await
        .expect("list");
    assert_eq!(all.len(), 1);
    assert!(!all[0].is_active());

    let again = service
        .delete_restaurant(created.id())
        .await
        .expect_err("already deleted");
    assert_eq!(again.code(), ErrorCode::NotFound);
}
