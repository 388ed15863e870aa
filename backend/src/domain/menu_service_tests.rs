//! Tests for menu items, categories and their best-effort side effects.

use std::sync::Arc;

use mockable::DefaultClock;
use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    CollaboratorError, MockEmbeddingClient, MockFileServiceClient, StaticReferenceChecker,
};
use crate::outbound::memory::InMemoryRepository;

struct Setup {
    restaurant: EntityId,
    other_restaurant: EntityId,
    image: EntityId,
    embeddings: MockEmbeddingClient,
    files: MockFileServiceClient,
}

impl Setup {
    fn new() -> Self {
        Self {
            restaurant: EntityId::random(),
            other_restaurant: EntityId::random(),
            image: EntityId::random(),
            embeddings: MockEmbeddingClient::new(),
            files: MockFileServiceClient::new(),
        }
    }

    fn embedding_succeeds(mut self, times: usize) -> Self {
        self.embeddings
            .expect_generate_embedding()
            .times(times)
            .returning(|_| Ok(Embedding::new(vec![0.25, 0.5, 0.75]).expect("finite")));
        self
    }

    fn build(self) -> (MenuCatalogueService, EntityId, EntityId, EntityId) {
        let checker = StaticReferenceChecker::default()
            .with(EntityKind::Restaurant, self.restaurant)
            .with(EntityKind::Restaurant, self.other_restaurant)
            .with(EntityKind::File, self.image);
        let service = MenuCatalogueService::new(
            Arc::new(InMemoryRepository::new(Arc::new(DefaultClock))),
            Arc::new(InMemoryRepository::new(Arc::new(DefaultClock))),
            ReferenceValidator::new(Arc::new(checker)),
            MenuCollaborators {
                embeddings: Arc::new(self.embeddings),
                files: Arc::new(self.files),
            },
        );
        (service, self.restaurant, self.other_restaurant, self.image)
    }
}

fn item(restaurant_id: EntityId) -> MenuItem {
    MenuItem {
        restaurant_id,
        category_id: None,
        name: "Masala Dosa".to_owned(),
        description: Some("Crisp rice crepe".to_owned()),
        price: 8.5,
        is_available: true,
        embedding: None,
        image_file_ids: Vec::new(),
    }
}

fn category(restaurant_id: EntityId) -> MenuCategory {
    MenuCategory {
        restaurant_id,
        name: "Breakfast".to_owned(),
        description: None,
    }
}

#[tokio::test]
async fn created_items_carry_their_embedding() {
    let (service, restaurant, _, _) = Setup::new().embedding_succeeds(1).build();
    let outcome = service
        .create_item(None, item(restaurant))
        .await
        .expect("created");
    assert!(!outcome.has_warnings());
    assert_eq!(
        outcome.value.embedding.as_ref().map(Embedding::dimensions),
        Some(3)
    );
}

#[tokio::test]
async fn embedding_failure_is_a_warning() {
    let mut setup = Setup::new();
    setup
        .embeddings
        .expect_generate_embedding()
        .times(1)
        .returning(|_| Err(CollaboratorError::timeout("30s elapsed")));
    let (service, restaurant, _, _) = setup.build();

    let outcome = service
        .create_item(None, item(restaurant))
        .await
        .expect("still created");
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].starts_with("Menu item saved without embedding"));
    assert!(outcome.value.embedding.is_none());
    assert_eq!(
        service
            .list_items(MenuItemFilter::default())
            .await
            .expect("list")
            .len(),
        1
    );
}

#[tokio::test]
async fn unknown_restaurant_rejects_before_embedding() {
    let (service, _, _, _) = Setup::new().embedding_succeeds(0).build();
    let error = service
        .create_item(None, item(EntityId::random()))
        .await
        .expect_err("unknown restaurant");
    assert_eq!(error.code(), ErrorCode::InvalidReference);
    assert!(
        service
            .list_items(MenuItemFilter::default())
            .await
            .expect("list")
            .is_empty()
    );
}

#[tokio::test]
async fn category_must_share_the_item_restaurant() {
    let (service, restaurant, other, _) = Setup::new().embedding_succeeds(1).build();
    let foreign = service
        .create_category(None, category(other))
        .await
        .expect("category");
    let local = service
        .create_category(None, category(restaurant))
        .await
        .expect("category");

    let mut misfiled = item(restaurant);
    misfiled.category_id = Some(foreign.id());
    let error = service
        .create_item(None, misfiled)
        .await
        .expect_err("foreign category");
    assert_eq!(error.code(), ErrorCode::InvalidReference);

    let mut filed = item(restaurant);
    filed.category_id = Some(local.id());
    let created = service.create_item(None, filed).await.expect("created");
    assert_eq!(created.value.category_id, Some(local.id()));
}

#[tokio::test]
async fn deleted_category_is_an_invalid_reference() {
    let (service, restaurant, _, _) = Setup::new().embedding_succeeds(0).build();
    let gone = service
        .create_category(None, category(restaurant))
        .await
        .expect("category");
    service.delete_category(gone.id()).await.expect("deleted");

    let mut orphan = item(restaurant);
    orphan.category_id = Some(gone.id());
    let error = service
        .create_item(None, orphan)
        .await
        .expect_err("deleted category");
    assert_eq!(error.code(), ErrorCode::InvalidReference);
}

#[rstest]
#[case(MenuItemPatch { price: Some(9.0), ..MenuItemPatch::default() }, 2)]
#[case(MenuItemPatch { name: Some("Plain Dosa".to_owned()), ..MenuItemPatch::default() }, 2)]
#[case(MenuItemPatch { is_available: Some(false), ..MenuItemPatch::default() }, 1)]
#[tokio::test]
async fn updates_re_embed_only_when_text_or_price_changes(
    #[case] patch: MenuItemPatch,
    #[case] embedding_calls: usize,
) {
    let (service, restaurant, _, _) = Setup::new().embedding_succeeds(embedding_calls).build();
    let created = service
        .create_item(None, item(restaurant))
        .await
        .expect("created");
    let updated = service
        .update_item(created.value.id(), patch)
        .await
        .expect("updated");
    assert!(updated.value.embedding.is_some());
    assert!(updated.value.header.updated_at > created.value.header.updated_at);
}

#[tokio::test]
async fn removing_an_image_unlinks_then_retires_the_file() {
    let mut setup = Setup::new().embedding_succeeds(1);
    let image = setup.image;
    setup
        .files
        .expect_delete_file()
        .with(eq(image))
        .times(1)
        .returning(|_| Ok(()));
    let (service, restaurant, _, image) = setup.build();

    let mut pictured = item(restaurant);
    pictured.image_file_ids = vec![image];
    let created = service.create_item(None, pictured).await.expect("created");

    let outcome = service
        .remove_item_image(created.value.id(), image)
        .await
        .expect("removed");
    assert!(!outcome.has_warnings());
    assert!(outcome.value.image_file_ids.is_empty());
}

#[tokio::test]
async fn file_service_failure_is_a_warning_after_unlinking() {
    let mut setup = Setup::new().embedding_succeeds(1);
    setup
        .files
        .expect_delete_file()
        .times(1)
        .returning(|_| Err(CollaboratorError::status(503_u16, "status 503")));
    let (service, restaurant, _, image) = setup.build();

    let mut pictured = item(restaurant);
    pictured.image_file_ids = vec![image];
    let created = service.create_item(None, pictured).await.expect("created");

    let outcome = service
        .remove_item_image(created.value.id(), image)
        .await
        .expect("unlinked");
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.value.image_file_ids.is_empty());
}

#[tokio::test]
async fn removing_an_unattached_image_is_not_found() {
    let (service, restaurant, _, _) = Setup::new().embedding_succeeds(1).build();
    let created = service
        .create_item(None, item(restaurant))
        .await
        .expect("created");
    let error = service
        .remove_item_image(created.value.id(), EntityId::random())
        .await
        .expect_err("not attached");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn category_restaurant_change_is_validated() {
    let (service, restaurant, other, _) = Setup::new().embedding_succeeds(0).build();
    let created = service
        .create_category(None, category(restaurant))
        .await
        .expect("category");

    let moved = service
        .update_category(
            created.id(),
            MenuCategoryPatch {
                restaurant_id: Some(other),
                ..MenuCategoryPatch::default()
            },
        )
        .await
        .expect("moved");
    assert_eq!(moved.restaurant_id, other);

    let error = service
        .update_category(
            created.id(),
            MenuCategoryPatch {
                restaurant_id: Some(EntityId::random()),
                ..MenuCategoryPatch::default()
            },
        )
        .await
        .expect_err("unknown restaurant");
    assert_eq!(error.code(), ErrorCode::InvalidReference);
}
