//! Menu service: categories, items, embeddings and image links.
//!
//! Restaurants and files are verified against their owning services; categories
//! live alongside items and are checked through the local repository. Embedding
//! generation and file retirement are best effort and surface as warnings.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use crate::domain::ports::{
    EmbeddingClient, EmbeddingRequest, EntityRepository, FileServiceClient, MenuCatalogue,
};
use crate::domain::reference::{ReferenceValidator, invalid_reference};
use crate::domain::service_support::{self, added, changed};
use crate::domain::{
    Embedding, EntityId, EntityKind, Error, MenuCategory, MenuCategoryFilter, MenuCategoryPatch,
    MenuItem, MenuItemFilter, MenuItemPatch, Persisted, RecordFilter, WithWarnings,
    validate_menu_category, validate_menu_item,
};

/// Collaborators used for best-effort side effects.
#[derive(Clone)]
pub struct MenuCollaborators {
    pub embeddings: Arc<dyn EmbeddingClient>,
    pub files: Arc<dyn FileServiceClient>,
}

/// Implements [`MenuCatalogue`].
#[derive(Clone)]
pub struct MenuCatalogueService {
    items: Arc<dyn EntityRepository<MenuItem>>,
    categories: Arc<dyn EntityRepository<MenuCategory>>,
    references: ReferenceValidator,
    collaborators: MenuCollaborators,
}

impl MenuCatalogueService {
    pub fn new(
        items: Arc<dyn EntityRepository<MenuItem>>,
        categories: Arc<dyn EntityRepository<MenuCategory>>,
        references: ReferenceValidator,
        collaborators: MenuCollaborators,
    ) -> Self {
        Self {
            items,
            categories,
            references,
            collaborators,
        }
    }

    /// The category must be active and belong to the item's restaurant.
    async fn require_category(
        &self,
        category_id: EntityId,
        restaurant_id: EntityId,
    ) -> Result<(), Error> {
        let filter = MenuCategoryFilter::by_id(category_id);
        let found = service_support::list(self.categories.as_ref(), &filter).await?;
        match found.first() {
            None => Err(invalid_reference(
                "category_id",
                EntityKind::MenuCategory,
                &category_id,
            )),
            Some(category) if category.restaurant_id != restaurant_id => {
                Err(Error::invalid_reference(
                    "category_id belongs to a different restaurant",
                )
                .with_details(json!({
                    "field": "category_id",
                    "kind": EntityKind::MenuCategory,
                    "id": category_id,
                    "code": "invalid_reference",
                })))
            }
            Some(_) => Ok(()),
        }
    }

    /// Ask the embedding collaborator for a vector, downgrading failure to a
    /// warning.
    async fn embed(&self, item: &MenuItem, warnings: &mut Vec<String>) -> Option<Embedding> {
        let request = EmbeddingRequest {
            restaurant_id: item.restaurant_id,
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
        };
        match self.collaborators.embeddings.generate_embedding(&request).await {
            Ok(embedding) => Some(embedding),
            Err(error) => {
                warn!(
                    restaurant_id = %item.restaurant_id,
                    error_kind = error.variant_name(),
                    error = %error,
                    "embedding generation failed"
                );
                warnings.push(format!("Menu item saved without embedding: {error}"));
                None
            }
        }
    }
}

#[async_trait]
impl MenuCatalogue for MenuCatalogueService {
    async fn create_item(
        &self,
        meta: Option<Value>,
        mut item: MenuItem,
    ) -> Result<WithWarnings<Persisted<MenuItem>>, Error> {
        validate_menu_item(&item)?;
        self.references
            .require("restaurant_id", EntityKind::Restaurant, &item.restaurant_id)
            .await?;
        if let Some(category_id) = item.category_id {
            self.require_category(category_id, item.restaurant_id).await?;
        }
        self.references
            .require_all("image_file_ids", EntityKind::File, &item.image_file_ids)
            .await?;

        let mut warnings = Vec::new();
        item.embedding = self.embed(&item, &mut warnings).await;
        let created = service_support::create(self.items.as_ref(), meta, item).await?;
        Ok(WithWarnings {
            value: created,
            warnings,
        })
    }

    async fn list_items(&self, filter: MenuItemFilter) -> Result<Vec<Persisted<MenuItem>>, Error> {
        service_support::list(self.items.as_ref(), &filter).await
    }

    async fn update_item(
        &self,
        id: EntityId,
        patch: MenuItemPatch,
    ) -> Result<WithWarnings<Persisted<MenuItem>>, Error> {
        let current = service_support::fetch_active(self.items.as_ref(), id).await?;
        let mut next = patch.apply(current.data.clone());
        validate_menu_item(&next)?;

        let restaurant_moved = changed(Some(&next.restaurant_id), Some(&current.restaurant_id));
        if let Some(restaurant_id) = restaurant_moved {
            self.references
                .require("restaurant_id", EntityKind::Restaurant, restaurant_id)
                .await?;
        }
        let category_moved = changed(next.category_id.as_ref(), current.category_id.as_ref());
        if let Some(category_id) = next.category_id
            && (restaurant_moved.is_some() || category_moved.is_some())
        {
            self.require_category(category_id, next.restaurant_id).await?;
        }
        self.references
            .require_all(
                "image_file_ids",
                EntityKind::File,
                &added(&next.image_file_ids, &current.image_file_ids),
            )
            .await?;

        let mut warnings = Vec::new();
        if next.embedding_inputs_differ(&current.data) {
            next.embedding = self.embed(&next, &mut warnings).await;
        }
        let record = service_support::revise(current, next, patch.meta);
        let updated = service_support::update(self.items.as_ref(), &record).await?;
        Ok(WithWarnings {
            value: updated,
            warnings,
        })
    }

    async fn delete_item(&self, id: EntityId) -> Result<(), Error> {
        service_support::delete(self.items.as_ref(), id).await
    }

    async fn remove_item_image(
        &self,
        item_id: EntityId,
        file_id: EntityId,
    ) -> Result<WithWarnings<Persisted<MenuItem>>, Error> {
        let mut item = service_support::fetch_active(self.items.as_ref(), item_id).await?;
        if !item.image_file_ids.contains(&file_id) {
            return Err(Error::not_found(format!(
                "file {file_id} is not attached to menu item {item_id}"
            )));
        }
        item.data.image_file_ids.retain(|id| *id != file_id);
        let updated = service_support::update(self.items.as_ref(), &item).await?;

        let mut outcome = WithWarnings::new(updated);
        if let Err(error) = self.collaborators.files.delete_file(&file_id).await {
            warn!(
                %item_id,
                %file_id,
                error_kind = error.variant_name(),
                error = %error,
                "file retirement failed"
            );
            outcome.warn(format!(
                "Image removed from menu item, but failed to delete the file: {error}"
            ));
        }
        Ok(outcome)
    }

    async fn create_category(
        &self,
        meta: Option<Value>,
        category: MenuCategory,
    ) -> Result<Persisted<MenuCategory>, Error> {
        validate_menu_category(&category)?;
        self.references
            .require("restaurant_id", EntityKind::Restaurant, &category.restaurant_id)
            .await?;
        service_support::create(self.categories.as_ref(), meta, category).await
    }

    async fn list_categories(
        &self,
        filter: MenuCategoryFilter,
    ) -> Result<Vec<Persisted<MenuCategory>>, Error> {
        service_support::list(self.categories.as_ref(), &filter).await
    }

    async fn update_category(
        &self,
        id: EntityId,
        patch: MenuCategoryPatch,
    ) -> Result<Persisted<MenuCategory>, Error> {
        let current = service_support::fetch_active(self.categories.as_ref(), id).await?;
        let next = patch.apply(current.data.clone());
        validate_menu_category(&next)?;
        if let Some(restaurant_id) =
            changed(Some(&next.restaurant_id), Some(&current.restaurant_id))
        {
            self.references
                .require("restaurant_id", EntityKind::Restaurant, restaurant_id)
                .await?;
        }
        let record = service_support::revise(current, next, patch.meta);
        service_support::update(self.categories.as_ref(), &record).await
    }

    async fn delete_category(&self, id: EntityId) -> Result<(), Error> {
        service_support::delete(self.categories.as_ref(), id).await
    }
}

#[cfg(test)]
#[path = "menu_service_tests.rs"]
mod tests;
