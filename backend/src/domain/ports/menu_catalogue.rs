//! Driving port for the menu service: items, categories and image links.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{
    EntityId, Error, MenuCategory, MenuCategoryFilter, MenuCategoryPatch, MenuItem,
    MenuItemFilter, MenuItemPatch, Persisted, WithWarnings,
};

/// Use cases exposed by the menu service.
///
/// Item writes return warnings when the embedding collaborator fails; image
/// unlinking warns when the file service could not retire the file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuCatalogue: Send + Sync {
    async fn create_item(
        &self,
        meta: Option<Value>,
        item: MenuItem,
    ) -> Result<WithWarnings<Persisted<MenuItem>>, Error>;

    async fn list_items(&self, filter: MenuItemFilter) -> Result<Vec<Persisted<MenuItem>>, Error>;

    async fn update_item(
        &self,
        id: EntityId,
        patch: MenuItemPatch,
    ) -> Result<WithWarnings<Persisted<MenuItem>>, Error>;

    async fn delete_item(&self, id: EntityId) -> Result<(), Error>;

    /// Detach `file_id` from the item, then ask the file service to delete it.
    async fn remove_item_image(
        &self,
        item_id: EntityId,
        file_id: EntityId,
    ) -> Result<WithWarnings<Persisted<MenuItem>>, Error>;

    async fn create_category(
        &self,
        meta: Option<Value>,
        category: MenuCategory,
    ) -> Result<Persisted<MenuCategory>, Error>;

    async fn list_categories(
        &self,
        filter: MenuCategoryFilter,
    ) -> Result<Vec<Persisted<MenuCategory>>, Error>;

    async fn update_category(
        &self,
        id: EntityId,
        patch: MenuCategoryPatch,
    ) -> Result<Persisted<MenuCategory>, Error>;

    async fn delete_category(&self, id: EntityId) -> Result<(), Error>;
}
