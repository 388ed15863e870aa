//! Menu categories and items.

use serde_json::Value;

use super::entity::{
    EntityData, EntityKind, RecordFilter, contains_or_any, eq_optional, eq_or_any, within_bounds,
};
use super::record::{EntityId, FilterScope};
use super::validation::{ValidationError, require_non_negative, require_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCategory {
    pub restaurant_id: EntityId,
    pub name: String,
    pub description: Option<String>,
}

impl EntityData for MenuCategory {
    type Filter = MenuCategoryFilter;
    const KIND: EntityKind = EntityKind::MenuCategory;
}

pub fn validate_menu_category(category: &MenuCategory) -> Result<(), ValidationError> {
    require_text("name", &category.name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuCategoryFilter {
    pub scope: FilterScope,
    pub restaurant_id: Option<EntityId>,
    pub name: Option<String>,
}

impl RecordFilter<MenuCategory> for MenuCategoryFilter {
    fn scope(&self) -> &FilterScope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut FilterScope {
        &mut self.scope
    }

    fn matches_data(&self, data: &MenuCategory) -> bool {
        eq_or_any(self.restaurant_id.as_ref(), &data.restaurant_id)
            && contains_or_any(self.name.as_deref(), &data.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuCategoryPatch {
    pub restaurant_id: Option<EntityId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub meta: Option<Value>,
}

impl MenuCategoryPatch {
    #[must_use]
    pub fn apply(&self, mut category: MenuCategory) -> MenuCategory {
        if let Some(restaurant_id) = self.restaurant_id {
            category.restaurant_id = restaurant_id;
        }
        if let Some(name) = &self.name {
            category.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            category.description = Some(description.clone());
        }
        category
    }
}

/// Vector produced by the embedding collaborator from menu-item text.
///
/// The platform stores it opaquely and never computes one itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding(Vec<f32>);

/// Reasons an embedding payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding must contain at least one component")]
    Empty,
    #[error("embedding component {index} is not finite")]
    NotFinite { index: usize },
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Result<Self, EmbeddingError> {
        if values.is_empty() {
            return Err(EmbeddingError::Empty);
        }
        if let Some(index) = values.iter().position(|value| !value.is_finite()) {
            return Err(EmbeddingError::NotFinite { index });
        }
        Ok(Self(values))
    }

    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub restaurant_id: EntityId,
    pub category_id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
    pub embedding: Option<Embedding>,
    /// Weak references into the file service.
    pub image_file_ids: Vec<EntityId>,
}

impl EntityData for MenuItem {
    type Filter = MenuItemFilter;
    const KIND: EntityKind = EntityKind::MenuItem;
}

impl MenuItem {
    /// Whether the fields the embedding is derived from differ.
    #[must_use]
    pub fn embedding_inputs_differ(&self, other: &Self) -> bool {
        self.name != other.name
            || self.description != other.description
            || self.price.to_bits() != other.price.to_bits()
    }
}

pub fn validate_menu_item(item: &MenuItem) -> Result<(), ValidationError> {
    require_text("name", &item.name)?;
    require_non_negative("price", item.price)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuItemFilter {
    pub scope: FilterScope,
    pub restaurant_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
    pub name: Option<String>,
    pub is_available: Option<bool>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl RecordFilter<MenuItem> for MenuItemFilter {
    fn scope(&self) -> &FilterScope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut FilterScope {
        &mut self.scope
    }

    fn matches_data(&self, data: &MenuItem) -> bool {
        eq_or_any(self.restaurant_id.as_ref(), &data.restaurant_id)
            && eq_optional(self.category_id.as_ref(), data.category_id.as_ref())
            && contains_or_any(self.name.as_deref(), &data.name)
            && eq_or_any(self.is_available.as_ref(), &data.is_available)
            && within_bounds(self.price_min, self.price_max, data.price)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuItemPatch {
    pub restaurant_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub is_available: Option<bool>,
    pub image_file_ids: Option<Vec<EntityId>>,
    pub meta: Option<Value>,
}

impl MenuItemPatch {
    #[must_use]
    pub fn apply(&self, mut item: MenuItem) -> MenuItem {
        if let Some(restaurant_id) = self.restaurant_id {
            item.restaurant_id = restaurant_id;
        }
        if let Some(category_id) = self.category_id {
            item.category_id = Some(category_id);
        }
        if let Some(name) = &self.name {
            item.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            item.description = Some(description.clone());
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(available) = self.is_available {
            item.is_available = available;
        }
        if let Some(images) = &self.image_file_ids {
            item.image_file_ids.clone_from(images);
        }
        item
    }
}
