//! Menu item and category handlers.
//!
//! ```text
//! POST   /api/menu
//! GET    /api/menu?id=&restaurant_id=&category_id=&name=&is_available=&price_min=&price_max=
//! GET    /api/menu/restaurant/{id}
//! PATCH  /api/menu?id=
//! DELETE /api/menu/image?menu_item_id=&file_id=
//! DELETE /api/menu/{id}
//! POST   /api/menu/categories
//! GET    /api/menu/categories?id=&restaurant_id=&name=
//! PATCH  /api/menu/categories?id=
//! DELETE /api/menu/categories/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    EntityKind, Error, FilterScope, MenuCategory, MenuCategoryFilter, MenuCategoryPatch, MenuItem,
    MenuItemFilter, MenuItemPatch, Persisted, WithWarnings,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::records::{DeletionResponse, RecordFields};
use crate::inbound::http::state::MenuHttpState;
use crate::inbound::http::validation::{
    FieldName, IdQuery, parse_entity_id, parse_entity_id_list, parse_optional_entity_id, require,
};

/// Body for `POST /api/menu`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub restaurant_id: Option<String>,
    pub category_id: Option<String>,
    #[schema(example = "Masala Dosa")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = 8.5)]
    pub price: Option<f64>,
    pub is_available: Option<bool>,
    #[serde(default)]
    pub image_file_ids: Vec<String>,
    pub meta: Option<Value>,
}

impl CreateMenuItemRequest {
    fn into_domain(self) -> Result<(Option<Value>, MenuItem), Error> {
        let restaurant_id = require(self.restaurant_id, FieldName::new("restaurant_id"))?;
        let item = MenuItem {
            restaurant_id: parse_entity_id(&restaurant_id, FieldName::new("restaurant_id"))?,
            category_id: parse_optional_entity_id(
                self.category_id,
                FieldName::new("category_id"),
            )?,
            name: self.name.unwrap_or_default(),
            description: self.description,
            price: require(self.price, FieldName::new("price"))?,
            is_available: self.is_available.unwrap_or(true),
            embedding: None,
            image_file_ids: parse_entity_id_list(
                self.image_file_ids,
                FieldName::new("image_file_ids"),
            )?,
        };
        Ok((self.meta, item))
    }
}

/// Body for `PATCH /api/menu?id=`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub restaurant_id: Option<String>,
    pub category_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub is_available: Option<bool>,
    pub image_file_ids: Option<Vec<String>>,
    pub meta: Option<Value>,
}

impl TryFrom<UpdateMenuItemRequest> for MenuItemPatch {
    type Error = Error;

    fn try_from(value: UpdateMenuItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            restaurant_id: parse_optional_entity_id(
                value.restaurant_id,
                FieldName::new("restaurant_id"),
            )?,
            category_id: parse_optional_entity_id(
                value.category_id,
                FieldName::new("category_id"),
            )?,
            name: value.name,
            description: value.description,
            price: value.price,
            is_available: value.is_available,
            image_file_ids: value
                .image_file_ids
                .map(|ids| parse_entity_id_list(ids, FieldName::new("image_file_ids")))
                .transpose()?,
            meta: value.meta,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MenuItemQuery {
    pub id: Option<String>,
    pub restaurant_id: Option<String>,
    pub category_id: Option<String>,
    /// Substring match.
    pub name: Option<String>,
    pub is_available: Option<bool>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl TryFrom<MenuItemQuery> for MenuItemFilter {
    type Error = Error;

    fn try_from(value: MenuItemQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            scope: FilterScope {
                id: parse_optional_entity_id(value.id, FieldName::new("id"))?,
                include_deleted: false,
            },
            restaurant_id: parse_optional_entity_id(
                value.restaurant_id,
                FieldName::new("restaurant_id"),
            )?,
            category_id: parse_optional_entity_id(
                value.category_id,
                FieldName::new("category_id"),
            )?,
            name: value.name,
            is_available: value.is_available,
            price_min: value.price_min,
            price_max: value.price_max,
        })
    }
}

/// Selector for `DELETE /api/menu/image`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemImageQuery {
    pub menu_item_id: Option<String>,
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MenuItemResponse {
    #[serde(flatten)]
    pub record: RecordFields,
    pub restaurant_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
    /// Absent when the embedding service could not produce a vector.
    pub embedding: Option<Vec<f32>>,
    pub image_file_ids: Vec<Uuid>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<Persisted<MenuItem>> for MenuItemResponse {
    fn from(value: Persisted<MenuItem>) -> Self {
        let record = RecordFields::from(&value.header);
        let item = value.data;
        Self {
            record,
            restaurant_id: *item.restaurant_id.as_uuid(),
            category_id: item.category_id.map(|id| *id.as_uuid()),
            name: item.name,
            description: item.description,
            price: item.price,
            is_available: item.is_available,
            embedding: item
                .embedding
                .as_ref()
                .map(|embedding| embedding.as_slice().to_vec()),
            image_file_ids: item.image_file_ids.iter().map(|id| *id.as_uuid()).collect(),
            warnings: Vec::new(),
        }
    }
}

impl From<WithWarnings<Persisted<MenuItem>>> for MenuItemResponse {
    fn from(value: WithWarnings<Persisted<MenuItem>>) -> Self {
        let (item, warnings) = value.into_parts();
        Self {
            warnings,
            ..Self::from(item)
        }
    }
}

/// Body for `POST /api/menu/categories`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub restaurant_id: Option<String>,
    #[schema(example = "Breakfast")]
    pub name: Option<String>,
    pub description: Option<String>,
    pub meta: Option<Value>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub restaurant_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub meta: Option<Value>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    pub id: Option<String>,
    pub restaurant_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryResponse {
    #[serde(flatten)]
    pub record: RecordFields,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

impl From<Persisted<MenuCategory>> for CategoryResponse {
    fn from(value: Persisted<MenuCategory>) -> Self {
        Self {
            record: RecordFields::from(&value.header),
            restaurant_id: *value.data.restaurant_id.as_uuid(),
            name: value.data.name,
            description: value.data.description,
        }
    }
}

/// Create a menu item. An embedding failure still creates the item and
/// reports a warning.
#[utoipa::path(
    post,
    path = "/api/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = MenuItemResponse),
        (status = 400, description = "Invalid request or reference", body = Error),
        (status = 503, description = "Reference check or store unavailable", body = Error)
    ),
    tags = ["menu"],
    operation_id = "createMenuItem"
)]
#[post("/menu")]
pub async fn create_item(
    state: web::Data<MenuHttpState>,
    payload: web::Json<CreateMenuItemRequest>,
) -> ApiResult<HttpResponse> {
    let (meta, item) = payload.into_inner().into_domain()?;
    let outcome = state.catalogue.create_item(meta, item).await?;
    Ok(HttpResponse::Created().json(MenuItemResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    params(MenuItemQuery),
    responses(
        (status = 200, description = "Matching menu items", body = [MenuItemResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["menu"],
    operation_id = "listMenuItems"
)]
#[get("/menu")]
pub async fn list_items(
    state: web::Data<MenuHttpState>,
    query: web::Query<MenuItemQuery>,
) -> ApiResult<web::Json<Vec<MenuItemResponse>>> {
    let filter = MenuItemFilter::try_from(query.into_inner())?;
    respond_with_items(&state, filter).await
}

/// Active items of one restaurant.
#[utoipa::path(
    get,
    path = "/api/menu/restaurant/{id}",
    params(("id" = String, Path, description = "Restaurant identifier")),
    responses(
        (status = 200, description = "Menu items of the restaurant", body = [MenuItemResponse]),
        (status = 400, description = "Invalid identifier", body = Error)
    ),
    tags = ["menu"],
    operation_id = "listRestaurantMenu"
)]
#[get("/menu/restaurant/{id}")]
pub async fn list_restaurant_items(
    state: web::Data<MenuHttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MenuItemResponse>>> {
    let restaurant_id = parse_entity_id(&path.into_inner(), FieldName::new("id"))?;
    let filter = MenuItemFilter {
        restaurant_id: Some(restaurant_id),
        ..MenuItemFilter::default()
    };
    respond_with_items(&state, filter).await
}

async fn respond_with_items(
    state: &MenuHttpState,
    filter: MenuItemFilter,
) -> ApiResult<web::Json<Vec<MenuItemResponse>>> {
    let items = state.catalogue.list_items(filter).await?;
    Ok(web::Json(
        items.into_iter().map(MenuItemResponse::from).collect(),
    ))
}

/// Partially update a menu item, re-embedding when its name, description
/// or price change.
#[utoipa::path(
    patch,
    path = "/api/menu",
    params(IdQuery),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = MenuItemResponse),
        (status = 400, description = "Invalid request or reference", body = Error),
        (status = 404, description = "No active menu item with that id", body = Error)
    ),
    tags = ["menu"],
    operation_id = "updateMenuItem"
)]
#[patch("/menu")]
pub async fn update_item(
    state: web::Data<MenuHttpState>,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateMenuItemRequest>,
) -> ApiResult<web::Json<MenuItemResponse>> {
    let id = query.target()?;
    let patch = MenuItemPatch::try_from(payload.into_inner())?;
    let outcome = state.catalogue.update_item(id, patch).await?;
    Ok(web::Json(MenuItemResponse::from(outcome)))
}

/// Detach an image from a menu item, then ask the file service to delete it.
#[utoipa::path(
    delete,
    path = "/api/menu/image",
    params(ItemImageQuery),
    responses(
        (status = 200, description = "Image detached", body = MenuItemResponse),
        (status = 400, description = "Invalid identifiers", body = Error),
        (status = 404, description = "Item missing or image not attached", body = Error)
    ),
    tags = ["menu"],
    operation_id = "removeMenuItemImage"
)]
#[delete("/menu/image")]
pub async fn remove_item_image(
    state: web::Data<MenuHttpState>,
    query: web::Query<ItemImageQuery>,
) -> ApiResult<web::Json<MenuItemResponse>> {
    let ItemImageQuery {
        menu_item_id,
        file_id,
    } = query.into_inner();
    let item_field = FieldName::new("menu_item_id");
    let file_field = FieldName::new("file_id");
    let item_id = parse_entity_id(&require(menu_item_id, item_field)?, item_field)?;
    let file_id = parse_entity_id(&require(file_id, file_field)?, file_field)?;
    let outcome = state.catalogue.remove_item_image(item_id, file_id).await?;
    Ok(web::Json(MenuItemResponse::from(outcome)))
}

#[utoipa::path(
    delete,
    path = "/api/menu/{id}",
    params(("id" = String, Path, description = "Menu item identifier")),
    responses(
        (status = 200, description = "Menu item deleted", body = DeletionResponse),
        (status = 404, description = "No active menu item with that id", body = Error)
    ),
    tags = ["menu"],
    operation_id = "deleteMenuItem"
)]
#[delete("/menu/{id}")]
pub async fn delete_item(
    state: web::Data<MenuHttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletionResponse>> {
    let id = parse_entity_id(&path.into_inner(), FieldName::new("id"))?;
    state.catalogue.delete_item(id).await?;
    Ok(web::Json(DeletionResponse::new(EntityKind::MenuItem)))
}

#[utoipa::path(
    post,
    path = "/api/menu/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request or reference", body = Error)
    ),
    tags = ["menu"],
    operation_id = "createMenuCategory"
)]
#[post("/menu/categories")]
pub async fn create_category(
    state: web::Data<MenuHttpState>,
    payload: web::Json<CreateCategoryRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let restaurant_field = FieldName::new("restaurant_id");
    let restaurant_id = require(request.restaurant_id, restaurant_field)?;
    let category = MenuCategory {
        restaurant_id: parse_entity_id(&restaurant_id, restaurant_field)?,
        name: request.name.unwrap_or_default(),
        description: request.description,
    };
    let created = state
        .catalogue
        .create_category(request.meta, category)
        .await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/api/menu/categories",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Matching categories", body = [CategoryResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["menu"],
    operation_id = "listMenuCategories"
)]
#[get("/menu/categories")]
pub async fn list_categories(
    state: web::Data<MenuHttpState>,
    query: web::Query<CategoryQuery>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    let CategoryQuery {
        id,
        restaurant_id,
        name,
    } = query.into_inner();
    let filter = MenuCategoryFilter {
        scope: FilterScope {
            id: parse_optional_entity_id(id, FieldName::new("id"))?,
            include_deleted: false,
        },
        restaurant_id: parse_optional_entity_id(restaurant_id, FieldName::new("restaurant_id"))?,
        name,
    };
    let categories = state.catalogue.list_categories(filter).await?;
    Ok(web::Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/menu/categories",
    params(IdQuery),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Invalid request or reference", body = Error),
        (status = 404, description = "No active category with that id", body = Error)
    ),
    tags = ["menu"],
    operation_id = "updateMenuCategory"
)]
#[patch("/menu/categories")]
pub async fn update_category(
    state: web::Data<MenuHttpState>,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateCategoryRequest>,
) -> ApiResult<web::Json<CategoryResponse>> {
    let id = query.target()?;
    let request = payload.into_inner();
    let patch = MenuCategoryPatch {
        restaurant_id: parse_optional_entity_id(
            request.restaurant_id,
            FieldName::new("restaurant_id"),
        )?,
        name: request.name,
        description: request.description,
        meta: request.meta,
    };
    let updated = state.catalogue.update_category(id, patch).await?;
    Ok(web::Json(CategoryResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/menu/categories/{id}",
    params(("id" = String, Path, description = "Category identifier")),
    responses(
        (status = 200, description = "Category deleted", body = DeletionResponse),
        (status = 404, description = "No active category with that id", body = Error)
    ),
    tags = ["menu"],
    operation_id = "deleteMenuCategory"
)]
#[delete("/menu/categories/{id}")]
pub async fn delete_category(
    state: web::Data<MenuHttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletionResponse>> {
    let id = parse_entity_id(&path.into_inner(), FieldName::new("id"))?;
    state.catalogue.delete_category(id).await?;
    Ok(web::Json(DeletionResponse::new(EntityKind::MenuCategory)))
}

#[cfg(test)]
#[path = "menu_tests.rs"]
mod tests;
