//! Diesel row structs and their translation to domain records.
//!
//! Rows never leave the persistence layer. Reading a row back validates the
//! text-encoded enums and value types; a row that fails is reported as a
//! query error rather than silently coerced.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    AuthProvider, Checksum, DeletionState, Embedding, EntityData, EntityId, FilePurpose,
    FileRecord, GeoPoint, ImageDimensions, MenuCategory, MenuItem, Persisted, PersonDetails,
    RecordHeader, Restaurant, StoragePath, User, UserAddress,
};

use super::diesel_support::corrupt_row;
use super::schema::{files, menu_categories, menu_items, restaurants, user_addresses, users};

fn ids(values: Vec<Uuid>) -> Vec<EntityId> {
    values.into_iter().map(EntityId::from_uuid).collect()
}

fn uuids(values: &[EntityId]) -> Vec<Uuid> {
    values.iter().map(|id| *id.as_uuid()).collect()
}

fn parse_provider<T: EntityData>(id: Uuid, raw: &str) -> Result<AuthProvider, RepositoryError> {
    raw.parse()
        .map_err(|err| corrupt_row(T::KIND, id, err))
}

fn active_header(
    id: Uuid,
    meta: Option<Value>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> RecordHeader {
    RecordHeader {
        id: EntityId::from_uuid(id),
        meta,
        deletion: DeletionState::from_active_flag(is_active, updated_at),
        created_at,
        updated_at,
    }
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: String,
    pub preferences: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub default_address_id: Option<Uuid>,
    pub meta: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow {
    pub id: Uuid,
    #[diesel(embed)]
    pub changes: UserChanges,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every mutable column; `None` writes `NULL`.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChanges {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: String,
    pub preferences: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub default_address_id: Option<Uuid>,
    pub meta: Option<Value>,
}

impl UserChanges {
    pub fn new(meta: Option<Value>, user: &User) -> Self {
        Self {
            name: user.person.name.clone(),
            email: user.person.email.clone(),
            phone: user.person.phone.clone(),
            auth_provider: user.person.auth_provider.as_str().to_owned(),
            preferences: user.preferences.iter().cloned().collect(),
            dietary_restrictions: user.dietary_restrictions.iter().cloned().collect(),
            default_address_id: user.default_address_id.map(|id| *id.as_uuid()),
            meta,
        }
    }
}

impl TryFrom<UserRow> for Persisted<User> {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let auth_provider = parse_provider::<User>(row.id, &row.auth_provider)?;
        Ok(Self {
            header: active_header(row.id, row.meta, row.is_active, row.created_at, row.updated_at),
            data: User {
                person: PersonDetails {
                    name: row.name,
                    email: row.email,
                    phone: row.phone,
                    auth_provider,
                },
                preferences: row.preferences.into_iter().collect(),
                dietary_restrictions: row.dietary_restrictions.into_iter().collect(),
                default_address_id: row.default_address_id.map(EntityId::from_uuid),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// user_addresses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_addresses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserAddressRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub alias_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_primary: bool,
    pub meta: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_addresses)]
pub(crate) struct NewUserAddressRow {
    pub id: Uuid,
    #[diesel(embed)]
    pub changes: UserAddressChanges,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = user_addresses)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserAddressChanges {
    pub user_id: Uuid,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub alias_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_primary: bool,
    pub meta: Option<Value>,
}

impl UserAddressChanges {
    pub fn new(meta: Option<Value>, address: &UserAddress) -> Self {
        Self {
            user_id: *address.user_id.as_uuid(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
            alias_name: address.alias_name.clone(),
            latitude: address.location.map(|point| point.latitude),
            longitude: address.location.map(|point| point.longitude),
            is_primary: address.is_primary,
            meta,
        }
    }
}

impl TryFrom<UserAddressRow> for Persisted<UserAddress> {
    type Error = RepositoryError;

    fn try_from(row: UserAddressRow) -> Result<Self, Self::Error> {
        let location = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            (None, None) => None,
            _ => {
                return Err(corrupt_row(
                    UserAddress::KIND,
                    row.id,
                    "only one coordinate is stored",
                ));
            }
        };
        Ok(Self {
            header: active_header(row.id, row.meta, row.is_active, row.created_at, row.updated_at),
            data: UserAddress {
                user_id: EntityId::from_uuid(row.user_id),
                address_line1: row.address_line1,
                address_line2: row.address_line2,
                city: row.city,
                state: row.state,
                postal_code: row.postal_code,
                country: row.country,
                alias_name: row.alias_name,
                location,
                is_primary: row.is_primary,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// restaurants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = restaurants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RestaurantRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: String,
    pub owner_id: Option<Uuid>,
    pub cuisine_types: Vec<String>,
    pub operating_hours: Value,
    pub location: String,
    pub rating: f64,
    pub delivery_fee: f64,
    pub image_file_ids: Vec<Uuid>,
    pub meta: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = restaurants)]
pub(crate) struct NewRestaurantRow {
    pub id: Uuid,
    #[diesel(embed)]
    pub changes: RestaurantChanges,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = restaurants)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RestaurantChanges {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: String,
    pub owner_id: Option<Uuid>,
    pub cuisine_types: Vec<String>,
    pub operating_hours: Value,
    pub location: String,
    pub rating: f64,
    pub delivery_fee: f64,
    pub image_file_ids: Vec<Uuid>,
    pub meta: Option<Value>,
}

impl RestaurantChanges {
    pub fn new(meta: Option<Value>, restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.person.name.clone(),
            email: restaurant.person.email.clone(),
            phone: restaurant.person.phone.clone(),
            auth_provider: restaurant.person.auth_provider.as_str().to_owned(),
            owner_id: restaurant.owner_id.map(|id| *id.as_uuid()),
            cuisine_types: restaurant.cuisine_types.iter().cloned().collect(),
            operating_hours: restaurant.operating_hours.clone(),
            location: restaurant.location.clone(),
            rating: restaurant.rating,
            delivery_fee: restaurant.delivery_fee,
            image_file_ids: uuids(&restaurant.image_file_ids),
            meta,
        }
    }
}

impl TryFrom<RestaurantRow> for Persisted<Restaurant> {
    type Error = RepositoryError;

    fn try_from(row: RestaurantRow) -> Result<Self, Self::Error> {
        let auth_provider = parse_provider::<Restaurant>(row.id, &row.auth_provider)?;
        Ok(Self {
            header: active_header(row.id, row.meta, row.is_active, row.created_at, row.updated_at),
            data: Restaurant {
                person: PersonDetails {
                    name: row.name,
                    email: row.email,
                    phone: row.phone,
                    auth_provider,
                },
                owner_id: row.owner_id.map(EntityId::from_uuid),
                cuisine_types: row.cuisine_types.into_iter().collect(),
                operating_hours: row.operating_hours,
                location: row.location,
                rating: row.rating,
                delivery_fee: row.delivery_fee,
                image_file_ids: ids(row.image_file_ids),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// menu_categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = menu_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MenuCategoryRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub meta: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = menu_categories)]
pub(crate) struct NewMenuCategoryRow {
    pub id: Uuid,
    #[diesel(embed)]
    pub changes: MenuCategoryChanges,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = menu_categories)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MenuCategoryChanges {
    pub restaurant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub meta: Option<Value>,
}

impl MenuCategoryChanges {
    pub fn new(meta: Option<Value>, category: &MenuCategory) -> Self {
        Self {
            restaurant_id: *category.restaurant_id.as_uuid(),
            name: category.name.clone(),
            description: category.description.clone(),
            meta,
        }
    }
}

impl From<MenuCategoryRow> for Persisted<MenuCategory> {
    fn from(row: MenuCategoryRow) -> Self {
        Self {
            header: active_header(row.id, row.meta, row.is_active, row.created_at, row.updated_at),
            data: MenuCategory {
                restaurant_id: EntityId::from_uuid(row.restaurant_id),
                name: row.name,
                description: row.description,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// menu_items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MenuItemRow {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
    pub embedding: Option<Vec<f32>>,
    pub image_file_ids: Vec<Uuid>,
    pub meta: Option<Value>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = menu_items)]
pub(crate) struct NewMenuItemRow {
    pub id: Uuid,
    #[diesel(embed)]
    pub changes: MenuItemChanges,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = menu_items)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MenuItemChanges {
    pub restaurant_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
    pub embedding: Option<Vec<f32>>,
    pub image_file_ids: Vec<Uuid>,
    pub meta: Option<Value>,
}

impl MenuItemChanges {
    pub fn new(meta: Option<Value>, item: &MenuItem) -> Self {
        Self {
            restaurant_id: *item.restaurant_id.as_uuid(),
            category_id: item.category_id.map(|id| *id.as_uuid()),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            is_available: item.is_available,
            embedding: item
                .embedding
                .as_ref()
                .map(|embedding| embedding.as_slice().to_vec()),
            image_file_ids: uuids(&item.image_file_ids),
            meta,
        }
    }
}

impl TryFrom<MenuItemRow> for Persisted<MenuItem> {
    type Error = RepositoryError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let embedding = row
            .embedding
            .map(Embedding::new)
            .transpose()
            .map_err(|err| corrupt_row(MenuItem::KIND, row.id, err))?;
        Ok(Self {
            header: active_header(row.id, row.meta, row.is_active, row.created_at, row.updated_at),
            data: MenuItem {
                restaurant_id: EntityId::from_uuid(row.restaurant_id),
                category_id: row.category_id.map(EntityId::from_uuid),
                name: row.name,
                description: row.description,
                price: row.price,
                is_available: row.is_available,
                embedding,
                image_file_ids: ids(row.image_file_ids),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FileRow {
    pub id: Uuid,
    pub uploader_id: Uuid,
    pub storage_path: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub purpose: String,
    pub is_public: bool,
    pub dimensions: Value,
    pub meta: Option<Value>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = files)]
pub(crate) struct NewFileRow {
    pub id: Uuid,
    #[diesel(embed)]
    pub changes: FileChanges,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = files)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct FileChanges {
    pub uploader_id: Uuid,
    pub storage_path: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub purpose: String,
    pub is_public: bool,
    pub dimensions: Value,
    pub meta: Option<Value>,
}

impl FileChanges {
    pub fn new(meta: Option<Value>, file: &FileRecord) -> Self {
        Self {
            uploader_id: *file.uploader_id.as_uuid(),
            storage_path: file.storage_path.as_str().to_owned(),
            filename: file.filename.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size_bytes,
            checksum: file.checksum.as_str().to_owned(),
            purpose: file.purpose.to_string(),
            is_public: file.is_public,
            dimensions: ImageDimensions::to_json(file.dimensions),
            meta,
        }
    }
}

impl TryFrom<FileRow> for Persisted<FileRecord> {
    type Error = RepositoryError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |err: crate::domain::ValidationError| corrupt_row(FileRecord::KIND, id, err);
        let storage_path: StoragePath = row.storage_path.parse().map_err(corrupt)?;
        let checksum: Checksum = row.checksum.parse().map_err(corrupt)?;
        let purpose: FilePurpose = row.purpose.parse().map_err(corrupt)?;
        Ok(Self {
            header: RecordHeader {
                id: EntityId::from_uuid(id),
                meta: row.meta,
                deletion: DeletionState::from_deleted_at(row.deleted_at),
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            data: FileRecord {
                uploader_id: EntityId::from_uuid(row.uploader_id),
                storage_path,
                filename: row.filename,
                mime_type: row.mime_type,
                size_bytes: row.size_bytes,
                checksum,
                purpose,
                is_public: row.is_public,
                dimensions: ImageDimensions::from_json(&row.dimensions),
            },
        })
    }
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
