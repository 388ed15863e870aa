//! Domain primitives, aggregates and services.
//!
//! Purpose: define the entities shared by the user, restaurant, menu and file
//! services, the ports they depend on, and the services implementing each
//! driving port. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - Entity values (`User`, `UserAddress`, `Restaurant`, `MenuCategory`,
//!   `MenuItem`, `FileRecord`) with their filters and patches.
//! - `Persisted<T>`: an entity plus its id, metadata, timestamps and
//!   `DeletionState`.
//! - Services: `UserAccountService`, `RestaurantDirectoryService`,
//!   `MenuCatalogueService`, `FileLibraryService`.

mod entity;
pub mod error;
mod file;
pub mod file_service;
mod menu;
pub mod menu_service;
mod outcome;
mod person;
pub mod ports;
mod record;
pub mod reference;
mod restaurant;
pub mod restaurant_service;
mod service_support;
mod trace_id;
mod user;
pub mod user_service;
mod validation;

pub use self::entity::{EntityData, EntityKind, RecordFilter};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::file::{
    Checksum, FileFilter, FilePatch, FilePurpose, FileRecord, ImageDimensions, StoragePath,
    is_image_mime, validate_file,
};
pub use self::file_service::FileLibraryService;
pub use self::menu::{
    Embedding, EmbeddingError, MenuCategory, MenuCategoryFilter, MenuCategoryPatch, MenuItem,
    MenuItemFilter, MenuItemPatch, validate_menu_category, validate_menu_item,
};
pub use self::menu_service::{MenuCatalogueService, MenuCollaborators};
pub use self::outcome::WithWarnings;
pub use self::person::{AuthProvider, PersonDetails};
pub use self::record::{
    DeletionState, EntityId, FilterScope, Persisted, RecordHeader, next_update_timestamp,
};
pub use self::reference::ReferenceValidator;
pub use self::restaurant::{Restaurant, RestaurantFilter, RestaurantPatch, validate_restaurant};
pub use self::restaurant_service::RestaurantDirectoryService;
pub use self::trace_id::TraceId;
pub use self::user::{
    GeoPoint, User, UserAddress, UserAddressFilter, UserAddressPatch, UserFilter, UserPatch,
    validate_user, validate_user_address,
};
pub use self::user_service::UserAccountService;
pub use self::validation::ValidationError;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use food_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such restaurant"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
