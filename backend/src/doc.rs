//! OpenAPI documentation for the four services.
//!
//! One document covers every service; each process serves it unchanged
//! from `/api-docs/openapi.json` in debug builds, and `openapi-dump`
//! prints it for client generation.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::files::{
    FileResponse, RegisterFileRequest, UpdateFileRequest, UploadResponse,
};
use crate::inbound::http::health::HealthBody;
use crate::inbound::http::menu::{
    CategoryResponse, CreateCategoryRequest, CreateMenuItemRequest, MenuItemResponse,
    UpdateCategoryRequest, UpdateMenuItemRequest,
};
use crate::inbound::http::records::{DeletionResponse, RecordFields};
use crate::inbound::http::restaurants::{
    CreateRestaurantRequest, RestaurantResponse, UpdateRestaurantRequest,
};
use crate::inbound::http::user_addresses::{
    AddressResponse, CreateAddressRequest, UpdateAddressRequest,
};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest, UserResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Food delivery services API",
        description = "User, restaurant, menu and file services with cross-service reference checks."
    ),
    servers(
        (url = "/", description = "Relative to the service base URL")
    ),
    paths(
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::user_addresses::create_address,
        crate::inbound::http::user_addresses::list_addresses,
        crate::inbound::http::user_addresses::update_address,
        crate::inbound::http::user_addresses::delete_address,
        crate::inbound::http::restaurants::create_restaurant,
        crate::inbound::http::restaurants::list_restaurants,
        crate::inbound::http::restaurants::update_restaurant,
        crate::inbound::http::restaurants::delete_restaurant,
        crate::inbound::http::menu::create_item,
        crate::inbound::http::menu::list_items,
        crate::inbound::http::menu::list_restaurant_items,
        crate::inbound::http::menu::update_item,
        crate::inbound::http::menu::remove_item_image,
        crate::inbound::http::menu::delete_item,
        crate::inbound::http::menu::create_category,
        crate::inbound::http::menu::list_categories,
        crate::inbound::http::menu::update_category,
        crate::inbound::http::menu::delete_category,
        crate::inbound::http::files::register_file,
        crate::inbound::http::files::upload_files,
        crate::inbound::http::files::list_files,
        crate::inbound::http::files::update_file,
        crate::inbound::http::files::delete_file,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RecordFields,
        DeletionResponse,
        CreateUserRequest,
        UpdateUserRequest,
        UserResponse,
        CreateAddressRequest,
        UpdateAddressRequest,
        AddressResponse,
        CreateRestaurantRequest,
        UpdateRestaurantRequest,
        RestaurantResponse,
        CreateMenuItemRequest,
        UpdateMenuItemRequest,
        MenuItemResponse,
        CreateCategoryRequest,
        UpdateCategoryRequest,
        CategoryResponse,
        RegisterFileRequest,
        UpdateFileRequest,
        FileResponse,
        UploadResponse,
        HealthBody,
    )),
    tags(
        (name = "users", description = "User accounts (user service)"),
        (name = "user-addresses", description = "Delivery addresses and the default-address pointer (user service)"),
        (name = "restaurants", description = "Restaurant directory (restaurant service)"),
        (name = "menu", description = "Menu items and categories (menu service)"),
        (name = "files", description = "File metadata and uploads (file service)"),
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;
