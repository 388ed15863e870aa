//! HTTP inbound adapter exposing the REST endpoints of each service.
//!
//! Every service process mounts only its own routes. The `configure_*`
//! functions register them under `/api` together with the extractor
//! configuration that renders malformed input in the shared error envelope.

use actix_web::web;

pub mod error;
pub mod files;
pub mod health;
pub mod menu;
pub mod records;
pub mod restaurants;
pub mod state;
#[cfg(test)]
pub mod test_utils;
mod upload_form;
pub mod user_addresses;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Routes of the user service: users and their delivery addresses.
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    error::configure_extractors(cfg);
    cfg.service(
        web::scope("/api")
            .service(users::create_user)
            .service(users::list_users)
            .service(users::update_user)
            .service(users::delete_user)
            .service(user_addresses::create_address)
            .service(user_addresses::list_addresses)
            .service(user_addresses::update_address)
            .service(user_addresses::delete_address),
    );
}

pub fn configure_restaurant_routes(cfg: &mut web::ServiceConfig) {
    error::configure_extractors(cfg);
    cfg.service(
        web::scope("/api")
            .service(restaurants::create_restaurant)
            .service(restaurants::list_restaurants)
            .service(restaurants::update_restaurant)
            .service(restaurants::delete_restaurant),
    );
}

/// Routes of the menu service. `DELETE /menu/image` is registered ahead of
/// `DELETE /menu/{id}` so that `image` is never taken for an item id.
pub fn configure_menu_routes(cfg: &mut web::ServiceConfig) {
    error::configure_extractors(cfg);
    cfg.service(
        web::scope("/api")
            .service(menu::create_category)
            .service(menu::list_categories)
            .service(menu::update_category)
            .service(menu::delete_category)
            .service(menu::list_restaurant_items)
            .service(menu::remove_item_image)
            .service(menu::create_item)
            .service(menu::list_items)
            .service(menu::update_item)
            .service(menu::delete_item),
    );
}

pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    error::configure_extractors(cfg);
    cfg.service(
        web::scope("/api")
            .service(files::upload_files)
            .service(files::register_file)
            .service(files::list_files)
            .service(files::update_file)
            .service(files::delete_file),
    );
}

/// Liveness and readiness checks, mounted outside `/api` by every service.
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::ready).service(health::live);
}
