//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! One adapter per entity table implements the generic `EntityRepository`
//! port over a shared `diesel-async` pool. Row structs and table definitions
//! stay private to this module; adapters only translate between rows and
//! domain records.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use food_backend::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/food")).await?;
//! let users = DieselUserRepository::new(pool, Arc::new(mockable::DefaultClock));
//! ```

mod diesel_file_repository;
mod diesel_menu_repository;
mod diesel_restaurant_repository;
mod diesel_support;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_file_repository::DieselFileRepository;
pub use diesel_menu_repository::{DieselMenuCategoryRepository, DieselMenuItemRepository};
pub use diesel_restaurant_repository::DieselRestaurantRepository;
pub use diesel_user_repository::{DieselUserAddressRepository, DieselUserRepository};
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
