//! Shared HTTP adapter state.
//!
//! Each service process mounts only its own handlers, so state is split per
//! service. Handlers receive it through `actix_web::web::Data` and depend on
//! driving ports only, which keeps them testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FileLibrary, MenuCatalogue, RestaurantDirectory, UserAccounts};

/// Dependencies of the user and user-address handlers.
#[derive(Clone)]
pub struct UserHttpState {
    pub accounts: Arc<dyn UserAccounts>,
}

impl UserHttpState {
    pub fn new(accounts: Arc<dyn UserAccounts>) -> Self {
        Self { accounts }
    }
}

#[derive(Clone)]
pub struct RestaurantHttpState {
    pub directory: Arc<dyn RestaurantDirectory>,
}

impl RestaurantHttpState {
    pub fn new(directory: Arc<dyn RestaurantDirectory>) -> Self {
        Self { directory }
    }
}

#[derive(Clone)]
pub struct MenuHttpState {
    pub catalogue: Arc<dyn MenuCatalogue>,
}

impl MenuHttpState {
    pub fn new(catalogue: Arc<dyn MenuCatalogue>) -> Self {
        Self { catalogue }
    }
}

/// Dependencies of the file handlers, including the multipart body cap.
#[derive(Clone)]
pub struct FileHttpState {
    pub library: Arc<dyn FileLibrary>,
    pub max_upload_bytes: usize,
}

impl FileHttpState {
    pub fn new(library: Arc<dyn FileLibrary>, max_upload_bytes: usize) -> Self {
        Self {
            library,
            max_upload_bytes,
        }
    }
}
