//! Builders for per-service HTTP state over Diesel repositories.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use food_backend::config::{ServiceKind, ServiceUrls};
use food_backend::domain::ports::{EntityRepository, ReferenceChecker};
use food_backend::domain::{
    EntityData, EntityKind, FileLibraryService, FileRecord, MenuCatalogueService, MenuCategory,
    MenuCollaborators, MenuItem, ReferenceValidator, Restaurant, RestaurantDirectoryService, User,
    UserAccountService, UserAddress,
};
use food_backend::inbound::http::state::{
    FileHttpState, MenuHttpState, RestaurantHttpState, UserHttpState,
};
use food_backend::outbound::collaborators::{
    HttpEmbeddingClient, HttpFileServiceClient, HttpMenuImagePipeline,
};
use food_backend::outbound::persistence::{
    DieselFileRepository, DieselMenuCategoryRepository, DieselMenuItemRepository,
    DieselRestaurantRepository, DieselUserAddressRepository, DieselUserRepository,
};
use food_backend::outbound::reference::{
    HttpReferenceChecker, RepositoryReferenceChecker, RoutedReferenceChecker,
};
use food_backend::outbound::storage::LocalBlobStorage;

use super::ServerConfig;

/// State mounted by exactly one service process.
#[derive(Clone)]
pub(crate) enum ServiceState {
    Users(web::Data<UserHttpState>),
    Restaurants(web::Data<RestaurantHttpState>),
    Menu(web::Data<MenuHttpState>),
    Files(web::Data<FileHttpState>),
}

/// Base URL of the service that owns `kind`.
fn owner_url(urls: &ServiceUrls, kind: EntityKind) -> &url::Url {
    match kind {
        EntityKind::User | EntityKind::UserAddress => &urls.user,
        EntityKind::Restaurant => &urls.restaurant,
        EntityKind::MenuCategory | EntityKind::MenuItem => &urls.menu,
        EntityKind::File => &urls.file,
    }
}

const ALL_KINDS: [EntityKind; 6] = [
    EntityKind::User,
    EntityKind::UserAddress,
    EntityKind::Restaurant,
    EntityKind::MenuCategory,
    EntityKind::MenuItem,
    EntityKind::File,
];

fn local_checker<T: EntityData>(repo: Arc<dyn EntityRepository<T>>) -> Arc<dyn ReferenceChecker> {
    Arc::new(RepositoryReferenceChecker::new(repo))
}

/// HTTP checks for every kind, overridden by local checks for owned kinds.
fn reference_validator(
    config: &ServerConfig,
    local: Vec<(EntityKind, Arc<dyn ReferenceChecker>)>,
) -> io::Result<ReferenceValidator> {
    let mut remote = HttpReferenceChecker::new(config.reference_timeout).map_err(io::Error::other)?;
    for kind in ALL_KINDS {
        remote = remote
            .with_service(kind, owner_url(&config.urls, kind))
            .map_err(io::Error::other)?;
    }
    let routed = local
        .into_iter()
        .fold(RoutedReferenceChecker::new(Arc::new(remote)), |routed, (kind, checker)| {
            routed.route(kind, checker)
        });
    Ok(ReferenceValidator::new(Arc::new(routed)))
}

fn eyre_to_io(report: color_eyre::Report) -> io::Error {
    io::Error::other(format!("{report:#}"))
}

fn build_user_state(config: &ServerConfig, clock: Arc<dyn Clock>) -> io::Result<ServiceState> {
    let users: Arc<dyn EntityRepository<User>> = Arc::new(DieselUserRepository::new(
        config.db_pool.clone(),
        Arc::clone(&clock),
    ));
    let addresses: Arc<dyn EntityRepository<UserAddress>> =
        Arc::new(DieselUserAddressRepository::new(config.db_pool.clone(), clock));
    let references = reference_validator(
        config,
        vec![
            (EntityKind::User, local_checker(Arc::clone(&users))),
            (EntityKind::UserAddress, local_checker(Arc::clone(&addresses))),
        ],
    )?;
    let service = UserAccountService::new(users, addresses, references);
    Ok(ServiceState::Users(web::Data::new(UserHttpState::new(
        Arc::new(service),
    ))))
}

fn build_restaurant_state(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> io::Result<ServiceState> {
    let restaurants: Arc<dyn EntityRepository<Restaurant>> =
        Arc::new(DieselRestaurantRepository::new(config.db_pool.clone(), clock));
    let references = reference_validator(
        config,
        vec![(EntityKind::Restaurant, local_checker(Arc::clone(&restaurants)))],
    )?;
    let service = RestaurantDirectoryService::new(restaurants, references);
    Ok(ServiceState::Restaurants(web::Data::new(
        RestaurantHttpState::new(Arc::new(service)),
    )))
}

fn build_menu_state(config: &ServerConfig, clock: Arc<dyn Clock>) -> io::Result<ServiceState> {
    let items: Arc<dyn EntityRepository<MenuItem>> = Arc::new(DieselMenuItemRepository::new(
        config.db_pool.clone(),
        Arc::clone(&clock),
    ));
    let categories: Arc<dyn EntityRepository<MenuCategory>> =
        Arc::new(DieselMenuCategoryRepository::new(config.db_pool.clone(), clock));
    let references = reference_validator(
        config,
        vec![
            (EntityKind::MenuItem, local_checker(Arc::clone(&items))),
            (EntityKind::MenuCategory, local_checker(Arc::clone(&categories))),
        ],
    )?;
    let collaborators = MenuCollaborators {
        embeddings: Arc::new(
            HttpEmbeddingClient::new(&config.urls.embedding, config.collaborator_timeout)
                .map_err(eyre_to_io)?,
        ),
        files: Arc::new(
            HttpFileServiceClient::new(&config.urls.file, config.collaborator_timeout)
                .map_err(eyre_to_io)?,
        ),
    };
    let service = MenuCatalogueService::new(items, categories, references, collaborators);
    Ok(ServiceState::Menu(web::Data::new(MenuHttpState::new(
        Arc::new(service),
    ))))
}

fn build_file_state(config: &ServerConfig, clock: Arc<dyn Clock>) -> io::Result<ServiceState> {
    let files: Arc<dyn EntityRepository<FileRecord>> = Arc::new(DieselFileRepository::new(
        config.db_pool.clone(),
        clock,
    ));
    let references = reference_validator(
        config,
        vec![(EntityKind::File, local_checker(Arc::clone(&files)))],
    )?;
    let blobs = LocalBlobStorage::open(&config.upload_root)?;
    let pipeline =
        HttpMenuImagePipeline::new(&config.urls.data_pipeline, config.collaborator_timeout)
            .map_err(eyre_to_io)?;
    let service = FileLibraryService::new(files, Arc::new(blobs), references, Arc::new(pipeline));
    Ok(ServiceState::Files(web::Data::new(FileHttpState::new(
        Arc::new(service),
        config.max_upload_bytes,
    ))))
}

/// Build the state for the service named in `config`.
///
/// # Errors
///
/// Returns [`io::Error`] when an HTTP client cannot be built, a collaborator
/// URL cannot be joined, or the upload root cannot be opened.
pub(crate) fn build_service_state(config: &ServerConfig) -> io::Result<ServiceState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match config.kind {
        ServiceKind::User => build_user_state(config, clock),
        ServiceKind::Restaurant => build_restaurant_state(config, clock),
        ServiceKind::Menu => build_menu_state(config, clock),
        ServiceKind::File => build_file_state(config, clock),
    }
}
