//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod blob_storage;
mod collaborators;
mod entity_repository;
mod file_library;
mod menu_catalogue;
mod reference_checker;
mod restaurant_directory;
mod user_accounts;

#[cfg(test)]
pub use blob_storage::MockBlobStorage;
pub use blob_storage::{BlobStorage, BlobStorageError};
#[cfg(test)]
pub use collaborators::{MockEmbeddingClient, MockFileServiceClient, MockMenuImagePipeline};
pub use collaborators::{
    CollaboratorError, EmbeddingClient, EmbeddingRequest, FileServiceClient,
    FixtureMenuImagePipeline, MenuImagePipeline, MenuImageSubmission,
};
pub use entity_repository::{EntityRepository, RepositoryError};
#[cfg(test)]
pub use file_library::MockFileLibrary;
pub use file_library::{FileLibrary, FileRegistration, UploadBatch, UploadItem, UploadReport};
#[cfg(test)]
pub use menu_catalogue::MockMenuCatalogue;
pub use menu_catalogue::MenuCatalogue;
#[cfg(test)]
pub use reference_checker::MockReferenceChecker;
pub use reference_checker::{ReferenceCheckError, ReferenceChecker, StaticReferenceChecker};
#[cfg(test)]
pub use restaurant_directory::MockRestaurantDirectory;
pub use restaurant_directory::RestaurantDirectory;
#[cfg(test)]
pub use user_accounts::MockUserAccounts;
pub use user_accounts::UserAccounts;
