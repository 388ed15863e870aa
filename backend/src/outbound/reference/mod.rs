//! Adapters implementing the `ReferenceChecker` port.
//!
//! A service checks references to its own entities through its repositories
//! and references to a sibling's entities over HTTP; `RoutedReferenceChecker`
//! combines the two per entity kind.

mod http_checker;
mod local;
mod routed;

pub use http_checker::{HttpReferenceChecker, collection_path};
pub use local::RepositoryReferenceChecker;
pub use routed::RoutedReferenceChecker;
