//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories with the same semantics
//! - **reference**: local and HTTP reference checkers plus per-kind routing
//! - **collaborators**: reqwest clients for embeddings, the menu-image
//!   pipeline and the file service
//! - **storage**: capability-scoped blob storage on the local filesystem
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod collaborators;
pub(crate) mod http_support;
pub mod memory;
pub mod persistence;
pub mod reference;
pub mod storage;
