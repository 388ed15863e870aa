//! Driven ports for best-effort calls into external collaborators.
//!
//! Every caller treats failures here as warnings: the primary write has
//! already committed when these ports are invoked.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{Embedding, EntityId};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling an external collaborator.
    pub enum CollaboratorError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "collaborator transport failed: {message}",
        /// The collaborator did not answer within the timeout.
        Timeout { message: String } => "collaborator timed out: {message}",
        /// The collaborator answered with a non-success status.
        Status { status: u16, message: String } => "collaborator returned status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "collaborator response decode failed: {message}",
        /// The collaborator answered but reported failure.
        Rejected { message: String } => "collaborator rejected request: {message}",
    }
}

/// Menu-item text submitted for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingRequest {
    pub restaurant_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

/// Port producing embeddings for menu items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn generate_embedding(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<Embedding, CollaboratorError>;
}

/// Menu photo forwarded to the data pipeline after upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuImageSubmission {
    pub restaurant_id: EntityId,
    pub filename: String,
    pub mime_type: String,
    pub content: Bytes,
}

/// Port forwarding menu images for downstream processing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuImagePipeline: Send + Sync {
    async fn submit_menu_image(
        &self,
        submission: &MenuImageSubmission,
    ) -> Result<(), CollaboratorError>;
}

/// Fixture pipeline that accepts every submission without forwarding it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureMenuImagePipeline;

#[async_trait]
impl MenuImagePipeline for FixtureMenuImagePipeline {
    async fn submit_menu_image(
        &self,
        _submission: &MenuImageSubmission,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Port used by the menu service to retire files it no longer links.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileServiceClient: Send + Sync {
    async fn delete_file(&self, id: &EntityId) -> Result<(), CollaboratorError>;
}
