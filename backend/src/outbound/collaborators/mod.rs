//! Reqwest adapters for the best-effort collaborator ports.
//!
//! None of these adapters retry; callers downgrade their failures to
//! warnings on an already committed write.

mod embedding;
mod file_service;
mod menu_pipeline;

pub use embedding::HttpEmbeddingClient;
pub use file_service::HttpFileServiceClient;
pub use menu_pipeline::HttpMenuImagePipeline;

use reqwest::Response;

use crate::domain::ports::CollaboratorError;
use crate::outbound::http_support::{map_transport_error, status_message};

fn transport_error(error: &reqwest::Error) -> CollaboratorError {
    map_transport_error(error, CollaboratorError::timeout, CollaboratorError::transport)
}

/// Read a response body, turning non-success statuses into errors.
async fn success_body(response: Response) -> Result<bytes::Bytes, CollaboratorError> {
    let status = response.status();
    let body = response.bytes().await.map_err(|error| transport_error(&error))?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(CollaboratorError::status(
            status.as_u16(),
            status_message(status, &body),
        ))
    }
}
