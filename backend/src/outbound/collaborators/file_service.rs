//! Client for the file service's delete endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{success_body, transport_error};
use crate::domain::EntityId;
use crate::domain::ports::{CollaboratorError, FileServiceClient};
use crate::outbound::http_support::{client_with_timeout, endpoint_url};

/// Issues `DELETE {base}/api/files/{id}`.
pub struct HttpFileServiceClient {
    client: Client,
    files: Url,
}

impl HttpFileServiceClient {
    /// # Errors
    ///
    /// Fails when the collection URL cannot be derived from `base` or the
    /// client cannot be built.
    pub fn new(base: &Url, timeout: Duration) -> color_eyre::Result<Self> {
        Ok(Self {
            client: client_with_timeout(timeout)?,
            files: endpoint_url(base, "/api/files/")?,
        })
    }
}

#[async_trait]
impl FileServiceClient for HttpFileServiceClient {
    async fn delete_file(&self, id: &EntityId) -> Result<(), CollaboratorError> {
        let url = self
            .files
            .join(&id.to_string())
            .map_err(|error| CollaboratorError::transport(error.to_string()))?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|error| transport_error(&error))?;
        success_body(response).await.map(|_| ())
    }
}
