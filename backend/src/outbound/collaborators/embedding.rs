//! Embedding generation over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::{success_body, transport_error};
use crate::domain::Embedding;
use crate::domain::ports::{CollaboratorError, EmbeddingClient, EmbeddingRequest};
use crate::outbound::http_support::{client_with_timeout, endpoint_url};

#[derive(Debug, Serialize)]
struct GenerateEmbeddingBody<'a> {
    menu_item: MenuItemTextDto<'a>,
}

#[derive(Debug, Serialize)]
struct MenuItemTextDto<'a> {
    restaurant_id: String,
    name: &'a str,
    description: &'a str,
    price: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateEmbeddingResponse {
    success: bool,
    #[serde(default)]
    full_embedding: Option<Vec<f32>>,
    #[serde(default)]
    embedding: Option<Vec<f32>>,
    #[serde(default)]
    error: Option<String>,
}

/// Calls `POST {base}/generate-embedding`.
pub struct HttpEmbeddingClient {
    client: Client,
    endpoint: Url,
}

impl HttpEmbeddingClient {
    /// # Errors
    ///
    /// Fails when the endpoint cannot be derived from `base` or the client
    /// cannot be built.
    pub fn new(base: &Url, timeout: Duration) -> color_eyre::Result<Self> {
        Ok(Self {
            client: client_with_timeout(timeout)?,
            endpoint: endpoint_url(base, "/generate-embedding")?,
        })
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn generate_embedding(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<Embedding, CollaboratorError> {
        let body = GenerateEmbeddingBody {
            menu_item: MenuItemTextDto {
                restaurant_id: request.restaurant_id.to_string(),
                name: &request.name,
                description: request.description.as_deref().unwrap_or_default(),
                price: request.price,
            },
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|error| transport_error(&error))?;
        let bytes = success_body(response).await?;
        decode_embedding(&bytes)
    }
}

fn decode_embedding(body: &[u8]) -> Result<Embedding, CollaboratorError> {
    let decoded: GenerateEmbeddingResponse = serde_json::from_slice(body)
        .map_err(|error| CollaboratorError::decode(error.to_string()))?;
    if !decoded.success {
        return Err(CollaboratorError::rejected(
            decoded
                .error
                .unwrap_or_else(|| "embedding service reported failure".to_owned()),
        ));
    }
    let values = decoded
        .full_embedding
        .or(decoded.embedding)
        .ok_or_else(|| CollaboratorError::decode("response carried no embedding"))?;
    Embedding::new(values).map_err(|error| CollaboratorError::decode(error.to_string()))
}
