//! Reqwest-backed reference checker querying sibling collection endpoints.
//!
//! A check is a single `GET {collection}?id={id}` answered with a JSON array.
//! An empty array means the record is missing (or filtered out because it is
//! inactive); otherwise the first element's `is_active` flag decides.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::ports::{ReferenceCheckError, ReferenceChecker};
use crate::domain::{EntityId, EntityKind};
use crate::outbound::http_support::{
    client_with_timeout, endpoint_url, map_transport_error, status_message,
};

/// Collection path each entity kind is served under.
#[must_use]
pub fn collection_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::User => "/api/users",
        EntityKind::UserAddress => "/api/user-addresses",
        EntityKind::Restaurant => "/api/restaurants",
        EntityKind::MenuCategory => "/api/menu/categories",
        EntityKind::MenuItem => "/api/menu",
        EntityKind::File => "/api/files",
    }
}

#[derive(Debug, Deserialize)]
struct ActiveFlagDto {
    is_active: bool,
}

/// Checks references against the services that own them.
pub struct HttpReferenceChecker {
    client: Client,
    endpoints: HashMap<EntityKind, Url>,
}

impl HttpReferenceChecker {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: client_with_timeout(timeout)?,
            endpoints: HashMap::new(),
        })
    }

    /// Resolve `kind` against the owning service's base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the collection path cannot be joined to `base`.
    pub fn with_service(
        mut self,
        kind: EntityKind,
        base: &Url,
    ) -> Result<Self, url::ParseError> {
        self.endpoints.insert(kind, endpoint_url(base, collection_path(kind))?);
        Ok(self)
    }
}

#[async_trait]
impl ReferenceChecker for HttpReferenceChecker {
    async fn check_reference(
        &self,
        kind: EntityKind,
        id: &EntityId,
    ) -> Result<bool, ReferenceCheckError> {
        let endpoint = self.endpoints.get(&kind).ok_or_else(|| {
            ReferenceCheckError::transport(format!("no service configured for {kind} references"))
        })?;
        let response = self
            .client
            .get(endpoint.clone())
            .query(&[("id", id.to_string())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| {
                map_transport_error(
                    &error,
                    ReferenceCheckError::timeout,
                    ReferenceCheckError::transport,
                )
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|error| {
            map_transport_error(
                &error,
                ReferenceCheckError::timeout,
                ReferenceCheckError::transport,
            )
        })?;
        if !status.is_success() {
            return Err(ReferenceCheckError::status(
                status.as_u16(),
                status_message(status, &body),
            ));
        }
        decode_active_flag(&body)
    }
}

fn decode_active_flag(body: &[u8]) -> Result<bool, ReferenceCheckError> {
    let matches: Vec<ActiveFlagDto> = serde_json::from_slice(body).map_err(|error| {
        ReferenceCheckError::decode(format!("expected a JSON array of records: {error}"))
    })?;
    Ok(matches.first().is_some_and(|record| record.is_active))
}
