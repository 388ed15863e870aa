//! Shared request parsing helpers for the HTTP handlers.
//!
//! Identifiers arrive as strings so a malformed value produces a structured
//! `invalid_request` naming the field, rather than a generic extractor error.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::{EntityId, Error, GeoPoint, ValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestErrorCode {
    MissingField,
    InvalidUuid,
}

impl RequestErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": RequestErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": RequestErrorCode::InvalidUuid.as_str(),
    }))
}

fn invalid_uuid_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must contain valid UUIDs")).with_details(json!({
        "field": field,
        "index": index,
        "value": value,
        "code": RequestErrorCode::InvalidUuid.as_str(),
    }))
}

/// Unwrap a required body field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_entity_id(value: &str, field: FieldName) -> Result<EntityId, Error> {
    value
        .parse::<EntityId>()
        .map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_optional_entity_id(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<EntityId>, Error> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_entity_id(&raw, field))
        .transpose()
}

pub(crate) fn parse_entity_id_list(
    values: Vec<String>,
    field: FieldName,
) -> Result<Vec<EntityId>, Error> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            value
                .parse::<EntityId>()
                .map_err(|_| invalid_uuid_index_error(field, index, &value))
        })
        .collect()
}

/// Parse an enumerated value (auth provider, file purpose) supplied as text.
pub(crate) fn parse_choice<T>(value: Option<String>) -> Result<Option<T>, Error>
where
    T: FromStr<Err = ValidationError>,
{
    value
        .map(|raw| raw.parse::<T>().map_err(Error::from))
        .transpose()
}

/// Combine separately supplied coordinates. Both or neither must be present.
pub(crate) fn pair_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<GeoPoint>, Error> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Some(GeoPoint {
            latitude,
            longitude,
        })),
        (None, None) => Ok(None),
        _ => Err(ValidationError::Unpaired {
            first: "latitude",
            second: "longitude",
        }
        .into()),
    }
}

/// `?id=` selector used by every PATCH endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IdQuery {
    /// Identifier of the record to update.
    pub id: Option<String>,
}

impl IdQuery {
    pub(crate) fn target(&self) -> Result<EntityId, Error> {
        let raw = self
            .id
            .as_deref()
            .ok_or_else(|| missing_field_error(FieldName::new("id")))?;
        parse_entity_id(raw, FieldName::new("id"))
    }
}
