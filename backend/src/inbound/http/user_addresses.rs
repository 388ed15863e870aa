//! Delivery address handlers.
//!
//! ```text
//! POST   /api/user-addresses
//! GET    /api/user-addresses?id=&user_id=&city=&postal_code=&is_primary=
//! PATCH  /api/user-addresses?id=
//! DELETE /api/user-addresses/{id}
//! ```
//!
//! Writes that flip an address to primary also move the owner's default
//! address pointer. When that second write fails the address change stands
//! and the response carries a `warnings` array.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    EntityKind, Error, FilterScope, Persisted, UserAddress, UserAddressFilter, UserAddressPatch,
    WithWarnings,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::records::{DeletionResponse, RecordFields};
use crate::inbound::http::state::UserHttpState;
use crate::inbound::http::validation::{
    FieldName, IdQuery, pair_coordinates, parse_entity_id, parse_optional_entity_id, require,
};

/// Body for `POST /api/user-addresses`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateAddressRequest {
    pub user_id: Option<String>,
    #[schema(example = "1 Main St")]
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub alias_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_primary: bool,
    pub meta: Option<Value>,
}

impl CreateAddressRequest {
    fn into_domain(self) -> Result<(Option<Value>, UserAddress), Error> {
        let user_id = require(self.user_id, FieldName::new("user_id"))?;
        let address = UserAddress {
            user_id: parse_entity_id(&user_id, FieldName::new("user_id"))?,
            address_line1: self.address_line1.unwrap_or_default(),
            address_line2: self.address_line2,
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            postal_code: self.postal_code.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            alias_name: self.alias_name,
            location: pair_coordinates(self.latitude, self.longitude)?,
            is_primary: self.is_primary,
        };
        Ok((self.meta, address))
    }
}

/// Body for `PATCH /api/user-addresses?id=`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateAddressRequest {
    pub user_id: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub alias_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_primary: Option<bool>,
    pub meta: Option<Value>,
}

impl TryFrom<UpdateAddressRequest> for UserAddressPatch {
    type Error = Error;

    fn try_from(value: UpdateAddressRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: parse_optional_entity_id(value.user_id, FieldName::new("user_id"))?,
            address_line1: value.address_line1,
            address_line2: value.address_line2,
            city: value.city,
            state: value.state,
            postal_code: value.postal_code,
            country: value.country,
            alias_name: value.alias_name,
            location: pair_coordinates(value.latitude, value.longitude)?,
            is_primary: value.is_primary,
            meta: value.meta,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressQuery {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub is_primary: Option<bool>,
}

impl TryFrom<AddressQuery> for UserAddressFilter {
    type Error = Error;

    fn try_from(value: AddressQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            scope: FilterScope {
                id: parse_optional_entity_id(value.id, FieldName::new("id"))?,
                include_deleted: false,
            },
            user_id: parse_optional_entity_id(value.user_id, FieldName::new("user_id"))?,
            city: value.city,
            postal_code: value.postal_code,
            is_primary: value.is_primary,
        })
    }
}

/// Wire form of an address.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AddressResponse {
    #[serde(flatten)]
    pub record: RecordFields,
    pub user_id: Uuid,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub alias_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl From<Persisted<UserAddress>> for AddressResponse {
    fn from(value: Persisted<UserAddress>) -> Self {
        let record = RecordFields::from(&value.header);
        let address = value.data;
        Self {
            record,
            user_id: *address.user_id.as_uuid(),
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            alias_name: address.alias_name,
            latitude: address.location.map(|point| point.latitude),
            longitude: address.location.map(|point| point.longitude),
            is_primary: address.is_primary,
            warnings: Vec::new(),
        }
    }
}

impl From<WithWarnings<Persisted<UserAddress>>> for AddressResponse {
    fn from(value: WithWarnings<Persisted<UserAddress>>) -> Self {
        let (address, warnings) = value.into_parts();
        Self {
            warnings,
            ..Self::from(address)
        }
    }
}

/// Create an address for an existing user.
#[utoipa::path(
    post,
    path = "/api/user-addresses",
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address created", body = AddressResponse),
        (status = 400, description = "Invalid request or unknown user", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["user-addresses"],
    operation_id = "createUserAddress"
)]
#[post("/user-addresses")]
pub async fn create_address(
    state: web::Data<UserHttpState>,
    payload: web::Json<CreateAddressRequest>,
) -> ApiResult<HttpResponse> {
    let (meta, address) = payload.into_inner().into_domain()?;
    let outcome = state.accounts.create_address(meta, address).await?;
    Ok(HttpResponse::Created().json(AddressResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/user-addresses",
    params(AddressQuery),
    responses(
        (status = 200, description = "Matching addresses", body = [AddressResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["user-addresses"],
    operation_id = "listUserAddresses"
)]
#[get("/user-addresses")]
pub async fn list_addresses(
    state: web::Data<UserHttpState>,
    query: web::Query<AddressQuery>,
) -> ApiResult<web::Json<Vec<AddressResponse>>> {
    let filter = UserAddressFilter::try_from(query.into_inner())?;
    let addresses = state.accounts.list_addresses(filter).await?;
    Ok(web::Json(
        addresses.into_iter().map(AddressResponse::from).collect(),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/user-addresses",
    params(IdQuery),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Address updated", body = AddressResponse),
        (status = 400, description = "Invalid request or reference", body = Error),
        (status = 404, description = "No active address with that id", body = Error)
    ),
    tags = ["user-addresses"],
    operation_id = "updateUserAddress"
)]
#[patch("/user-addresses")]
pub async fn update_address(
    state: web::Data<UserHttpState>,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateAddressRequest>,
) -> ApiResult<web::Json<AddressResponse>> {
    let id = query.target()?;
    let patch = UserAddressPatch::try_from(payload.into_inner())?;
    let outcome = state.accounts.update_address(id, patch).await?;
    Ok(web::Json(AddressResponse::from(outcome)))
}

/// Soft-delete an address, clearing its owner's default pointer when it
/// still names this address.
#[utoipa::path(
    delete,
    path = "/api/user-addresses/{id}",
    params(("id" = String, Path, description = "Address identifier")),
    responses(
        (status = 200, description = "Address deleted", body = DeletionResponse),
        (status = 404, description = "No active address with that id", body = Error)
    ),
    tags = ["user-addresses"],
    operation_id = "deleteUserAddress"
)]
#[delete("/user-addresses/{id}")]
pub async fn delete_address(
    state: web::Data<UserHttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletionResponse>> {
    let id = parse_entity_id(&path.into_inner(), FieldName::new("id"))?;
    let outcome = state.accounts.delete_address(id).await?;
    Ok(web::Json(
        DeletionResponse::new(EntityKind::UserAddress).with_warnings(outcome.warnings),
    ))
}
