//! Restaurant handlers.
//!
//! ```text
//! POST   /api/restaurants
//! GET    /api/restaurants?id=&name=&cuisine=&rating_min=&rating_max=...
//! PATCH  /api/restaurants?id=
//! DELETE /api/restaurants/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    AuthProvider, EntityKind, Error, FilterScope, Persisted, PersonDetails, Restaurant,
    RestaurantFilter, RestaurantPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::records::{DeletionResponse, RecordFields};
use crate::inbound::http::state::RestaurantHttpState;
use crate::inbound::http::validation::{
    FieldName, IdQuery, parse_choice, parse_entity_id, parse_entity_id_list,
    parse_optional_entity_id, require,
};

/// Body for `POST /api/restaurants`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateRestaurantRequest {
    #[schema(example = "Spice Route")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<String>,
    /// Owning user, checked against the user service.
    pub owner_id: Option<String>,
    #[serde(default)]
    pub cuisine_types: Vec<String>,
    /// Free-form object keyed by day.
    #[schema(value_type = Object)]
    pub operating_hours: Option<Value>,
    pub location: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub delivery_fee: f64,
    /// Files checked against the file service.
    #[serde(default)]
    pub image_file_ids: Vec<String>,
    pub meta: Option<Value>,
}

impl CreateRestaurantRequest {
    fn into_domain(self) -> Result<(Option<Value>, Restaurant), Error> {
        let provider = require(self.auth_provider, FieldName::new("auth_provider"))?;
        let restaurant = Restaurant {
            person: PersonDetails {
                name: self.name.unwrap_or_default(),
                email: self.email,
                phone: self.phone,
                auth_provider: provider.parse::<AuthProvider>()?,
            },
            owner_id: parse_optional_entity_id(self.owner_id, FieldName::new("owner_id"))?,
            cuisine_types: self.cuisine_types.into_iter().collect(),
            operating_hours: self.operating_hours.unwrap_or(Value::Null),
            location: self.location.unwrap_or_default(),
            rating: self.rating,
            delivery_fee: self.delivery_fee,
            image_file_ids: parse_entity_id_list(
                self.image_file_ids,
                FieldName::new("image_file_ids"),
            )?,
        };
        Ok((self.meta, restaurant))
    }
}

/// Body for `PATCH /api/restaurants?id=`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateRestaurantRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<String>,
    pub owner_id: Option<String>,
    pub cuisine_types: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub operating_hours: Option<Value>,
    pub location: Option<String>,
    pub rating: Option<f64>,
    pub delivery_fee: Option<f64>,
    pub image_file_ids: Option<Vec<String>>,
    pub meta: Option<Value>,
}

impl TryFrom<UpdateRestaurantRequest> for RestaurantPatch {
    type Error = Error;

    fn try_from(value: UpdateRestaurantRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            auth_provider: parse_choice(value.auth_provider)?,
            owner_id: parse_optional_entity_id(value.owner_id, FieldName::new("owner_id"))?,
            cuisine_types: value.cuisine_types.map(|tags| tags.into_iter().collect()),
            operating_hours: value.operating_hours,
            location: value.location,
            rating: value.rating,
            delivery_fee: value.delivery_fee,
            image_file_ids: value
                .image_file_ids
                .map(|ids| parse_entity_id_list(ids, FieldName::new("image_file_ids")))
                .transpose()?,
            meta: value.meta,
        })
    }
}

/// Query filters for `GET /api/restaurants`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RestaurantQuery {
    pub id: Option<String>,
    /// Substring match.
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<String>,
    pub owner_id: Option<String>,
    /// Restaurants tagged with this cuisine.
    pub cuisine: Option<String>,
    pub rating_min: Option<f64>,
    pub rating_max: Option<f64>,
    pub delivery_fee_min: Option<f64>,
    pub delivery_fee_max: Option<f64>,
}

impl TryFrom<RestaurantQuery> for RestaurantFilter {
    type Error = Error;

    fn try_from(value: RestaurantQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            scope: FilterScope {
                id: parse_optional_entity_id(value.id, FieldName::new("id"))?,
                include_deleted: false,
            },
            name: value.name,
            email: value.email,
            phone: value.phone,
            auth_provider: parse_choice(value.auth_provider)?,
            owner_id: parse_optional_entity_id(value.owner_id, FieldName::new("owner_id"))?,
            cuisine: value.cuisine,
            rating_min: value.rating_min,
            rating_max: value.rating_max,
            delivery_fee_min: value.delivery_fee_min,
            delivery_fee_max: value.delivery_fee_max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RestaurantResponse {
    #[serde(flatten)]
    pub record: RecordFields,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: String,
    pub owner_id: Option<Uuid>,
    pub cuisine_types: Vec<String>,
    #[schema(value_type = Object)]
    pub operating_hours: Value,
    pub location: String,
    pub rating: f64,
    pub delivery_fee: f64,
    pub image_file_ids: Vec<Uuid>,
}

impl From<Persisted<Restaurant>> for RestaurantResponse {
    fn from(value: Persisted<Restaurant>) -> Self {
        let record = RecordFields::from(&value.header);
        let restaurant = value.data;
        Self {
            record,
            auth_provider: restaurant.person.auth_provider.to_string(),
            name: restaurant.person.name,
            email: restaurant.person.email,
            phone: restaurant.person.phone,
            owner_id: restaurant.owner_id.map(|id| *id.as_uuid()),
            cuisine_types: restaurant.cuisine_types.into_iter().collect(),
            operating_hours: restaurant.operating_hours,
            location: restaurant.location,
            rating: restaurant.rating,
            delivery_fee: restaurant.delivery_fee,
            image_file_ids: restaurant
                .image_file_ids
                .iter()
                .map(|id| *id.as_uuid())
                .collect(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/restaurants",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Restaurant created", body = RestaurantResponse),
        (status = 400, description = "Invalid request or reference", body = Error),
        (status = 503, description = "Reference check or store unavailable", body = Error)
    ),
    tags = ["restaurants"],
    operation_id = "createRestaurant"
)]
#[post("/restaurants")]
pub async fn create_restaurant(
    state: web::Data<RestaurantHttpState>,
    payload: web::Json<CreateRestaurantRequest>,
) -> ApiResult<HttpResponse> {
    let (meta, restaurant) = payload.into_inner().into_domain()?;
    let created = state.directory.create_restaurant(meta, restaurant).await?;
    Ok(HttpResponse::Created().json(RestaurantResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/api/restaurants",
    params(RestaurantQuery),
    responses(
        (status = 200, description = "Matching restaurants", body = [RestaurantResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["restaurants"],
    operation_id = "listRestaurants"
)]
#[get("/restaurants")]
pub async fn list_restaurants(
    state: web::Data<RestaurantHttpState>,
    query: web::Query<RestaurantQuery>,
) -> ApiResult<web::Json<Vec<RestaurantResponse>>> {
    let filter = RestaurantFilter::try_from(query.into_inner())?;
    let restaurants = state.directory.list_restaurants(filter).await?;
    Ok(web::Json(
        restaurants
            .into_iter()
            .map(RestaurantResponse::from)
            .collect(),
    ))
}

/// Partially update a restaurant. Only references the patch changes are
/// re-validated.
#[utoipa::path(
    patch,
    path = "/api/restaurants",
    params(IdQuery),
    request_body = UpdateRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant updated", body = RestaurantResponse),
        (status = 400, description = "Invalid request or reference", body = Error),
        (status = 404, description = "No active restaurant with that id", body = Error)
    ),
    tags = ["restaurants"],
    operation_id = "updateRestaurant"
)]
#[patch("/restaurants")]
pub async fn update_restaurant(
    state: web::Data<RestaurantHttpState>,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateRestaurantRequest>,
) -> ApiResult<web::Json<RestaurantResponse>> {
    let id = query.target()?;
    let patch = RestaurantPatch::try_from(payload.into_inner())?;
    let updated = state.directory.update_restaurant(id, patch).await?;
    Ok(web::Json(RestaurantResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/restaurants/{id}",
    params(("id" = String, Path, description = "Restaurant identifier")),
    responses(
        (status = 200, description = "Restaurant deleted", body = DeletionResponse),
        (status = 404, description = "No active restaurant with that id", body = Error)
    ),
    tags = ["restaurants"],
    operation_id = "deleteRestaurant"
)]
#[delete("/restaurants/{id}")]
pub async fn delete_restaurant(
    state: web::Data<RestaurantHttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletionResponse>> {
    let id = parse_entity_id(&path.into_inner(), FieldName::new("id"))?;
    state.directory.delete_restaurant(id).await?;
    Ok(web::Json(DeletionResponse::new(EntityKind::Restaurant)))
}
