//! User account handlers.
//!
//! ```text
//! POST   /api/users
//! GET    /api/users?id=&name=&email=&phone=&auth_provider=
//! PATCH  /api/users?id=
//! DELETE /api/users/{id}
//! ```

use std::collections::BTreeSet;

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{
    AuthProvider, EntityKind, Error, FilterScope, Persisted, PersonDetails, User, UserFilter,
    UserPatch,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::records::{DeletionResponse, RecordFields};
use crate::inbound::http::state::UserHttpState;
use crate::inbound::http::validation::{
    FieldName, IdQuery, parse_choice, parse_entity_id, parse_optional_entity_id, require,
};

/// Body for `POST /api/users`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// `google` or `phone`.
    #[schema(example = "google")]
    pub auth_provider: Option<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    pub default_address_id: Option<String>,
    pub meta: Option<Value>,
}

impl CreateUserRequest {
    fn into_domain(self) -> Result<(Option<Value>, User), Error> {
        let provider = require(self.auth_provider, FieldName::new("auth_provider"))?;
        let user = User {
            person: PersonDetails {
                name: self.name.unwrap_or_default(),
                email: self.email,
                phone: self.phone,
                auth_provider: provider.parse::<AuthProvider>()?,
            },
            preferences: self.preferences.into_iter().collect(),
            dietary_restrictions: self.dietary_restrictions.into_iter().collect(),
            default_address_id: parse_optional_entity_id(
                self.default_address_id,
                FieldName::new("default_address_id"),
            )?,
        };
        Ok((self.meta, user))
    }
}

/// Body for `PATCH /api/users?id=`. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<String>,
    pub preferences: Option<Vec<String>>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub default_address_id: Option<String>,
    pub meta: Option<Value>,
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
            auth_provider: parse_choice(value.auth_provider)?,
            preferences: value.preferences.map(|tags| tags.into_iter().collect()),
            dietary_restrictions: value
                .dietary_restrictions
                .map(|tags| tags.into_iter().collect()),
            default_address_id: parse_optional_entity_id(
                value.default_address_id,
                FieldName::new("default_address_id"),
            )?,
            meta: value.meta,
        })
    }
}

/// Query filters for `GET /api/users`. `name` matches by substring.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: Option<String>,
}

impl TryFrom<UserQuery> for UserFilter {
    type Error = Error;

    fn try_from(value: UserQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            scope: FilterScope {
                id: parse_optional_entity_id(value.id, FieldName::new("id"))?,
                include_deleted: false,
            },
            name: value.name,
            email: value.email,
            phone: value.phone,
            auth_provider: parse_choice(value.auth_provider)?,
        })
    }
}

/// Wire form of a user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserResponse {
    #[serde(flatten)]
    pub record: RecordFields,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub auth_provider: String,
    pub preferences: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub default_address_id: Option<Uuid>,
}

fn tags(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

impl From<Persisted<User>> for UserResponse {
    fn from(value: Persisted<User>) -> Self {
        let record = RecordFields::from(&value.header);
        let user = value.data;
        Self {
            record,
            preferences: tags(&user.preferences),
            dietary_restrictions: tags(&user.dietary_restrictions),
            default_address_id: user.default_address_id.map(|id| *id.as_uuid()),
            auth_provider: user.person.auth_provider.to_string(),
            name: user.person.name,
            email: user.person.email,
            phone: user.person.phone,
        }
    }
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request or reference", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<UserHttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let (meta, user) = payload.into_inner().into_domain()?;
    let created = state.accounts.create_user(meta, user).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(created)))
}

/// List active users matching the query filters.
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Matching users", body = [UserResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<UserHttpState>,
    query: web::Query<UserQuery>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let filter = UserFilter::try_from(query.into_inner())?;
    let users = state.accounts.list_users(filter).await?;
    Ok(web::Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Partially update a user.
#[utoipa::path(
    patch,
    path = "/api/users",
    params(IdQuery),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid request or reference", body = Error),
        (status = 404, description = "No active user with that id", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users")]
pub async fn update_user(
    state: web::Data<UserHttpState>,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let id = query.target()?;
    let patch = UserPatch::try_from(payload.into_inner())?;
    let updated = state.accounts.update_user(id, patch).await?;
    Ok(web::Json(UserResponse::from(updated)))
}

/// Soft-delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted", body = DeletionResponse),
        (status = 404, description = "No active user with that id", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<UserHttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletionResponse>> {
    let id = parse_entity_id(&path.into_inner(), FieldName::new("id"))?;
    state.accounts.delete_user(id).await?;
    Ok(web::Json(DeletionResponse::new(EntityKind::User)))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
