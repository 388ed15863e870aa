//! File metadata and upload handlers.
//!
//! ```text
//! POST   /api/files                 register metadata (200 when deduplicated)
//! POST   /api/files/upload          multipart batch upload
//! GET    /api/files?id=&uploader_id=&purpose=&checksum=&mime_type=&is_public=
//! PATCH  /api/files?id=
//! DELETE /api/files/{id}
//! ```

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::UploadReport;
use crate::domain::{
    Checksum, EntityKind, Error, FileFilter, FilePatch, FilePurpose, FileRecord, FilterScope,
    ImageDimensions, Persisted, StoragePath,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::records::{DeletionResponse, RecordFields};
use crate::inbound::http::state::FileHttpState;
use crate::inbound::http::upload_form::{decode_batch, read_bounded};
use crate::inbound::http::validation::{
    FieldName, IdQuery, parse_choice, parse_entity_id, parse_optional_entity_id, require,
};

/// Body for `POST /api/files`: metadata for content stored out of band.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterFileRequest {
    pub uploader_id: Option<String>,
    #[schema(example = "menu_images/5f0c.png")]
    pub storage_path: Option<String>,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: Option<i64>,
    /// Lower-case hex SHA-256 of the content.
    pub checksum: Option<String>,
    pub purpose: Option<String>,
    pub is_public: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub dimensions: Option<Value>,
    pub meta: Option<Value>,
}

impl RegisterFileRequest {
    fn into_domain(self) -> Result<(Option<Value>, FileRecord), Error> {
        let uploader_field = FieldName::new("uploader_id");
        let uploader = require(self.uploader_id, uploader_field)?;
        let storage_path = require(self.storage_path, FieldName::new("storage_path"))?;
        let checksum = require(self.checksum, FieldName::new("checksum"))?;
        let purpose = require(self.purpose, FieldName::new("purpose"))?;
        let file = FileRecord {
            uploader_id: parse_entity_id(&uploader, uploader_field)?,
            storage_path: storage_path.parse::<StoragePath>()?,
            filename: self.filename.unwrap_or_default(),
            mime_type: self.mime_type.unwrap_or_default(),
            size_bytes: require(self.size_bytes, FieldName::new("size_bytes"))?,
            checksum: checksum.parse::<Checksum>()?,
            purpose: purpose.parse::<FilePurpose>()?,
            is_public: self.is_public.unwrap_or(true),
            dimensions: self.dimensions.as_ref().and_then(ImageDimensions::from_json),
        };
        Ok((self.meta, file))
    }
}

/// Body for `PATCH /api/files?id=`. Content-derived fields are immutable.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateFileRequest {
    pub filename: Option<String>,
    pub purpose: Option<String>,
    pub is_public: Option<bool>,
    pub meta: Option<Value>,
}

impl TryFrom<UpdateFileRequest> for FilePatch {
    type Error = Error;

    fn try_from(value: UpdateFileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            filename: value.filename,
            purpose: parse_choice(value.purpose)?,
            is_public: value.is_public,
            meta: value.meta,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileQuery {
    pub id: Option<String>,
    pub uploader_id: Option<String>,
    pub purpose: Option<String>,
    pub checksum: Option<String>,
    pub mime_type: Option<String>,
    pub is_public: Option<bool>,
}

impl TryFrom<FileQuery> for FileFilter {
    type Error = Error;

    fn try_from(value: FileQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            scope: FilterScope {
                id: parse_optional_entity_id(value.id, FieldName::new("id"))?,
                include_deleted: false,
            },
            uploader_id: parse_optional_entity_id(
                value.uploader_id,
                FieldName::new("uploader_id"),
            )?,
            purpose: parse_choice(value.purpose)?,
            checksum: value
                .checksum
                .map(|raw| raw.parse::<Checksum>())
                .transpose()?,
            storage_path: None,
            mime_type: value.mime_type,
            is_public: value.is_public,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FileResponse {
    #[serde(flatten)]
    pub record: RecordFields,
    pub uploader_id: Uuid,
    pub storage_path: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub purpose: String,
    pub is_public: bool,
    /// `{width, height}` for images whose header could be read, else `{}`.
    #[schema(value_type = Object)]
    pub dimensions: Value,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Persisted<FileRecord>> for FileResponse {
    fn from(value: Persisted<FileRecord>) -> Self {
        let record = RecordFields::from(&value.header);
        let deleted_at = value.header.deletion.deleted_at();
        let file = value.data;
        Self {
            record,
            uploader_id: *file.uploader_id.as_uuid(),
            storage_path: file.storage_path.to_string(),
            filename: file.filename,
            mime_type: file.mime_type,
            size_bytes: file.size_bytes,
            checksum: file.checksum.to_string(),
            purpose: file.purpose.to_string(),
            is_public: file.is_public,
            dimensions: ImageDimensions::to_json(file.dimensions),
            deleted_at,
        }
    }
}

/// Outcome of a multipart upload.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UploadResponse {
    pub uploaded_files: Vec<FileResponse>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<UploadReport> for UploadResponse {
    fn from(report: UploadReport) -> Self {
        Self {
            uploaded_files: report.uploaded.into_iter().map(FileResponse::from).collect(),
            errors: report.errors,
            warnings: report.warnings,
        }
    }
}

/// Register metadata. An active file with the same checksum is returned
/// with 200 instead of creating a duplicate.
#[utoipa::path(
    post,
    path = "/api/files",
    request_body = RegisterFileRequest,
    responses(
        (status = 201, description = "File registered", body = FileResponse),
        (status = 200, description = "Existing file with the same checksum", body = FileResponse),
        (status = 400, description = "Invalid request or uploader", body = Error),
        (status = 503, description = "Reference check or store unavailable", body = Error)
    ),
    tags = ["files"],
    operation_id = "registerFile"
)]
#[post("/files")]
pub async fn register_file(
    state: web::Data<FileHttpState>,
    payload: web::Json<RegisterFileRequest>,
) -> ApiResult<HttpResponse> {
    let (meta, file) = payload.into_inner().into_domain()?;
    let registration = state.library.register_file(meta, file).await?;
    let mut response = if registration.deduplicated {
        HttpResponse::Ok()
    } else {
        HttpResponse::Created()
    };
    Ok(response.json(FileResponse::from(registration.file)))
}

/// Store one or more files from a multipart form.
///
/// Responds 201 when at least one file was stored or deduplicated and 400
/// otherwise; per-file problems are listed in `errors` either way.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    request_body(content_type = "multipart/form-data", description = "files, uploader_id, purpose, is_public, restaurant_id"),
    responses(
        (status = 201, description = "At least one file stored", body = UploadResponse),
        (status = 400, description = "Malformed form, invalid uploader, or no file stored", body = UploadResponse),
        (status = 503, description = "Uploader check unavailable", body = Error)
    ),
    tags = ["files"],
    operation_id = "uploadFiles"
)]
#[post("/files/upload")]
pub async fn upload_files(
    state: web::Data<FileHttpState>,
    request: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let body = read_bounded(payload, state.max_upload_bytes).await?;
    let batch = decode_batch(&content_type, body).await?;
    let report = state.library.upload_files(batch).await?;

    let mut response = if report.any_succeeded() {
        HttpResponse::Created()
    } else {
        HttpResponse::BadRequest()
    };
    Ok(response.json(UploadResponse::from(report)))
}

#[utoipa::path(
    get,
    path = "/api/files",
    params(FileQuery),
    responses(
        (status = 200, description = "Matching files", body = [FileResponse]),
        (status = 400, description = "Invalid filter", body = Error)
    ),
    tags = ["files"],
    operation_id = "listFiles"
)]
#[get("/files")]
pub async fn list_files(
    state: web::Data<FileHttpState>,
    query: web::Query<FileQuery>,
) -> ApiResult<web::Json<Vec<FileResponse>>> {
    let filter = FileFilter::try_from(query.into_inner())?;
    let files = state.library.list_files(filter).await?;
    Ok(web::Json(files.into_iter().map(FileResponse::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/api/files",
    params(IdQuery),
    request_body = UpdateFileRequest,
    responses(
        (status = 200, description = "File updated", body = FileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "No active file with that id", body = Error)
    ),
    tags = ["files"],
    operation_id = "updateFile"
)]
#[patch("/files")]
pub async fn update_file(
    state: web::Data<FileHttpState>,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateFileRequest>,
) -> ApiResult<web::Json<FileResponse>> {
    let id = query.target()?;
    let patch = FilePatch::try_from(payload.into_inner())?;
    let updated = state.library.update_file(id, patch).await?;
    Ok(web::Json(FileResponse::from(updated)))
}

/// Delete metadata, then the stored blob. A blob that could not be removed
/// is reported as a warning.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(("id" = String, Path, description = "File identifier")),
    responses(
        (status = 200, description = "File deleted", body = DeletionResponse),
        (status = 404, description = "No active file with that id", body = Error)
    ),
    tags = ["files"],
    operation_id = "deleteFile"
)]
#[delete("/files/{id}")]
pub async fn delete_file(
    state: web::Data<FileHttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletionResponse>> {
    let id = parse_entity_id(&path.into_inner(), FieldName::new("id"))?;
    let outcome = state.library.delete_file(id).await?;
    Ok(web::Json(
        DeletionResponse::new(EntityKind::File).with_warnings(outcome.warnings),
    ))
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
