//! Multipart form decoding for `POST /api/files/upload`.
//!
//! The request body is read in full (bounded by the configured limit) and
//! then handed to `multer`. Form-level problems are batch failures; anything
//! specific to one file is left for the file service to report per item.

use actix_web::web;
use bytes::{Bytes, BytesMut};
use futures_util::{StreamExt, stream};
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{UploadBatch, UploadItem};
use crate::domain::Error;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_entity_id, parse_optional_entity_id,
};

const FILES_FIELD: &str = "files";
const FALLBACK_FILENAME: &str = "unnamed";

/// One file part before MIME resolution.
#[derive(Debug)]
struct FilePart {
    filename: String,
    declared_mime: Option<String>,
    content: Bytes,
}

/// Raw form fields as they appeared in the body.
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<FilePart>,
    uploader_id: Option<String>,
    purposes: Vec<String>,
    is_public: Option<String>,
    restaurant_id: Option<String>,
}

fn malformed(error: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed multipart body: {error}"))
        .with_details(json!({ "code": "malformed_multipart" }))
}

/// Drain the request payload, failing once it grows past `limit` bytes.
pub(crate) async fn read_bounded(mut payload: web::Payload, limit: usize) -> Result<Bytes, Error> {
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(malformed)?;
        if body.len() + chunk.len() > limit {
            return Err(
                Error::invalid_request(format!("upload exceeds the {limit} byte limit"))
                    .with_details(json!({ "code": "payload_too_large", "limit": limit })),
            );
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Decode a complete multipart body into an upload batch.
pub(crate) async fn decode_batch(content_type: &str, body: Bytes) -> Result<UploadBatch, Error> {
    let form = parse_form(content_type, body).await?;
    form.into_batch()
}

async fn parse_form(content_type: &str, body: Bytes) -> Result<UploadForm, Error> {
    let boundary = multer::parse_boundary(content_type).map_err(malformed)?;
    let mut multipart = multer::Multipart::new(
        stream::once(async move { Ok::<_, std::io::Error>(body) }),
        boundary,
    );

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            FILES_FIELD => {
                let filename = field
                    .file_name()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(FALLBACK_FILENAME)
                    .to_owned();
                let declared_mime = field
                    .content_type()
                    .map(|mime| mime.essence_str().to_owned());
                let content = field.bytes().await.map_err(malformed)?;
                form.files.push(FilePart {
                    filename,
                    declared_mime,
                    content,
                });
            }
            "uploader_id" => form.uploader_id = Some(field.text().await.map_err(malformed)?),
            "purpose" => form.purposes.push(field.text().await.map_err(malformed)?),
            "is_public" => form.is_public = Some(field.text().await.map_err(malformed)?),
            "restaurant_id" => form.restaurant_id = Some(field.text().await.map_err(malformed)?),
            other => debug!(field = other, "ignoring unknown upload form field"),
        }
    }
    Ok(form)
}

impl UploadForm {
    fn into_batch(self) -> Result<UploadBatch, Error> {
        if self.files.is_empty() {
            return Err(missing_field_error(FieldName::new(FILES_FIELD)));
        }
        let uploader_field = FieldName::new("uploader_id");
        let uploader = self
            .uploader_id
            .filter(|raw| !raw.trim().is_empty())
            .ok_or_else(|| missing_field_error(uploader_field))?;
        let uploader_id = parse_entity_id(&uploader, uploader_field)?;
        let restaurant_id =
            parse_optional_entity_id(self.restaurant_id, FieldName::new("restaurant_id"))?;
        let is_public = self
            .is_public
            .filter(|raw| !raw.is_empty())
            .is_none_or(|raw| raw == "true");
        let purposes = spread_purposes(self.purposes, self.files.len())?;

        let items = self
            .files
            .into_iter()
            .zip(purposes)
            .map(|(part, purpose)| UploadItem {
                mime_type: resolve_mime(&part.filename, part.declared_mime),
                filename: part.filename,
                purpose,
                content: part.content,
            })
            .collect();
        Ok(UploadBatch {
            uploader_id,
            restaurant_id,
            is_public,
            items,
        })
    }
}

/// One purpose for every file, or exactly one per file in order.
fn spread_purposes(purposes: Vec<String>, files: usize) -> Result<Vec<String>, Error> {
    match purposes.len() {
        0 => Err(missing_field_error(FieldName::new("purpose"))),
        1 => Ok(vec![purposes[0].clone(); files]),
        count if count == files => Ok(purposes),
        count => Err(Error::invalid_request(format!(
            "purpose must be given once or once per file ({files} files, {count} purposes)"
        ))
        .with_details(json!({ "field": "purpose", "code": "purpose_count_mismatch" }))),
    }
}

fn resolve_mime(filename: &str, declared: Option<String>) -> String {
    declared
        .filter(|mime| !mime.trim().is_empty())
        .unwrap_or_else(|| {
            mime_guess::from_path(filename)
                .first_or_octet_stream()
                .essence_str()
                .to_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityId;
    use rstest::rstest;

    const BOUNDARY: &str = "X-FOOD-BOUNDARY";

    fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn file_part(filename: &str, mime: Option<&str>, content: &str) -> String {
        let mime = mime
            .map(|value| format!("Content-Type: {value}\r\n"))
            .unwrap_or_default();
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n{mime}\r\n{content}\r\n"
        )
    }

    fn body(parts: &[String]) -> Bytes {
        Bytes::from(format!("{}--{BOUNDARY}--\r\n", parts.concat()))
    }

    #[tokio::test]
    async fn single_purpose_applies_to_every_file() {
        let uploader = EntityId::random();
        let batch = decode_batch(
            &content_type(),
            body(&[
                text_part("uploader_id", &uploader.to_string()),
                text_part("purpose", "review_photo"),
                file_part("a.png", Some("image/png"), "aaa"),
                file_part("b.txt", None, "bbb"),
            ]),
        )
        .await
        .expect("decoded");

        assert_eq!(batch.uploader_id, uploader);
        assert!(batch.is_public);
        assert_eq!(batch.items.len(), 2);
        assert!(batch.items.iter().all(|item| item.purpose == "review_photo"));
        assert_eq!(batch.items[0].mime_type, "image/png");
        assert_eq!(batch.items[1].mime_type, "text/plain");
        assert_eq!(batch.items[1].content, Bytes::from_static(b"bbb"));
    }

    #[tokio::test]
    async fn purposes_pair_with_files_in_order() {
        let batch = decode_batch(
            &content_type(),
            body(&[
                text_part("uploader_id", &EntityId::random().to_string()),
                file_part("menu.jpg", None, "m"),
                file_part("dish.jpg", None, "d"),
                text_part("purpose", "menu_image"),
                text_part("purpose", "menu_item_image"),
                text_part("is_public", "false"),
            ]),
        )
        .await
        .expect("decoded");
        assert_eq!(batch.items[0].purpose, "menu_image");
        assert_eq!(batch.items[1].purpose, "menu_item_image");
        assert!(!batch.is_public);
    }

    #[rstest]
    #[case(vec![], "files")]
    #[case(vec![file_part("a.txt", None, "a")], "uploader_id")]
    #[tokio::test]
    async fn missing_fields_fail_the_batch(#[case] parts: Vec<String>, #[case] field: &str) {
        let mut parts = parts;
        if field == "files" {
            parts.push(text_part("uploader_id", &EntityId::random().to_string()));
        }
        parts.push(text_part("purpose", "review_photo"));
        let error = decode_batch(&content_type(), body(&parts))
            .await
            .expect_err("incomplete form");
        assert_eq!(error.details().expect("details")["field"], field);
    }

    #[tokio::test]
    async fn mismatched_purpose_count_is_rejected() {
        let error = decode_batch(
            &content_type(),
            body(&[
                text_part("uploader_id", &EntityId::random().to_string()),
                text_part("purpose", "review_photo"),
                text_part("purpose", "menu_image"),
                file_part("a.txt", None, "a"),
                file_part("b.txt", None, "b"),
                file_part("c.txt", None, "c"),
            ]),
        )
        .await
        .expect_err("ambiguous purposes");
        assert_eq!(
            error.details().expect("details")["code"],
            "purpose_count_mismatch"
        );
    }

    #[tokio::test]
    async fn non_multipart_content_is_malformed() {
        let error = decode_batch("application/json", Bytes::from_static(b"{}"))
            .await
            .expect_err("not multipart");
        assert_eq!(error.details().expect("details")["code"], "malformed_multipart");
    }
}
