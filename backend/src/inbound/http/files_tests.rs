//! Handler tests for file registration, upload and deletion.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use mockable::DefaultClock;
use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::domain::ports::{FixtureMenuImagePipeline, StaticReferenceChecker};
use crate::domain::{EntityId, FileLibraryService};
use crate::inbound::http::configure_file_routes;
use crate::inbound::http::test_utils::{id_of, json_body, references};
use crate::outbound::memory::InMemoryRepository;
use crate::outbound::storage::LocalBlobStorage;

const BOUNDARY: &str = "files-test-boundary";

struct Fixture {
    state: web::Data<FileHttpState>,
    uploader: EntityId,
    _root: TempDir,
}

fn fixture(max_upload_bytes: usize) -> Fixture {
    let root = TempDir::new().expect("temp dir");
    let uploader = EntityId::random();
    let library = FileLibraryService::new(
        Arc::new(InMemoryRepository::new(Arc::new(DefaultClock))),
        Arc::new(LocalBlobStorage::open(root.path()).expect("upload root")),
        references(StaticReferenceChecker::default().with(EntityKind::User, uploader)),
        Arc::new(FixtureMenuImagePipeline),
    );
    Fixture {
        state: web::Data::new(FileHttpState::new(Arc::new(library), max_upload_bytes)),
        uploader,
        _root: root,
    }
}

fn multipart(uploader: EntityId, purpose: &str, files: &[(&str, &str)]) -> String {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"uploader_id\"\r\n\r\n{uploader}\r\n\
         --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"purpose\"\r\n\r\n{purpose}\r\n"
    );
    for (filename, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
             Content-Type: text/plain\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

/// Form with one `purpose` field per file, in file order.
fn multipart_per_file(uploader: EntityId, files: &[(&str, &str, &str)]) -> String {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"uploader_id\"\r\n\r\n{uploader}\r\n"
    );
    for (_, purpose, _) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"purpose\"\r\n\r\n{purpose}\r\n"
        ));
    }
    for (filename, _, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
             Content-Type: text/plain\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn upload_request(body: String) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/api/files/upload")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
        .to_request()
}

#[actix_web::test]
async fn repeated_uploads_return_the_same_file() {
    let fx = fixture(1024 * 1024);
    let app = test::init_service(
        App::new()
            .app_data(fx.state.clone())
            .configure(configure_file_routes),
    )
    .await;

    let first = test::call_service(
        &app,
        upload_request(multipart(fx.uploader, "review_photo", &[("a.txt", "same")])),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = json_body(first).await;

    let second = test::call_service(
        &app,
        upload_request(multipart(fx.uploader, "review_photo", &[("b.txt", "same")])),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CREATED);
    let second = json_body(second).await;

    assert_eq!(
        first["uploaded_files"][0]["id"],
        second["uploaded_files"][0]["id"]
    );
    assert_eq!(second["errors"], json!([]));
    assert_eq!(first["uploaded_files"][0]["dimensions"], json!({}));
    assert!(first["uploaded_files"][0]["deleted_at"].is_null());
}

#[actix_web::test]
async fn a_batch_with_no_stored_file_is_a_bad_request() {
    let fx = fixture(1024 * 1024);
    let app = test::init_service(
        App::new()
            .app_data(fx.state.clone())
            .configure(configure_file_routes),
    )
    .await;

    let response = test::call_service(
        &app,
        upload_request(multipart(fx.uploader, "avatar", &[("a.txt", "x")])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["uploaded_files"], json!([]));
    assert!(
        body["errors"][0]
            .as_str()
            .is_some_and(|error| error.starts_with("a.txt: purpose must be one of"))
    );
}

#[actix_web::test]
async fn a_mixed_batch_reports_successes_and_failures_together() {
    let fx = fixture(1024 * 1024);
    let app = test::init_service(
        App::new()
            .app_data(fx.state.clone())
            .configure(configure_file_routes),
    )
    .await;

    let response = test::call_service(
        &app,
        upload_request(multipart_per_file(
            fx.uploader,
            &[
                ("receipt.txt", "review_photo", "first"),
                ("selfie.txt", "avatar", "second"),
                ("storefront.txt", "restaurant_image", "third"),
            ],
        )),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;

    let uploaded = body["uploaded_files"].as_array().expect("uploaded files");
    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded[0]["filename"], "receipt.txt");
    assert_eq!(uploaded[0]["purpose"], "review_photo");
    assert_eq!(uploaded[1]["filename"], "storefront.txt");
    assert_eq!(uploaded[1]["purpose"], "restaurant_image");

    let errors = body["errors"].as_array().expect("errors");
    assert_eq!(errors.len(), 1);
    assert!(
        errors[0]
            .as_str()
            .is_some_and(|error| error.starts_with("selfie.txt: purpose must be one of"))
    );
}

#[actix_web::test]
async fn oversized_bodies_are_rejected() {
    let fx = fixture(64);
    let app = test::init_service(
        App::new()
            .app_data(fx.state.clone())
            .configure(configure_file_routes),
    )
    .await;
    let response = test::call_service(
        &app,
        upload_request(multipart(fx.uploader, "review_photo", &[("a.txt", "x")])),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["details"]["code"],
        "payload_too_large"
    );
}

#[actix_web::test]
async fn registering_a_known_checksum_returns_ok() {
    let fx = fixture(1024);
    let app = test::init_service(
        App::new()
            .app_data(fx.state.clone())
            .configure(configure_file_routes),
    )
    .await;
    let body = json!({
        "uploader_id": fx.uploader.to_string(),
        "storage_path": "review_photos/abc.txt",
        "filename": "abc.txt",
        "mime_type": "text/plain",
        "size_bytes": 3,
        "checksum": Checksum::of(b"abc").to_string(),
        "purpose": "review_photo"
    });

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/files")
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = json_body(created).await;
    assert_eq!(created["is_public"], true);

    let again = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/files")
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(json_body(again).await["id"], created["id"]);
}

#[actix_web::test]
async fn deleted_files_are_hidden_and_cannot_be_deleted_twice() {
    let fx = fixture(1024 * 1024);
    let app = test::init_service(
        App::new()
            .app_data(fx.state.clone())
            .configure(configure_file_routes),
    )
    .await;
    let uploaded = json_body(
        test::call_service(
            &app,
            upload_request(multipart(fx.uploader, "review_photo", &[("a.txt", "bye")])),
        )
        .await,
    )
    .await;
    let id = id_of(&uploaded["uploaded_files"][0]);

    let deleted = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/files/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        json_body(deleted).await,
        json!({"message": "file deleted successfully"})
    );

    let listed = json_body(
        test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/files?id={id}"))
                .to_request(),
        )
        .await,
    )
    .await;
    assert_eq!(listed, json!([]));

    let again = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/files/{id}"))
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn visibility_can_be_patched() {
    let fx = fixture(1024 * 1024);
    let app = test::init_service(
        App::new()
            .app_data(fx.state.clone())
            .configure(configure_file_routes),
    )
    .await;
    let uploaded = json_body(
        test::call_service(
            &app,
            upload_request(multipart(fx.uploader, "review_photo", &[("a.txt", "abc")])),
        )
        .await,
    )
    .await;
    let id = id_of(&uploaded["uploaded_files"][0]);

    let response = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/files?id={id}"))
            .set_json(json!({"is_public": false}))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_public"], false);
    assert_eq!(body["checksum"], uploaded["uploaded_files"][0]["checksum"]);
}
